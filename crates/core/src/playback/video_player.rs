use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::playback::domain::frame_cursor::{Advance, FrameCursor};
use crate::playback::domain::playback_state::PlaybackState;
use crate::playback::domain::presentation_clock::PresentationClock;
use crate::playback::domain::time_source::TimeSource;
use crate::playback::playback_config::PlaybackConfig;
use crate::playback::playback_logger::{NullPlaybackLogger, PlaybackLogger};
use crate::presentation::frame_scaler::FrameScaler;
use crate::shared::constants::{MAX_VOLUME, MIN_VOLUME};
use crate::shared::error::PlaybackError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::audio_player::{AudioOptions, AudioPlayer};
use crate::video::domain::frame_decoder::{DecodeError, FrameDecoder};
use crate::video::domain::surface::Surface;

/// A playback session over one video file.
///
/// Drives the decoder from a wall-clock presentation clock: the host calls
/// [`poll`](Self::poll) (or [`get_frame`](Self::get_frame) /
/// [`draw_to`](Self::draw_to)) once per render tick and receives whichever
/// frame is due at that instant. Frames that fall between two slow polls
/// are decoded and dropped so the picture never lags behind real time.
/// Audio runs on its own player and only receives transport commands.
///
/// The session exclusively owns its decoder and audio player and releases
/// them on [`release`](Self::release), on [`load`](Self::load), and on drop.
pub struct VideoPlayer {
    path: PathBuf,
    metadata: VideoMetadata,
    decoder: Box<dyn FrameDecoder>,
    audio: Box<dyn AudioPlayer>,
    time: Box<dyn TimeSource>,
    logger: Box<dyn PlaybackLogger>,
    config: PlaybackConfig,
    clock: PresentationClock,
    cursor: FrameCursor,
    scaler: FrameScaler,
    state: PlaybackState,
    looped: bool,
    volume: f32,
    muted: bool,
    ready: bool,
}

impl VideoPlayer {
    /// Opens `path` with the given collaborators. A missing file is
    /// reported immediately as [`PlaybackError::FileNotFound`].
    pub fn open(
        path: impl AsRef<Path>,
        mut decoder: Box<dyn FrameDecoder>,
        mut audio: Box<dyn AudioPlayer>,
        time: Box<dyn TimeSource>,
        config: PlaybackConfig,
    ) -> Result<Self, PlaybackError> {
        config
            .validate()
            .map_err(|e| PlaybackError::InvalidArgument(e.to_string()))?;
        let path = path.as_ref().to_path_buf();
        ensure_exists(&path)?;

        let options = AudioOptions {
            volume: config.volume,
            muted: config.muted,
            paused: true,
        };
        let metadata = open_collaborators(&path, decoder.as_mut(), audio.as_mut(), &options)?;
        // No logger is attached until `with_logger`
        log::info!("Loaded {}", describe(&path, &metadata));

        Ok(Self {
            clock: PresentationClock::new(metadata.fps),
            cursor: FrameCursor::new(Frame::black(metadata.width, metadata.height)),
            scaler: scaler_for(&metadata, &config),
            path,
            metadata,
            decoder,
            audio,
            time,
            logger: Box::new(NullPlaybackLogger),
            volume: config.volume,
            muted: config.muted,
            config,
            state: PlaybackState::Stopped,
            looped: false,
            ready: true,
        })
    }

    pub fn with_logger(mut self, logger: Box<dyn PlaybackLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replaces the session's file. The old decoder and audio handles are
    /// released before the new ones are opened. On failure the session is
    /// left released.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), PlaybackError> {
        let path = path.as_ref().to_path_buf();
        ensure_exists(&path)?;
        self.release();
        self.path = path;
        self.reopen()
    }

    /// Closes the decoder and audio player. Idempotent; `play` reopens the
    /// same file.
    pub fn release(&mut self) {
        if !self.ready {
            return;
        }
        self.decoder.release();
        self.audio.close();
        self.ready = false;
        self.looped = false;
        self.clock.clear_pause();
        self.set_state(PlaybackState::Stopped);
        self.logger.info(&format!("Released {}", self.path.display()));
    }

    // --- Transport ---

    /// Starts playback from frame 0. Has no effect while already playing.
    pub fn play(&mut self, looped: bool) -> Result<(), PlaybackError> {
        if self.state.is_playing() {
            return Ok(());
        }
        if !self.ready {
            self.reopen()?;
        }

        self.decoder.seek(0.0)?;
        self.seek_audio(0.0);
        self.audio.set_pause(false);
        self.cursor.jump_to(0);

        let now = self.time.now_secs();
        self.clock.clear_pause();
        self.clock.anchor(now, 0);
        self.looped = looped;
        self.set_state(PlaybackState::Playing { paused: false });
        Ok(())
    }

    /// Seeks back to frame 0 and continues playing, unpausing if needed.
    pub fn restart(&mut self) -> Result<(), PlaybackError> {
        if !self.state.is_playing() {
            return Ok(());
        }
        self.seek_to(0)?;
        self.clock.clear_pause();
        self.audio.set_pause(false);
        self.set_state(PlaybackState::Playing { paused: false });
        Ok(())
    }

    /// Stops playback. The current frame stays queryable.
    pub fn stop(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.audio.set_pause(true);
        self.clock.clear_pause();
        self.looped = false;
        self.set_state(PlaybackState::Stopped);
    }

    pub fn pause(&mut self) {
        if !self.state.is_running() {
            return;
        }
        let now = self.time.now_secs();
        self.clock.pause(now);
        self.audio.set_pause(true);
        self.set_state(PlaybackState::Playing { paused: true });
    }

    pub fn resume(&mut self) {
        if !self.state.is_paused() {
            return;
        }
        let now = self.time.now_secs();
        let paused_for = self.clock.resume(now, self.config.pause_policy);
        log::debug!(
            "Resuming after {paused_for:.3}s paused ({:?})",
            self.config.pause_policy
        );
        self.audio.set_pause(false);
        self.set_state(PlaybackState::Playing { paused: false });
    }

    /// Jumps to the frame shown at `position`.
    pub fn seek_time(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let frame = self.metadata.time_to_frame(position);
        self.seek_to(frame)
    }

    /// Jumps to `frame`, clamped to the last frame of the stream.
    pub fn seek_frame(&mut self, frame: u64) -> Result<(), PlaybackError> {
        self.seek_to(frame)
    }

    // --- Frames ---

    /// Advances to the frame due now and returns it at native size.
    ///
    /// Does nothing unless the session is playing and unpaused. Reaching
    /// the end of the stream loops back to frame 0 or ends playback; either
    /// way this poll returns the last valid frame.
    pub fn poll(&mut self) -> &Frame {
        if self.ready && self.state.is_running() {
            let now = self.time.now_secs();
            let target = self.clock.target_frame(now);
            match self.cursor.advance_to(target, self.decoder.as_mut()) {
                Advance::Idle => {}
                Advance::Advanced { decoded, dropped } => self.logger.advanced(decoded, dropped),
                Advance::EndOfStream { decoded, error } => {
                    if decoded > 0 {
                        self.logger.advanced(decoded, decoded - 1);
                    }
                    if let Some(err) = error {
                        log::warn!(
                            "Decoding stopped after frame {}: {err}",
                            self.cursor.draw_frame()
                        );
                    }
                    self.handle_end_of_stream();
                }
            }
        }
        self.cursor.frame()
    }

    /// Polls, then returns the frame scaled to the display size.
    pub fn get_frame(&mut self) -> Cow<'_, Frame> {
        self.poll();
        self.scaler.scale(self.cursor.frame())
    }

    /// Polls and blits the display-sized frame onto `surface`.
    pub fn draw_to(&mut self, surface: &mut dyn Surface, position: (i64, i64)) {
        let frame = self.get_frame();
        surface.blit(&frame, position);
    }

    // --- Audio ---

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        if !(MIN_VOLUME..=MAX_VOLUME).contains(&volume) {
            return Err(PlaybackError::InvalidArgument(format!(
                "volume must be between {MIN_VOLUME} and {MAX_VOLUME}, got {volume}"
            )));
        }
        self.volume = volume;
        self.audio.set_volume(volume);
        Ok(())
    }

    pub fn mute(&mut self) {
        self.muted = true;
        self.audio.set_mute(true);
    }

    pub fn unmute(&mut self) {
        self.muted = false;
        self.audio.set_mute(false);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    // --- Position ---

    pub fn duration(&self) -> Duration {
        self.metadata.duration()
    }

    pub fn current_time(&self) -> Duration {
        self.metadata.frame_to_time(self.current_frame())
    }

    pub fn remaining_time(&self) -> Duration {
        self.duration().saturating_sub(self.current_time())
    }

    pub fn current_frame(&self) -> u64 {
        self.cursor.draw_frame()
    }

    pub fn remaining_frames(&self) -> u64 {
        self.metadata
            .total_frames
            .saturating_sub(self.current_frame())
    }

    /// Where the decoder's read position actually is, which may differ
    /// from [`current_time`](Self::current_time) by decoder rounding.
    pub fn decoder_position(&self) -> Duration {
        Duration::from_secs_f64(self.decoder.position_ms().max(0.0) / 1000.0)
    }

    // --- Dimensions ---

    pub fn size(&self) -> (u32, u32) {
        self.scaler.size()
    }

    pub fn width(&self) -> u32 {
        self.scaler.width()
    }

    pub fn height(&self) -> u32 {
        self.scaler.height()
    }

    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), PlaybackError> {
        self.scaler.set_size(width, height)
    }

    pub fn set_width(&mut self, width: u32) -> Result<(), PlaybackError> {
        self.scaler.set_width(width)
    }

    pub fn set_height(&mut self, height: u32) -> Result<(), PlaybackError> {
        self.scaler.set_height(height)
    }

    /// Native width over native height.
    pub fn aspect_ratio(&self) -> f64 {
        self.scaler.aspect_ratio()
    }

    pub fn keep_aspect_ratio(&self) -> bool {
        self.scaler.keep_aspect_ratio()
    }

    pub fn set_keep_aspect_ratio(&mut self, keep: bool) {
        self.scaler.set_keep_aspect_ratio(keep);
    }

    // --- State ---

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn is_ended(&self) -> bool {
        self.state == PlaybackState::Ended
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Whether decoder and audio handles are open.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fps(&self) -> f64 {
        self.metadata.fps
    }

    pub fn total_frames(&self) -> u64 {
        self.metadata.total_frames
    }

    /// The presentation clock, for hosts that schedule their own ticks.
    pub fn clock(&self) -> &PresentationClock {
        &self.clock
    }

    pub fn logger(&self) -> &dyn PlaybackLogger {
        self.logger.as_ref()
    }

    // --- Internals ---

    fn reopen(&mut self) -> Result<(), PlaybackError> {
        let options = AudioOptions {
            volume: self.volume,
            muted: self.muted,
            paused: true,
        };
        let metadata = open_collaborators(
            &self.path,
            self.decoder.as_mut(),
            self.audio.as_mut(),
            &options,
        )?;

        self.clock = PresentationClock::new(metadata.fps);
        self.cursor
            .reset(Frame::black(metadata.width, metadata.height));
        self.scaler = scaler_for(&metadata, &self.config);
        self.metadata = metadata;
        self.looped = false;
        self.ready = true;
        self.set_state(PlaybackState::Stopped);
        let loaded = format!("Loaded {}", describe(&self.path, &self.metadata));
        self.logger.info(&loaded);
        Ok(())
    }

    /// Absolute jump: repositions decoder and audio directly and re-anchors
    /// the clock so `frame` is due now.
    fn seek_to(&mut self, frame: u64) -> Result<(), PlaybackError> {
        if !self.ready {
            return Err(PlaybackError::Decode(DecodeError::NotOpen));
        }
        let frame = frame.min(self.metadata.total_frames.saturating_sub(1));
        let seconds = frame as f64 / self.metadata.fps;

        self.decoder.seek(seconds * 1000.0)?;
        self.seek_audio(seconds);

        let now = self.time.now_secs();
        self.clock.anchor(now, frame);
        self.cursor.jump_to(frame);
        self.logger.seeked(frame);
        Ok(())
    }

    fn handle_end_of_stream(&mut self) {
        if self.looped {
            self.logger
                .info(&format!("End of {}, looping", self.path.display()));
            match self.seek_to(0) {
                Ok(()) => return,
                Err(e) => log::warn!("Loop restart failed: {e}"),
            }
        }
        self.audio.set_pause(true);
        self.clock.clear_pause();
        self.set_state(PlaybackState::Ended);
        self.logger
            .info(&format!("Reached end of {}", self.path.display()));
    }

    fn seek_audio(&mut self, seconds: f64) {
        if let Err(e) = self.audio.seek(seconds, true) {
            log::warn!("Audio seek to {seconds:.3}s failed: {e}");
        }
    }

    fn set_state(&mut self, to: PlaybackState) {
        let from = self.state;
        if from != to {
            self.state = to;
            self.logger.state_changed(from, to);
        }
    }
}

impl fmt::Debug for VideoPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoPlayer")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("frame", &self.cursor.draw_frame())
            .field("looped", &self.looped)
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.release();
    }
}

fn ensure_exists(path: &Path) -> Result<(), PlaybackError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PlaybackError::FileNotFound(path.to_path_buf()))
    }
}

/// Opens decoder then audio, undoing the decoder if anything after it fails.
fn open_collaborators(
    path: &Path,
    decoder: &mut dyn FrameDecoder,
    audio: &mut dyn AudioPlayer,
    options: &AudioOptions,
) -> Result<VideoMetadata, PlaybackError> {
    let metadata = decoder.open(path).map_err(|source| PlaybackError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if !(metadata.fps > 0.0) {
        decoder.release();
        return Err(PlaybackError::InvalidArgument(format!(
            "frame rate must be positive, got {}",
            metadata.fps
        )));
    }
    if let Err(e) = audio.open(path, options) {
        decoder.release();
        return Err(e.into());
    }

    Ok(metadata)
}

fn describe(path: &Path, metadata: &VideoMetadata) -> String {
    format!(
        "{} ({}x{} @ {:.3} fps, {} frames, {})",
        path.display(),
        metadata.width,
        metadata.height,
        metadata.fps,
        metadata.total_frames,
        metadata.codec
    )
}

fn scaler_for(metadata: &VideoMetadata, config: &PlaybackConfig) -> FrameScaler {
    FrameScaler::new(metadata.width, metadata.height)
        .with_filter(config.resize_filter)
        .with_keep_aspect_ratio(config.keep_aspect_ratio)
}
