//! Scripted collaborators shared by the crate's unit tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::audio_player::{AudioError, AudioOptions, AudioPlayer};
use crate::video::domain::frame_decoder::{DecodeError, FrameDecoder};

pub const CLIP_WIDTH: u32 = 4;
pub const CLIP_HEIGHT: u32 = 2;

#[derive(Debug, Default)]
pub struct DecoderLog {
    pub opens: u32,
    pub releases: u32,
    pub reads: u64,
    pub skips: u64,
    pub seeks: Vec<f64>,
}

impl DecoderLog {
    pub fn consumed(&self) -> u64 {
        self.reads + self.skips
    }
}

/// Decoder over a synthetic clip whose frame `i` is filled with byte `i % 256`.
pub struct ScriptedDecoder {
    fps: f64,
    total_frames: u64,
    next: u64,
    open: bool,
    fail_at: Option<u64>,
    last_skipped: Option<u64>,
    log: Arc<Mutex<DecoderLog>>,
}

impl ScriptedDecoder {
    pub fn new(fps: f64, total_frames: u64) -> Self {
        Self {
            fps,
            total_frames,
            next: 0,
            open: false,
            fail_at: None,
            last_skipped: None,
            log: Arc::new(Mutex::new(DecoderLog::default())),
        }
    }

    /// Makes frame `index` fail with a backend error instead of decoding.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn log(&self) -> Arc<Mutex<DecoderLog>> {
        self.log.clone()
    }

    fn check_next(&self) -> Result<u64, DecodeError> {
        if !self.open {
            return Err(DecodeError::NotOpen);
        }
        if self.fail_at == Some(self.next) {
            return Err(DecodeError::Backend("corrupt packet".to_string()));
        }
        if self.next >= self.total_frames {
            return Err(DecodeError::EndOfStream);
        }
        Ok(self.next)
    }
}

pub fn synthetic_frame(index: u64) -> Frame {
    let len = (CLIP_WIDTH * CLIP_HEIGHT * 3) as usize;
    Frame::new(
        vec![(index % 256) as u8; len],
        CLIP_WIDTH,
        CLIP_HEIGHT,
        3,
        index,
    )
}

impl FrameDecoder for ScriptedDecoder {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, DecodeError> {
        self.open = true;
        self.next = 0;
        self.last_skipped = None;
        self.log.lock().unwrap().opens += 1;
        Ok(VideoMetadata {
            width: CLIP_WIDTH,
            height: CLIP_HEIGHT,
            fps: self.fps,
            total_frames: self.total_frames,
            codec: "scripted".to_string(),
            source_path: Some(path.to_path_buf()),
        })
    }

    fn read_next_frame(&mut self) -> Result<Frame, DecodeError> {
        self.last_skipped = None;
        let index = self.check_next()?;
        self.next += 1;
        self.log.lock().unwrap().reads += 1;
        Ok(synthetic_frame(index))
    }

    fn skip_frame(&mut self) -> Result<(), DecodeError> {
        let index = self.check_next()?;
        self.next += 1;
        self.last_skipped = Some(index);
        self.log.lock().unwrap().skips += 1;
        Ok(())
    }

    fn take_skipped_frame(&mut self) -> Option<Frame> {
        self.last_skipped.take().map(synthetic_frame)
    }

    fn seek(&mut self, timestamp_ms: f64) -> Result<(), DecodeError> {
        if !self.open {
            return Err(DecodeError::NotOpen);
        }
        let frame = (timestamp_ms / 1000.0 * self.fps + 1e-6).floor().max(0.0) as u64;
        self.next = frame.min(self.total_frames);
        self.last_skipped = None;
        self.log.lock().unwrap().seeks.push(timestamp_ms);
        Ok(())
    }

    fn position_ms(&self) -> f64 {
        self.next as f64 / self.fps * 1000.0
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.log.lock().unwrap().releases += 1;
        }
    }
}

#[derive(Debug, Default)]
pub struct AudioLog {
    pub opens: u32,
    pub closes: u32,
    pub open: bool,
    pub paused: bool,
    pub muted: bool,
    pub volume: f32,
    pub seeks: Vec<(f64, bool)>,
}

/// Audio player that records every command it receives.
#[derive(Default)]
pub struct RecordingAudioPlayer {
    log: Arc<Mutex<AudioLog>>,
}

impl RecordingAudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<AudioLog>> {
        self.log.clone()
    }
}

impl AudioPlayer for RecordingAudioPlayer {
    fn open(&mut self, _path: &Path, options: &AudioOptions) -> Result<(), AudioError> {
        let mut log = self.log.lock().unwrap();
        log.opens += 1;
        log.open = true;
        log.paused = options.paused;
        log.muted = options.muted;
        log.volume = options.volume;
        Ok(())
    }

    fn set_pause(&mut self, paused: bool) {
        self.log.lock().unwrap().paused = paused;
    }

    fn seek(&mut self, seconds: f64, absolute: bool) -> Result<(), AudioError> {
        let mut log = self.log.lock().unwrap();
        if !log.open {
            return Err(AudioError::NotOpen);
        }
        log.seeks.push((seconds, absolute));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.lock().unwrap().volume = volume;
    }

    fn set_mute(&mut self, muted: bool) {
        self.log.lock().unwrap().muted = muted;
    }

    fn close(&mut self) {
        let mut log = self.log.lock().unwrap();
        if log.open {
            log.open = false;
            log.closes += 1;
        }
    }
}

/// A file that exists on disk, for APIs that check the path before
/// handing it to the decoder.
pub fn clip_file() -> tempfile::NamedTempFile {
    tempfile::Builder::new()
        .suffix(".mp4")
        .tempfile()
        .unwrap()
}
