use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::constants::FRAME_EPSILON;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_decoder::{DecodeError, FrameDecoder};

/// Units per second of container-level timestamps (`AV_TIME_BASE`).
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Pull-based video decoding via ffmpeg-next (libavformat + libavcodec).
///
/// Frames handed out by [`read_next_frame`](FrameDecoder::read_next_frame)
/// are converted to RGB24. Skipped frames are decoded but never converted.
pub struct FfmpegDecoder {
    state: Option<DecoderState>,
    fps: f64,
    position_ms: f64,
    next_index: u64,
    /// Decoded frames earlier than this are discarded after a seek, since
    /// the demuxer lands on the keyframe before the requested time.
    seek_target_secs: Option<f64>,
    /// Raw frame consumed by the latest skip, kept until the next read or seek.
    last_skipped: Option<(Video, u64)>,
}

struct DecoderState {
    ictx: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    time_base: f64,
    width: u32,
    height: u32,
    flushing: bool,
}

// Safety: FfmpegDecoder is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegDecoder {}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self {
            state: None,
            fps: 0.0,
            position_ms: 0.0,
            next_index: 0,
            seek_target_secs: None,
            last_skipped: None,
        }
    }

    /// Next decoded frame in presentation order, before pixel conversion.
    fn next_decoded(&mut self) -> Result<(Video, u64), DecodeError> {
        let state = self.state.as_mut().ok_or(DecodeError::NotOpen)?;
        loop {
            let Some(decoded) = receive_decoded(state)? else {
                return Err(DecodeError::EndOfStream);
            };
            let secs = decoded
                .timestamp()
                .or_else(|| decoded.pts())
                .map(|pts| pts as f64 * state.time_base);

            if let (Some(target), Some(t)) = (self.seek_target_secs, secs) {
                if t + 0.5 / self.fps < target {
                    continue;
                }
            }
            self.seek_target_secs = None;

            let index = match secs {
                Some(t) => {
                    self.position_ms = t * 1000.0;
                    (t * self.fps).round().max(0.0) as u64
                }
                None => {
                    self.position_ms = self.next_index as f64 / self.fps * 1000.0;
                    self.next_index
                }
            };
            self.next_index = index + 1;
            return Ok((decoded, index));
        }
    }

    fn convert(&mut self, decoded: &Video, index: u64) -> Result<Frame, DecodeError> {
        let state = self.state.as_mut().ok_or(DecodeError::NotOpen)?;
        let mut rgb_frame = Video::empty();
        state
            .scaler
            .run(decoded, &mut rgb_frame)
            .map_err(backend)?;
        let pixels = extract_rgb_pixels(&rgb_frame, state.width, state.height);
        Ok(Frame::new(pixels, state.width, state.height, 3, index))
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, DecodeError> {
        self.release();
        ffmpeg_next::init().map_err(backend)?;

        let ictx = ffmpeg_next::format::input(path).map_err(backend)?;
        let container_secs = ictx.duration() as f64 / AV_TIME_BASE;

        let (stream_index, decoder, fps, time_base, stream_frames, stream_secs) = {
            let stream = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or(DecodeError::NoVideoStream)?;

            let codec_ctx =
                ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
                    .map_err(backend)?;
            let decoder = codec_ctx.decoder().video().map_err(backend)?;

            let rate = match stream.avg_frame_rate() {
                r if r.denominator() != 0 && r.numerator() != 0 => r,
                _ => stream.rate(),
            };
            let fps = if rate.denominator() != 0 {
                f64::from(rate.numerator()) / f64::from(rate.denominator())
            } else {
                0.0
            };
            let tb = stream.time_base();
            let time_base = if tb.denominator() != 0 {
                f64::from(tb.numerator()) / f64::from(tb.denominator())
            } else {
                0.0
            };
            let stream_secs = stream.duration() as f64 * time_base;
            (stream.index(), decoder, fps, time_base, stream.frames(), stream_secs)
        };

        let total_frames = if stream_frames > 0 {
            stream_frames as u64
        } else {
            let secs = if stream_secs > 0.0 {
                stream_secs
            } else {
                container_secs
            };
            (secs * fps + FRAME_EPSILON).floor().max(0.0) as u64
        };

        let (width, height) = (decoder.width(), decoder.height());
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(backend)?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.state = Some(DecoderState {
            ictx,
            decoder,
            scaler,
            stream_index,
            time_base,
            width,
            height,
            flushing: false,
        });
        self.fps = fps;
        self.position_ms = 0.0;
        self.next_index = 0;
        self.seek_target_secs = None;
        self.last_skipped = None;

        Ok(metadata)
    }

    fn read_next_frame(&mut self) -> Result<Frame, DecodeError> {
        self.last_skipped = None;
        let (decoded, index) = self.next_decoded()?;
        self.convert(&decoded, index)
    }

    fn skip_frame(&mut self) -> Result<(), DecodeError> {
        let skipped = self.next_decoded()?;
        self.last_skipped = Some(skipped);
        Ok(())
    }

    fn take_skipped_frame(&mut self) -> Option<Frame> {
        let (decoded, index) = self.last_skipped.take()?;
        match self.convert(&decoded, index) {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::warn!("Could not convert skipped frame {index}: {e}");
                None
            }
        }
    }

    fn seek(&mut self, timestamp_ms: f64) -> Result<(), DecodeError> {
        let state = self.state.as_mut().ok_or(DecodeError::NotOpen)?;
        let target_secs = (timestamp_ms / 1000.0).max(0.0);
        let ts = (target_secs * AV_TIME_BASE) as i64;

        state
            .ictx
            .seek(ts, ..ts)
            .map_err(|e| DecodeError::Backend(format!("seek to {timestamp_ms:.0} ms failed: {e}")))?;
        state.decoder.flush();
        state.flushing = false;

        self.seek_target_secs = Some(target_secs);
        self.last_skipped = None;
        self.position_ms = target_secs * 1000.0;
        self.next_index = (target_secs * self.fps + FRAME_EPSILON).floor() as u64;
        Ok(())
    }

    fn position_ms(&self) -> f64 {
        self.position_ms
    }

    fn release(&mut self) {
        self.state = None;
        self.seek_target_secs = None;
        self.last_skipped = None;
    }
}

/// Pulls packets through the codec until it yields a frame. Returns `None`
/// once the codec is drained after end of input.
fn receive_decoded(state: &mut DecoderState) -> Result<Option<Video>, DecodeError> {
    loop {
        let mut decoded = Video::empty();
        if state.decoder.receive_frame(&mut decoded).is_ok() {
            return Ok(Some(decoded));
        }
        if state.flushing {
            return Ok(None);
        }

        match state.ictx.packets().next() {
            Some((stream, packet)) => {
                if stream.index() != state.stream_index {
                    continue;
                }
                if let Err(e) = state.decoder.send_packet(&packet) {
                    log::debug!("Skipping undecodable packet: {e}");
                }
            }
            None => {
                state.decoder.send_eof().map_err(backend)?;
                state.flushing = true;
            }
        }
    }
}

fn backend(err: ffmpeg_next::Error) -> DecodeError {
    DecodeError::Backend(err.to_string())
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
fn extract_rgb_pixels(rgb_frame: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
