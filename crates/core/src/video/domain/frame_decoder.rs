use std::path::Path;

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// No further frames exist at the current read position.
    #[error("end of stream")]
    EndOfStream,
    #[error("decoder is not open")]
    NotOpen,
    #[error("no video stream found")]
    NoVideoStream,
    #[error("{0}")]
    Backend(String),
}

impl DecodeError {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, DecodeError::EndOfStream)
    }
}

/// Pull-based frame source driven by the playback clock.
///
/// Implementations own the demuxer and codec state. The playback layer
/// only asks for the next frame, skips frames it will never show, and
/// jumps to absolute timestamps.
pub trait FrameDecoder: Send {
    /// Opens a video file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, DecodeError>;

    /// Decodes and converts the next frame in presentation order.
    fn read_next_frame(&mut self) -> Result<Frame, DecodeError>;

    /// Consumes the next frame without handing it out. Decoders that can
    /// skip pixel conversion for dropped frames should override this.
    fn skip_frame(&mut self) -> Result<(), DecodeError> {
        self.read_next_frame().map(|_| ())
    }

    /// Converts the frame consumed by the most recent `skip_frame`, if no
    /// read or seek has happened since. Used when the stream ends inside a
    /// catch-up burst so the last valid frame can still be shown.
    fn take_skipped_frame(&mut self) -> Option<Frame> {
        None
    }

    /// Repositions the stream so the next read yields the frame at
    /// `timestamp_ms`.
    fn seek(&mut self, timestamp_ms: f64) -> Result<(), DecodeError>;

    /// Presentation time of the last frame read, in milliseconds.
    fn position_ms(&self) -> f64;

    /// Releases codec and file handles. Safe to call repeatedly.
    fn release(&mut self);
}
