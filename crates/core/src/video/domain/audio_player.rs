use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("audio player is not open")]
    NotOpen,
    #[error("{0}")]
    Backend(String),
}

/// Initial audio state applied when a player is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioOptions {
    pub volume: f32,
    pub muted: bool,
    pub paused: bool,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            paused: true,
        }
    }
}

/// Audio track playback running on its own clock.
///
/// The video session only forwards transport commands; sample decoding and
/// device output belong to the implementation.
pub trait AudioPlayer: Send {
    fn open(&mut self, path: &Path, options: &AudioOptions) -> Result<(), AudioError>;

    fn set_pause(&mut self, paused: bool);

    /// Moves the audio position. `absolute` seeks to `seconds` from the
    /// start; otherwise `seconds` is an offset from the current position.
    fn seek(&mut self, seconds: f64, absolute: bool) -> Result<(), AudioError>;

    /// `volume` is in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);

    fn set_mute(&mut self, muted: bool);

    /// Stops output and frees device handles. Safe to call repeatedly.
    fn close(&mut self);
}
