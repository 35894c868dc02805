use std::path::PathBuf;

use thiserror::Error;

use crate::video::domain::audio_player::AudioError;
use crate::video::domain::frame_decoder::DecodeError;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("no such file or directory: '{}'", .0.display())]
    FileNotFound(PathBuf),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("decoder error: {0}")]
    Decode(#[from] DecodeError),
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
}
