use std::fmt;

/// Transport state of a playback session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing {
        paused: bool,
    },
    /// The stream ran out and looping was off.
    Ended,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        matches!(self, PlaybackState::Playing { .. })
    }

    pub fn is_paused(self) -> bool {
        matches!(self, PlaybackState::Playing { paused: true })
    }

    /// True only while frames should be advancing.
    pub fn is_running(self) -> bool {
        matches!(self, PlaybackState::Playing { paused: false })
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Playing { paused: false } => write!(f, "playing"),
            PlaybackState::Playing { paused: true } => write!(f, "paused"),
            PlaybackState::Ended => write!(f, "ended"),
        }
    }
}
