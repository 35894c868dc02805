use serde::{Deserialize, Serialize};

use crate::shared::constants::FRAME_EPSILON;

/// What happens to wall-clock time spent paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PausePolicy {
    /// Shift the start epoch forward by the paused duration on resume, so
    /// playback continues from the frame where it was paused.
    #[default]
    Reanchor,
    /// Leave the epoch alone. Time spent paused is owed and drained in a
    /// single burst of dropped frames on the first poll after resume.
    CatchUp,
}

/// Maps wall-clock time to the frame index that should be on screen.
///
/// All instants are seconds on the session's `TimeSource` timeline. They
/// are kept as `f64` because seeking forward can put the start epoch
/// before the time source's origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationClock {
    fps: f64,
    start_epoch: f64,
    origin_epoch: f64,
    paused_since: Option<f64>,
}

impl PresentationClock {
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            start_epoch: 0.0,
            origin_epoch: 0.0,
            paused_since: None,
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Instant at which frame 0 would have been shown.
    pub fn start_epoch(&self) -> f64 {
        self.start_epoch
    }

    /// Instant at which playback time 0 was last established.
    pub fn origin_epoch(&self) -> f64 {
        self.origin_epoch
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Makes `frame_offset` the frame due at instant `at`. Anchoring at
    /// frame 0 also moves the origin epoch.
    pub fn anchor(&mut self, at: f64, frame_offset: u64) {
        self.start_epoch = at - frame_offset as f64 / self.fps;
        if frame_offset == 0 {
            self.origin_epoch = at;
        }
        if self.paused_since.is_some() {
            self.paused_since = Some(at);
        }
    }

    /// Frame due at `now`: `floor((now - start) * fps)`, never negative.
    pub fn target_frame(&self, now: f64) -> u64 {
        let frames = (now - self.start_epoch) * self.fps;
        (frames + FRAME_EPSILON).floor().max(0.0) as u64
    }

    /// Seconds of playback time elapsed at `now`.
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.start_epoch).max(0.0)
    }

    pub fn pause(&mut self, at: f64) {
        if self.paused_since.is_none() {
            self.paused_since = Some(at);
        }
    }

    /// Ends a pause and returns how long it lasted, in seconds.
    pub fn resume(&mut self, at: f64, policy: PausePolicy) -> f64 {
        let Some(since) = self.paused_since.take() else {
            return 0.0;
        };
        let paused_for = (at - since).max(0.0);
        if policy == PausePolicy::Reanchor {
            self.start_epoch += paused_for;
        }
        paused_for
    }

    /// Drops any pause in progress without touching the epoch.
    pub fn clear_pause(&mut self) {
        self.paused_since = None;
    }
}
