use std::time::Instant;

use crate::playback::domain::playback_state::PlaybackState;

/// Observer for playback events.
///
/// Keeps the session free of any particular reporting mechanism: the CLI
/// aggregates statistics, embedding hosts can forward events to their own
/// UI, and tests discard them.
pub trait PlaybackLogger: Send {
    /// One poll moved the cursor: `decoded` frames consumed, `dropped` of
    /// them never shown.
    fn advanced(&mut self, decoded: u64, dropped: u64);

    /// The session jumped straight to `frame`.
    fn seeked(&mut self, frame: u64);

    fn state_changed(&mut self, from: PlaybackState, to: PlaybackState);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPlaybackLogger;

impl PlaybackLogger for NullPlaybackLogger {
    fn advanced(&mut self, _decoded: u64, _dropped: u64) {}
    fn seeked(&mut self, _frame: u64) {}
    fn state_changed(&mut self, _from: PlaybackState, _to: PlaybackState) {}
    fn info(&mut self, _message: &str) {}
}

/// Aggregates frame throughput and drop statistics and reports them
/// through the `log` crate.
pub struct StatsPlaybackLogger {
    start_time: Instant,
    polls_advanced: u64,
    frames_decoded: u64,
    frames_dropped: u64,
    largest_burst: u64,
    seeks: u64,
    transitions: Vec<(PlaybackState, PlaybackState)>,
}

impl StatsPlaybackLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            polls_advanced: 0,
            frames_decoded: 0,
            frames_dropped: 0,
            largest_burst: 0,
            seeks: 0,
            transitions: Vec::new(),
        }
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Most frames consumed by a single poll.
    pub fn largest_burst(&self) -> u64 {
        self.largest_burst
    }

    pub fn seeks(&self) -> u64 {
        self.seeks
    }

    pub fn transitions(&self) -> &[(PlaybackState, PlaybackState)] {
        &self.transitions
    }

    /// Returns the formatted summary string, or `None` if nothing was played.
    pub fn summary_string(&self) -> Option<String> {
        if self.polls_advanced == 0 && self.seeks == 0 {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let shown = self.frames_decoded - self.frames_dropped;
        let drop_pct = if self.frames_decoded > 0 {
            self.frames_dropped as f64 / self.frames_decoded as f64 * 100.0
        } else {
            0.0
        };

        let mut lines = vec![format!("Playback summary ({elapsed:.1}s wall clock):")];
        lines.push(format!(
            "  decoded {} frames, shown {shown}, dropped {} ({drop_pct:.1}%)",
            self.frames_decoded, self.frames_dropped
        ));
        lines.push(format!("  largest catch-up burst: {} frames", self.largest_burst));
        lines.push(format!("  seeks: {}", self.seeks));
        if elapsed > 0.0 {
            lines.push(format!("  Display rate: {:.1} fps", shown as f64 / elapsed));
        }
        Some(lines.join("\n"))
    }
}

impl Default for StatsPlaybackLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackLogger for StatsPlaybackLogger {
    fn advanced(&mut self, decoded: u64, dropped: u64) {
        self.polls_advanced += 1;
        self.frames_decoded += decoded;
        self.frames_dropped += dropped;
        self.largest_burst = self.largest_burst.max(decoded);
        if dropped > 0 {
            log::debug!("Dropped {dropped} of {decoded} frames to catch up");
        }
    }

    fn seeked(&mut self, frame: u64) {
        self.seeks += 1;
        log::debug!("Seeked to frame {frame}");
    }

    fn state_changed(&mut self, from: PlaybackState, to: PlaybackState) {
        self.transitions.push((from, to));
        log::debug!("Playback {from} -> {to}");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPlaybackLogger;
        logger.advanced(3, 2);
        logger.seeked(10);
        logger.state_changed(PlaybackState::Stopped, PlaybackState::Ended);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_advanced_accumulates() {
        let mut logger = StatsPlaybackLogger::new();
        logger.advanced(1, 0);
        logger.advanced(5, 4);
        logger.advanced(2, 1);
        assert_eq!(logger.frames_decoded(), 8);
        assert_eq!(logger.frames_dropped(), 5);
        assert_eq!(logger.largest_burst(), 5);
    }

    #[test]
    fn test_transitions_recorded_in_order() {
        let mut logger = StatsPlaybackLogger::new();
        let playing = PlaybackState::Playing { paused: false };
        logger.state_changed(PlaybackState::Stopped, playing);
        logger.state_changed(playing, PlaybackState::Ended);
        assert_eq!(
            logger.transitions(),
            &[
                (PlaybackState::Stopped, playing),
                (playing, PlaybackState::Ended)
            ]
        );
    }

    #[test]
    fn test_summary_reports_drops() {
        let mut logger = StatsPlaybackLogger::new();
        logger.advanced(10, 5);
        logger.seeked(3);
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Playback summary"));
        assert!(summary.contains("decoded 10 frames, shown 5, dropped 5 (50.0%)"));
        assert!(summary.contains("seeks: 1"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StatsPlaybackLogger::new().summary_string().is_none());
    }
}
