use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic wall-clock reading for the playback clock.
///
/// Readings are offsets from an arbitrary origin fixed by the source;
/// only differences between readings are meaningful.
pub trait TimeSource: Send {
    fn now(&self) -> Duration;

    fn now_secs(&self) -> f64 {
        self.now().as_secs_f64()
    }
}

/// Real time, measured from the moment the source was created.
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven time for deterministic playback.
///
/// Clones share the same reading, so a host (or a test) keeps one handle
/// and gives another to the player.
#[derive(Clone, Debug, Default)]
pub struct ManualTimeSource {
    nanos: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, time: Duration) {
        self.nanos.store(time.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set_secs(&self, secs: f64) {
        self.set(Duration::from_secs_f64(secs));
    }

    pub fn advance(&self, delta: Duration) {
        self.nanos
            .fetch_add(delta.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
