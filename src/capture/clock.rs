use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Timer capability used by the capture controller.
pub trait Clock {
    /// Block (or pretend to) for `d`.
    fn wait(&mut self, d: Duration);
}

/// Real wall-clock waits.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn wait(&mut self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Virtual clock that only accumulates elapsed time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    elapsed: Duration,
    waits: u64,
}

impl ManualClock {
    /// Fresh clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time waited.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of waits issued.
    pub fn waits(&self) -> u64 {
        self.waits
    }
}

impl Clock for ManualClock {
    fn wait(&mut self, d: Duration) {
        self.elapsed += d;
        self.waits += 1;
    }
}

/// Shared flag that tells a running capture to stop scheduling timers.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Token in the "running" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
