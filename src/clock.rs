use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source used by the gesture timer
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock for tests. Clones share the same offset, so a test can
/// keep one handle and advance time while the timer owns another.
#[derive(Clone, Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.offset.set(self.offset.get() + Duration::from_millis(ms));
    }

    /// Milliseconds advanced since construction
    pub fn elapsed_ms(&self) -> f64 {
        self.offset.get().as_nanos() as f64 / 1_000_000.0
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

/// Milliseconds between two instants, zero if `end` precedes `start`
pub fn millis_between(start: Instant, end: Instant) -> f64 {
    end.saturating_duration_since(start).as_nanos() as f64 / 1_000_000.0
}
