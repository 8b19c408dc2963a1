use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic clock for decorative timers (judgment flashes, HUD fades).
///
/// This is never the song clock; song position always comes from
/// [`AudioSink::current_time_ms`](crate::AudioSink::current_time_ms).
pub trait TimeProvider {
    /// Current time in microseconds from an arbitrary epoch.
    fn now_us(&self) -> i64;

    /// Milliseconds elapsed since `since_us`, never negative.
    fn elapsed_ms(&self, since_us: i64) -> f64 {
        (self.now_us() - since_us).max(0) as f64 / 1000.0
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for Rc<T> {
    fn now_us(&self) -> i64 {
        (**self).now_us()
    }
}

/// Production provider backed by `Instant`.
pub struct SystemTimeProvider {
    start: Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_us(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }
}

/// Manually advanced provider for deterministic tests and headless runs.
#[derive(Debug, Default)]
pub struct MockTimeProvider {
    current_us: Cell<i64>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, us: i64) {
        self.current_us.set(us);
    }

    pub fn advance_ms(&self, ms: f64) {
        self.current_us
            .set(self.current_us.get() + (ms * 1000.0).round() as i64);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_us(&self) -> i64 {
        self.current_us.get()
    }
}
