//! Rate limiting for user-driven intents
//!
//! Search input is debounced, time-range changes are throttled and bulk
//! updates can be batched. None of the limiters owns a timer: callers
//! [`poll`](RateLimiter::poll) them, and time comes from an injected
//! [`Clock`], so they are testable with a [`ManualClock`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

mod batch;
mod debounce;
mod throttle;

pub use batch::Batcher;
pub use debounce::Debouncer;
pub use throttle::Throttler;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// What happened to a scheduled call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule<T> {
    /// Run now; the value is handed back to the caller
    Executed(T),
    /// Held; will come out of `poll` or `flush` later
    Deferred,
    /// Dropped
    Suppressed,
}

impl<T> Schedule<T> {
    pub fn executed(self) -> Option<T> {
        match self {
            Schedule::Executed(value) => Some(value),
            _ => None,
        }
    }
}

/// Common contract of the limiters
pub trait RateLimiter<T> {
    /// Offer a call
    fn schedule(&mut self, call: T) -> Schedule<T>;

    /// Release a deferred call whose time has come
    fn poll(&mut self) -> Option<T>;

    /// Release any deferred call immediately
    fn flush(&mut self) -> Option<T>;

    /// Drop any deferred call, returning it
    fn cancel(&mut self) -> Option<T>;
}
