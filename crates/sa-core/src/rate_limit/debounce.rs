use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Clock, RateLimiter, Schedule};

/// Holds the latest call until no new call arrived for `delay`
pub struct Debouncer<T> {
    delay: Duration,
    clock: Arc<dyn Clock>,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            delay,
            clock,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> RateLimiter<T> for Debouncer<T> {
    /// Each call restarts the quiet period and replaces the held value
    fn schedule(&mut self, call: T) -> Schedule<T> {
        if self.delay.is_zero() {
            self.pending = None;
            return Schedule::Executed(call);
        }
        let deadline = self.clock.now() + self.delay;
        self.pending = Some((call, deadline));
        Schedule::Deferred
    }

    fn poll(&mut self) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if self.clock.now() >= *deadline => {
                self.pending.take().map(|(call, _)| call)
            }
            _ => None,
        }
    }

    fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(call, _)| call)
    }

    fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(call, _)| call)
    }
}
