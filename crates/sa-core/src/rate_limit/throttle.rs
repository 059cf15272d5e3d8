use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Clock, RateLimiter, Schedule};

/// Lets at most one call through per `limit`; calls in between are dropped
pub struct Throttler {
    limit: Duration,
    clock: Arc<dyn Clock>,
    last_call: Option<Instant>,
}

impl Throttler {
    pub fn new(limit: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            clock,
            last_call: None,
        }
    }
}

impl<T> RateLimiter<T> for Throttler {
    fn schedule(&mut self, call: T) -> Schedule<T> {
        let now = self.clock.now();
        match self.last_call {
            Some(last) if now.duration_since(last) < self.limit => Schedule::Suppressed,
            _ => {
                self.last_call = Some(now);
                Schedule::Executed(call)
            }
        }
    }

    // Nothing is ever held
    fn poll(&mut self) -> Option<T> {
        None
    }

    fn flush(&mut self) -> Option<T> {
        None
    }

    fn cancel(&mut self) -> Option<T> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeRange;
    use crate::rate_limit::ManualClock;

    #[test]
    fn test_calls_inside_the_window_are_suppressed() {
        let clock = ManualClock::new();
        let mut throttler = Throttler::new(Duration::from_millis(500), Arc::new(clock.clone()));

        assert_eq!(
            throttler.schedule(TimeRange::Last7Days),
            Schedule::Executed(TimeRange::Last7Days)
        );
        clock.advance(Duration::from_millis(499));
        assert_eq!(throttler.schedule(TimeRange::Last90Days), Schedule::Suppressed);

        clock.advance(Duration::from_millis(1));
        assert_eq!(
            throttler.schedule(TimeRange::LastYear),
            Schedule::Executed(TimeRange::LastYear)
        );
    }
}
