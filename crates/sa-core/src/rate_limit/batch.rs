use std::sync::Arc;
use std::time::{Duration, Instant};

use super::Clock;

/// Collects items and releases them together once `delay` passes
/// without a new item
pub struct Batcher<T> {
    delay: Duration,
    clock: Arc<dyn Clock>,
    items: Vec<T>,
    deadline: Option<Instant>,
}

impl<T> Batcher<T> {
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            delay,
            clock,
            items: Vec::new(),
            deadline: None,
        }
    }

    /// Add an item and restart the quiet period
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.deadline = Some(self.clock.now() + self.delay);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Release the batch if its quiet period has elapsed
    pub fn poll(&mut self) -> Option<Vec<T>> {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Release the batch now
    pub fn flush(&mut self) -> Option<Vec<T>> {
        self.deadline = None;
        if self.items.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.items))
        }
    }

    /// Drop everything collected so far
    pub fn cancel(&mut self) -> Vec<T> {
        self.deadline = None;
        std::mem::take(&mut self.items)
    }
}
