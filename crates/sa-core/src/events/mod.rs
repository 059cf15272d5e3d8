use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;
use tracing::debug;

type SharedHandler = Arc<Mutex<Box<dyn EventHandler>>>;

/// Store-wide event bus
///
/// Handlers run without the registry lock held, so a handler may publish or
/// subscribe. A handler is never re-entered: events published while it is
/// still handling are not delivered to it.
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<SharedHandler>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Events published by the store
pub mod events {
    use super::Event;
    use crate::model::PlatformId;
    use crate::state::{FilterState, RequestClass, RequestId};
    use crate::model::TimeRange;

    /// Active filters changed
    #[derive(Debug, Clone)]
    pub struct FiltersChanged {
        pub filters: FilterState,
    }

    /// Selected platform or time range changed
    #[derive(Debug, Clone)]
    pub struct SelectionChanged {
        pub platform: Option<PlatformId>,
        pub time_range: TimeRange,
    }

    /// A request entered the pending state
    #[derive(Debug, Clone)]
    pub struct RequestStarted {
        pub class: RequestClass,
        pub request_id: RequestId,
    }

    /// A request completed and its data was merged
    #[derive(Debug, Clone)]
    pub struct RequestFulfilled {
        pub class: RequestClass,
        pub request_id: RequestId,
    }

    /// A request failed; its error is now on the request state
    #[derive(Debug, Clone)]
    pub struct RequestRejected {
        pub class: RequestClass,
        pub request_id: RequestId,
        pub error: String,
    }

    /// An outcome arrived for a request that had been superseded
    #[derive(Debug, Clone)]
    pub struct StaleResponseDropped {
        pub class: RequestClass,
        pub request_id: RequestId,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        FiltersChanged,
        SelectionChanged,
        RequestStarted,
        RequestFulfilled,
        RequestRejected,
        StaleResponseDropped
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers
            .entry(type_id)
            .or_insert_with(Vec::new)
            .push(Arc::new(Mutex::new(handler)));
    }

    /// Publish an event to every handler registered for its type
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let event_handlers = match self.handlers.lock().get(&type_id) {
            Some(event_handlers) => event_handlers.clone(),
            None => return,
        };

        for handler in &event_handlers {
            match handler.try_lock() {
                Some(mut handler) => handler.handle(&event),
                None => debug!("Skipping handler that is still handling an earlier event"),
            }
        }
    }

    /// Number of handlers registered for `E`
    pub fn handler_count<E: Event>(&self) -> usize {
        self.handlers
            .lock()
            .get(&std::any::TypeId::of::<E>())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::events::{RequestRejected, RequestStarted};
    use crate::state::{RequestClass, RequestId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_handlers_only_see_their_event_type() {
        let bus = EventBus::new();
        let started = Arc::new(AtomicUsize::new(0));
        let counter = started.clone();
        bus.subscribe::<RequestStarted>(handler_from_fn(move |event| {
            if event.as_any().downcast_ref::<RequestStarted>().is_some() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        bus.publish(RequestStarted {
            class: RequestClass::All,
            request_id: RequestId::new(),
        });
        bus.publish(RequestRejected {
            class: RequestClass::All,
            request_id: RequestId::new(),
            error: "boom".to_string(),
        });

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(bus.handler_count::<RequestStarted>(), 1);
        assert_eq!(bus.handler_count::<RequestRejected>(), 0);
    }

    #[test]
    fn test_handler_may_publish_and_subscribe() {
        let bus = Arc::new(EventBus::new());
        let rejected = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(AtomicUsize::new(0));

        let counter = rejected.clone();
        bus.subscribe::<RequestRejected>(handler_from_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let inner = bus.clone();
        let counter = started.clone();
        bus.subscribe::<RequestStarted>(handler_from_fn(move |event| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(started) = event.as_any().downcast_ref::<RequestStarted>() {
                // Same type again: not delivered back to this handler
                inner.publish(started.clone());
                inner.publish(RequestRejected {
                    class: started.class,
                    request_id: started.request_id,
                    error: "follow-up".to_string(),
                });
                inner.subscribe::<RequestRejected>(handler_from_fn(|_| {}));
            }
        }));

        bus.publish(RequestStarted {
            class: RequestClass::Platform,
            request_id: RequestId::new(),
        });

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(rejected.load(Ordering::SeqCst), 1);
        assert_eq!(bus.handler_count::<RequestRejected>(), 2);
    }
}
