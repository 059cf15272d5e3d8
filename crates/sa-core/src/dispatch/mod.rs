//! Async fetch intents
//!
//! The dispatcher turns a fetch intent into the pending → fulfilled/rejected
//! sequence on the store. A new intent for a class supersedes the one in
//! flight: the old task is aborted and, should its outcome still arrive,
//! the reducer drops it.

use std::future::Future;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

use crate::data::SourceError;
use crate::gateway::FetchGateway;
use crate::model::TimeRange;
use crate::state::{Action, RequestClass, RequestId};
use crate::store::Store;

/// Handle to a started request
pub struct FetchTicket {
    pub class: RequestClass,
    pub request_id: RequestId,
    handle: JoinHandle<()>,
}

impl FetchTicket {
    /// Wait for the request task. Returns `false` if it was cancelled or
    /// superseded before it could report.
    pub async fn finished(self) -> bool {
        self.handle.await.is_ok()
    }
}

/// Starts requests against a gateway and feeds their outcomes to a store
pub struct Dispatcher {
    store: Store,
    gateway: FetchGateway,
    in_flight: Arc<Mutex<AHashMap<RequestClass, AbortHandle>>>,
}

impl Dispatcher {
    pub fn new(store: Store, gateway: FetchGateway) -> Self {
        Self {
            store,
            gateway,
            in_flight: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Fetch the full snapshot
    pub fn fetch_all(&self) -> FetchTicket {
        self.start(RequestClass::All, |gateway, request_id| async move {
            match gateway.fetch_all().await.into_result() {
                Ok(snapshot) => Action::AllFulfilled { request_id, snapshot },
                Err(error) => Action::Rejected {
                    class: RequestClass::All,
                    request_id,
                    error,
                },
            }
        })
    }

    /// Fetch one platform by name. Unknown names end up as a rejection.
    pub fn fetch_platform(&self, platform: &str) -> FetchTicket {
        let platform = platform.to_string();
        self.start(RequestClass::Platform, |gateway, request_id| async move {
            match gateway.fetch_platform(&platform).await.into_result() {
                Ok(payload) => Action::PlatformFulfilled {
                    request_id,
                    platform: payload.platform,
                    stats: payload.stats,
                },
                Err(error) => Action::Rejected {
                    class: RequestClass::Platform,
                    request_id,
                    error,
                },
            }
        })
    }

    /// Fetch the historical series for `range`
    pub fn fetch_historical(&self, range: TimeRange) -> FetchTicket {
        self.start(RequestClass::Historical, |gateway, request_id| async move {
            match gateway.fetch_historical(range).await.into_result() {
                Ok(payload) => Action::HistoricalFulfilled { request_id, payload },
                Err(error) => Action::Rejected {
                    class: RequestClass::Historical,
                    request_id,
                    error,
                },
            }
        })
    }

    /// What a dashboard does when it mounts: the snapshot plus the
    /// historical series for the selected range.
    pub fn load_dashboard(&self) -> Vec<FetchTicket> {
        let range = self.store.read(|t| t.selected_time_range());
        vec![self.fetch_all(), self.fetch_historical(range)]
    }

    /// Cancel the pending request of `class`, if any.
    ///
    /// The request is rejected with a cancellation message so the class
    /// leaves its loading state.
    pub fn cancel(&self, class: RequestClass) -> bool {
        let Some(request_id) = self.store.read(|t| t.request(class).in_flight()) else {
            return false;
        };
        if let Some(handle) = self.in_flight.lock().remove(&class) {
            handle.abort();
        }
        info!(class = %class, request = %request_id, "Request cancelled");
        self.store.dispatch(Action::Rejected {
            class,
            request_id,
            error: SourceError::Cancelled.to_string(),
        });
        true
    }

    fn start<F, Fut>(&self, class: RequestClass, run: F) -> FetchTicket
    where
        F: FnOnce(FetchGateway, RequestId) -> Fut,
        Fut: Future<Output = Action> + Send + 'static,
    {
        let request_id = RequestId::new();
        self.store.dispatch(Action::Pending { class, request_id });

        let store = self.store.clone();
        let outcome = run(self.gateway.clone(), request_id);
        let handle = tokio::spawn(async move {
            let action = outcome.await;
            store.dispatch(action);
        });

        if let Some(previous) = self.in_flight.lock().insert(class, handle.abort_handle()) {
            debug!(class = %class, "Aborting superseded request");
            previous.abort();
        }

        FetchTicket {
            class,
            request_id,
            handle,
        }
    }
}
