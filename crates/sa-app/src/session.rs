//! One headless dashboard session
//!
//! Wires source, store and dispatcher together, replays the user's intents
//! through the rate limiters and collects what the report needs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use sa_core::events::events::{RequestRejected, StaleResponseDropped};
use sa_core::events::handler_from_fn;
use sa_core::rate_limit::{Debouncer, Throttler};
use sa_core::{
    Clock, Dispatcher, FetchGateway, FetchTicket, FilterUpdate, PlatformFilter, PlatformId,
    RateLimiter, Schedule, StateTree, Store, TimeRange,
};
use sa_data::{DashboardConfig, MockSource, RateLimitConfig};
use sa_views::{PostQuery, PostsProjection, PostsView, SortConfig};
use tracing::{debug, info};

/// Pause between two simulated keystrokes
const TYPING_INTERVAL: Duration = Duration::from_millis(100);

/// Reads the runtime's clock, so paused test time drives the rate limiters too
struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// What the user asked for on this run
#[derive(Debug, Clone, Default)]
pub struct Intents {
    pub platform: Option<PlatformFilter>,
    pub search: Option<String>,
    pub sort: SortConfig,
    pub ranges: Vec<TimeRange>,
    pub inspect: Option<String>,
    pub select: Option<PlatformId>,
}

/// Final state of a session
pub struct Outcome {
    pub tree: StateTree,
    pub query: PostQuery,
    pub posts: Arc<PostsProjection>,
    /// Rejections and dropped responses seen along the way
    pub notices: Vec<String>,
}

pub struct Session {
    dispatcher: Dispatcher,
    limits: RateLimitConfig,
    clock: Arc<dyn Clock>,
    notices: Arc<Mutex<Vec<String>>>,
}

impl Session {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let source = MockSource::from_config(&config.source).context("Failed to set up data source")?;
        Ok(Self::with_source(Arc::new(source), config))
    }

    pub fn with_source(source: Arc<MockSource>, config: &DashboardConfig) -> Self {
        let store = Store::new(config.filters);
        let notices = Arc::new(Mutex::new(Vec::new()));

        let sink = notices.clone();
        store.events().subscribe::<RequestRejected>(handler_from_fn(move |event| {
            if let Some(rejected) = event.as_any().downcast_ref::<RequestRejected>() {
                sink.lock().push(format!("{} request failed: {}", rejected.class, rejected.error));
            }
        }));
        let sink = notices.clone();
        store.events().subscribe::<StaleResponseDropped>(handler_from_fn(move |event| {
            if let Some(dropped) = event.as_any().downcast_ref::<StaleResponseDropped>() {
                sink.lock().push(format!("dropped superseded {} response", dropped.class));
            }
        }));

        let gateway = FetchGateway::new(source);
        info!("Using data source '{}'", gateway.source_name());

        Self {
            dispatcher: Dispatcher::new(store, gateway),
            limits: config.rate_limits.clone(),
            clock: Arc::new(TokioClock),
            notices,
        }
    }

    pub fn store(&self) -> &Store {
        self.dispatcher.store()
    }

    pub async fn run(&self, intents: &Intents) -> Result<Outcome> {
        let store = self.store();

        if let Some(platform) = intents.platform {
            store.set_filter(FilterUpdate::platform(platform));
        }
        if intents.select.is_some() {
            store.select_platform(intents.select);
        }

        wait_all(self.dispatcher.load_dashboard()).await;

        if let Some(ticket) = self.change_ranges(&intents.ranges) {
            wait_all(vec![ticket]).await;
        }

        if let Some(name) = &intents.inspect {
            wait_all(vec![self.dispatcher.fetch_platform(name)]).await;
        }

        let search = match &intents.search {
            Some(term) => self.type_search(term).await,
            None => String::new(),
        };

        let tree = store.snapshot();
        let query = PostQuery::new(&tree.filters(), search, intents.sort);
        let posts = PostsView::new().project(&tree, &query);

        Ok(Outcome {
            tree,
            query,
            posts,
            notices: self.notices.lock().clone(),
        })
    }

    /// Switch time ranges through the throttler. Each accepted change
    /// supersedes the previous historical request.
    fn change_ranges(&self, ranges: &[TimeRange]) -> Option<FetchTicket> {
        let mut throttler = Throttler::new(self.limits.range_throttle, self.clock.clone());
        let mut latest = None;

        for &range in ranges {
            match throttler.schedule(range) {
                Schedule::Executed(range) => {
                    self.store().select_time_range(range);
                    latest = Some(self.dispatcher.fetch_historical(range));
                }
                _ => debug!("Range change to {} suppressed", range),
            }
        }
        latest
    }

    /// Feed the term one keystroke at a time and return what the debouncer
    /// finally lets through
    async fn type_search(&self, term: &str) -> String {
        let term = self.debounce_keystrokes(term).await.pop().unwrap_or_default();
        debug!("Search settled on '{}'", term);
        term
    }

    /// Every term the debouncer released while `term` was being typed
    async fn debounce_keystrokes(&self, term: &str) -> Vec<String> {
        let mut debouncer = Debouncer::new(self.limits.search_debounce, self.clock.clone());
        let mut typed = String::new();
        let mut released = Vec::new();

        for ch in term.chars() {
            if !typed.is_empty() {
                tokio::time::sleep(TYPING_INTERVAL).await;
            }
            released.extend(debouncer.poll());
            typed.push(ch);
            if let Schedule::Executed(value) = debouncer.schedule(typed.clone()) {
                released.push(value);
            }
        }

        while debouncer.is_pending() {
            tokio::time::sleep(self.limits.search_debounce).await;
            released.extend(debouncer.poll());
        }
        released
    }
}

async fn wait_all(tickets: Vec<FetchTicket>) {
    for ticket in tickets {
        let class = ticket.class;
        if !ticket.finished().await {
            debug!("{} request ended without reporting", class);
        }
    }
}
