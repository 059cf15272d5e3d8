//! Shared handle to the state tree

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::events::events::{
    FiltersChanged, RequestFulfilled, RequestRejected, RequestStarted, SelectionChanged,
    StaleResponseDropped,
};
use crate::events::EventBus;
use crate::model::{PlatformId, TimeRange};
use crate::state::{Action, Applied, FilterState, FilterUpdate, RequestClass, RequestId, StateTree};

/// The single state tree of a dashboard session.
///
/// Cloning the store clones the handle, not the tree. All mutation goes
/// through [`Store::dispatch`]; observers subscribe on [`Store::events`].
#[derive(Clone)]
pub struct Store {
    tree: Arc<RwLock<StateTree>>,
    events: Arc<EventBus>,
}

/// What to announce once the write lock is released
enum Notice {
    Filters(FilterState),
    Selection(Option<PlatformId>, TimeRange),
    Started(RequestClass, RequestId),
    Fulfilled(RequestClass, RequestId),
    Rejected(RequestClass, RequestId, String),
}

/// Lifecycle step an action stands for
#[derive(Clone, Copy)]
enum Step {
    Started,
    Fulfilled,
    Rejected,
}

impl Store {
    pub fn new(filters: FilterState) -> Self {
        Self {
            tree: Arc::new(RwLock::new(StateTree::new(filters))),
            events: Arc::new(EventBus::new()),
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Apply an action and notify subscribers of what changed.
    ///
    /// Event payloads are taken under the write lock, so they describe the
    /// tree right after this action.
    pub fn dispatch(&self, action: Action) -> Applied {
        let name = action.name();
        let is_filter = matches!(action, Action::SetFilter(_) | Action::ResetFilters);
        let step = match &action {
            Action::Pending { .. } => Some(Step::Started),
            Action::Rejected { .. } => Some(Step::Rejected),
            Action::AllFulfilled { .. }
            | Action::PlatformFulfilled { .. }
            | Action::HistoricalFulfilled { .. } => Some(Step::Fulfilled),
            _ => None,
        };
        let lifecycle = action.class().zip(action.request_id());

        let (applied, notices) = {
            let mut tree = self.tree.write();
            let before = (tree.selected_platform(), tree.selected_time_range());
            let applied = tree.apply(action);

            let mut notices = Vec::new();
            if applied == Applied::Changed {
                if is_filter {
                    notices.push(Notice::Filters(tree.filters()));
                }
                if let (Some(step), Some((class, id))) = (step, lifecycle) {
                    notices.push(match step {
                        Step::Started => Notice::Started(class, id),
                        Step::Fulfilled => Notice::Fulfilled(class, id),
                        // Report the error as stored, fallback text included
                        Step::Rejected => Notice::Rejected(
                            class,
                            id,
                            tree.request(class).error().unwrap_or_default().to_string(),
                        ),
                    });
                }
                // Historical fulfilment moves the selected range too
                let after = (tree.selected_platform(), tree.selected_time_range());
                if after != before {
                    notices.push(Notice::Selection(after.0, after.1));
                }
            }
            (applied, notices)
        };

        debug!(action = name, ?applied, "Dispatched");
        if applied == Applied::Stale {
            if let Some((class, request_id)) = lifecycle {
                self.events.publish(StaleResponseDropped { class, request_id });
            }
        }
        for notice in notices {
            self.announce(notice);
        }
        applied
    }

    fn announce(&self, notice: Notice) {
        match notice {
            Notice::Filters(filters) => {
                self.events.publish(FiltersChanged { filters });
            }
            Notice::Selection(platform, time_range) => {
                self.events.publish(SelectionChanged { platform, time_range });
            }
            Notice::Started(class, request_id) => {
                self.events.publish(RequestStarted { class, request_id });
            }
            Notice::Fulfilled(class, request_id) => {
                info!(class = %class, "Request fulfilled");
                self.events.publish(RequestFulfilled { class, request_id });
            }
            Notice::Rejected(class, request_id, error) => {
                info!(class = %class, error = %error, "Request rejected");
                self.events.publish(RequestRejected { class, request_id, error });
            }
        }
    }

    /// Run `f` against the current tree under a read lock
    pub fn read<R>(&self, f: impl FnOnce(&StateTree) -> R) -> R {
        f(&self.tree.read())
    }

    /// Copy of the current tree. Cheap: the snapshot is shared.
    pub fn snapshot(&self) -> StateTree {
        self.tree.read().clone()
    }

    pub fn set_filter(&self, update: FilterUpdate) -> Applied {
        self.dispatch(Action::SetFilter(update))
    }

    pub fn reset_filters(&self) -> Applied {
        self.dispatch(Action::ResetFilters)
    }

    pub fn select_platform(&self, platform: Option<PlatformId>) -> Applied {
        self.dispatch(Action::SetSelectedPlatform(platform))
    }

    pub fn select_time_range(&self, range: TimeRange) -> Applied {
        self.dispatch(Action::SetSelectedTimeRange(range))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}
