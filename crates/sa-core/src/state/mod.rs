//! Dashboard state tree and its reducer

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{MetricsSnapshot, PlatformFilter, PlatformId, Post, TimeRange};

mod actions;
mod request;

pub use actions::{Action, Applied};
pub use request::{RequestClass, RequestId, RequestState, RequestStates};

/// User-selected narrowing criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub platform: PlatformFilter,
    #[serde(default)]
    pub date_range: TimeRange,
}

impl FilterState {
    /// Shallow merge: only the fields present in `update` change
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(platform) = update.platform {
            self.platform = platform;
        }
        if let Some(date_range) = update.date_range {
            self.date_range = date_range;
        }
    }
}

/// Partial filter change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    pub platform: Option<PlatformFilter>,
    pub date_range: Option<TimeRange>,
}

impl FilterUpdate {
    pub fn platform(platform: impl Into<PlatformFilter>) -> Self {
        Self {
            platform: Some(platform.into()),
            date_range: None,
        }
    }

    pub fn date_range(range: TimeRange) -> Self {
        Self {
            platform: None,
            date_range: Some(range),
        }
    }
}

/// Everything the dashboard knows at a point in time
#[derive(Debug, Clone)]
pub struct StateTree {
    data: Arc<MetricsSnapshot>,
    fetched_at: Option<DateTime<Utc>>,
    requests: RequestStates,
    filters: FilterState,
    default_filters: FilterState,
    selected_platform: Option<PlatformId>,
    selected_time_range: TimeRange,
}

impl StateTree {
    /// Create the initial tree with a zero-valued snapshot
    pub fn new(filters: FilterState) -> Self {
        Self {
            data: Arc::new(MetricsSnapshot::empty()),
            fetched_at: None,
            requests: RequestStates::default(),
            filters,
            default_filters: filters,
            selected_platform: None,
            selected_time_range: filters.date_range,
        }
    }

    /// Current snapshot. A snapshot still shared elsewhere is never mutated
    /// in place, so holders can compare pointers.
    pub fn data(&self) -> &Arc<MetricsSnapshot> {
        &self.data
    }

    /// Recent posts, or `None` while no full snapshot has ever arrived
    pub fn posts(&self) -> Option<&[Post]> {
        self.fetched_at.map(|_| self.data.recent_posts.as_slice())
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn request(&self, class: RequestClass) -> &RequestState {
        self.requests.get(class)
    }

    pub fn requests(&self) -> &RequestStates {
        &self.requests
    }

    pub fn filters(&self) -> FilterState {
        self.filters
    }

    pub fn selected_platform(&self) -> Option<PlatformId> {
        self.selected_platform
    }

    pub fn selected_time_range(&self) -> TimeRange {
        self.selected_time_range
    }

    /// Apply a transition. This is the only way the tree changes.
    pub fn apply(&mut self, action: Action) -> Applied {
        if let (Some(class), Some(id)) = (action.class(), action.request_id()) {
            if !matches!(action, Action::Pending { .. }) && !self.requests.get(class).accepts(id) {
                debug!(class = %class, request = %id, "Dropping outcome of superseded request");
                return Applied::Stale;
            }
        }

        match action {
            Action::SetFilter(update) => {
                let before = self.filters;
                self.filters.merge(update);
                changed(before != self.filters)
            }
            Action::ResetFilters => {
                let before = self.filters;
                self.filters = self.default_filters;
                changed(before != self.filters)
            }
            Action::SetSelectedPlatform(platform) => {
                let before = self.selected_platform;
                self.selected_platform = platform;
                changed(before != platform)
            }
            Action::SetSelectedTimeRange(range) => {
                let before = self.selected_time_range;
                self.selected_time_range = range;
                changed(before != range)
            }
            Action::Pending { class, request_id } => {
                if let Some(previous) = self.requests.get_mut(class).begin(request_id) {
                    debug!(class = %class, superseded = %previous, "Request superseded");
                }
                Applied::Changed
            }
            Action::AllFulfilled { snapshot, .. } => {
                self.requests.all.fulfil();
                self.data = Arc::new(snapshot);
                self.fetched_at = Some(Utc::now());
                Applied::Changed
            }
            Action::PlatformFulfilled { platform, stats, .. } => {
                self.requests.platform.fulfil();
                Arc::make_mut(&mut self.data).platforms.insert(platform, stats);
                Applied::Changed
            }
            Action::HistoricalFulfilled { payload, .. } => {
                self.requests.historical.fulfil();
                Arc::make_mut(&mut self.data).historical = payload.points;
                self.selected_time_range = payload.time_range;
                Applied::Changed
            }
            Action::Rejected { class, error, .. } => {
                let error = if error.is_empty() {
                    class.fallback_error().to_string()
                } else {
                    error
                };
                self.requests.get_mut(class).reject(error);
                Applied::Changed
            }
        }
    }
}

impl Default for StateTree {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

fn changed(differs: bool) -> Applied {
    if differs {
        Applied::Changed
    } else {
        Applied::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::HistoricalPayload;
    use crate::model::{HistoricalPoint, PlatformStats};

    fn pending(tree: &mut StateTree, class: RequestClass) -> RequestId {
        let request_id = RequestId::new();
        tree.apply(Action::Pending { class, request_id });
        request_id
    }

    fn snapshot_with_followers(followers: u64) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot::empty();
        snapshot.total_followers = followers;
        snapshot
    }

    #[test]
    fn test_set_filter_is_shallow_merge() {
        let mut tree = StateTree::default();
        tree.apply(Action::SetFilter(FilterUpdate::date_range(TimeRange::Last7Days)));
        tree.apply(Action::SetFilter(FilterUpdate::platform(PlatformId::Twitter)));

        let filters = tree.filters();
        assert_eq!(filters.platform, PlatformFilter::Only(PlatformId::Twitter));
        assert_eq!(filters.date_range, TimeRange::Last7Days);

        assert_eq!(tree.apply(Action::ResetFilters), Applied::Changed);
        assert_eq!(tree.filters(), FilterState::default());
    }

    #[test]
    fn test_all_fulfilled_replaces_snapshot() {
        let mut tree = StateTree::default();
        assert!(tree.posts().is_none());

        let id = pending(&mut tree, RequestClass::All);
        assert!(tree.request(RequestClass::All).loading());

        tree.apply(Action::AllFulfilled {
            request_id: id,
            snapshot: snapshot_with_followers(42),
        });
        assert!(!tree.request(RequestClass::All).loading());
        assert_eq!(tree.data().total_followers, 42);
        assert_eq!(tree.posts(), Some(&[][..]));
    }

    #[test]
    fn test_rejection_keeps_data_and_error_clears_on_next_pending() {
        let mut tree = StateTree::default();
        let id = pending(&mut tree, RequestClass::All);
        tree.apply(Action::AllFulfilled {
            request_id: id,
            snapshot: snapshot_with_followers(7),
        });

        let id = pending(&mut tree, RequestClass::All);
        tree.apply(Action::Rejected {
            class: RequestClass::All,
            request_id: id,
            error: "offline".to_string(),
        });
        assert_eq!(tree.request(RequestClass::All).error(), Some("offline"));
        assert_eq!(tree.data().total_followers, 7);

        let id = pending(&mut tree, RequestClass::All);
        assert_eq!(tree.request(RequestClass::All).error(), None);
        tree.apply(Action::AllFulfilled {
            request_id: id,
            snapshot: snapshot_with_followers(9),
        });
        assert_eq!(tree.request(RequestClass::All).error(), None);
        assert_eq!(tree.data().total_followers, 9);
    }

    #[test]
    fn test_platform_rejection_leaves_platforms_untouched() {
        let mut tree = StateTree::default();
        let before = tree.data().platforms.clone();

        let id = pending(&mut tree, RequestClass::Platform);
        tree.apply(Action::Rejected {
            class: RequestClass::Platform,
            request_id: id,
            error: "Failed to fetch snapchat data: Platform snapchat not found".to_string(),
        });

        assert_eq!(tree.data().platforms, before);
        assert!(tree.request(RequestClass::Platform).error().is_some());
        assert!(!tree.request(RequestClass::Platform).loading());
    }

    #[test]
    fn test_platform_fulfilled_replaces_one_key() {
        let mut tree = StateTree::default();
        let before = Arc::clone(tree.data());
        let id = pending(&mut tree, RequestClass::Platform);
        tree.apply(Action::PlatformFulfilled {
            request_id: id,
            platform: PlatformId::Instagram,
            stats: PlatformStats {
                followers: 15200,
                ..PlatformStats::default()
            },
        });

        assert_eq!(tree.data().platforms[&PlatformId::Instagram].followers, 15200);
        assert_eq!(tree.data().platforms[&PlatformId::Facebook].followers, 0);
        assert!(!Arc::ptr_eq(&before, tree.data()));
    }

    #[test]
    fn test_errors_are_local_to_their_class() {
        let mut tree = StateTree::default();
        let platform = pending(&mut tree, RequestClass::Platform);
        tree.apply(Action::PlatformFulfilled {
            request_id: platform,
            platform: PlatformId::Twitter,
            stats: PlatformStats {
                followers: 8750,
                ..PlatformStats::default()
            },
        });

        let historical = pending(&mut tree, RequestClass::Historical);
        tree.apply(Action::Rejected {
            class: RequestClass::Historical,
            request_id: historical,
            error: String::new(),
        });

        assert_eq!(
            tree.request(RequestClass::Historical).error(),
            Some("Failed to fetch historical data")
        );
        assert_eq!(tree.request(RequestClass::Platform).error(), None);
        assert_eq!(tree.data().platforms[&PlatformId::Twitter].followers, 8750);
    }

    #[test]
    fn test_superseded_outcome_is_dropped() {
        let mut tree = StateTree::default();
        let first = pending(&mut tree, RequestClass::Historical);
        let second = pending(&mut tree, RequestClass::Historical);

        let point = |label: &str| HistoricalPoint {
            label: label.to_string(),
            values: Default::default(),
        };

        // Second completes first
        let applied = tree.apply(Action::HistoricalFulfilled {
            request_id: second,
            payload: HistoricalPayload {
                points: vec![point("second")],
                time_range: TimeRange::Last90Days,
            },
        });
        assert_eq!(applied, Applied::Changed);

        let applied = tree.apply(Action::HistoricalFulfilled {
            request_id: first,
            payload: HistoricalPayload {
                points: vec![point("first")],
                time_range: TimeRange::Last7Days,
            },
        });
        assert_eq!(applied, Applied::Stale);
        assert_eq!(tree.data().historical[0].label, "second");
        assert_eq!(tree.selected_time_range(), TimeRange::Last90Days);
    }

    #[test]
    fn test_loading_and_error_never_coexist() {
        let mut tree = StateTree::default();
        for round in 0..4 {
            let id = pending(&mut tree, RequestClass::All);
            let state = tree.request(RequestClass::All);
            assert!(!(state.loading() && state.error().is_some()));
            if round % 2 == 0 {
                tree.apply(Action::Rejected {
                    class: RequestClass::All,
                    request_id: id,
                    error: "x".to_string(),
                });
            } else {
                tree.apply(Action::AllFulfilled {
                    request_id: id,
                    snapshot: MetricsSnapshot::empty(),
                });
            }
            let state = tree.request(RequestClass::All);
            assert!(!(state.loading() && state.error().is_some()));
        }
    }
}
