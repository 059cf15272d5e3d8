//! Named transitions of the state tree

use crate::gateway::HistoricalPayload;
use crate::model::{MetricsSnapshot, PlatformId, PlatformStats, TimeRange};

use super::{FilterUpdate, RequestClass, RequestId};

/// Every way the state tree can change
#[derive(Debug, Clone)]
pub enum Action {
    /// Shallow-merge into the active filters
    SetFilter(FilterUpdate),
    ResetFilters,
    SetSelectedPlatform(Option<PlatformId>),
    SetSelectedTimeRange(TimeRange),

    /// A request of `class` has started
    Pending {
        class: RequestClass,
        request_id: RequestId,
    },
    AllFulfilled {
        request_id: RequestId,
        snapshot: MetricsSnapshot,
    },
    PlatformFulfilled {
        request_id: RequestId,
        platform: PlatformId,
        stats: PlatformStats,
    },
    HistoricalFulfilled {
        request_id: RequestId,
        payload: HistoricalPayload,
    },
    Rejected {
        class: RequestClass,
        request_id: RequestId,
        error: String,
    },
}

impl Action {
    /// Request class this action belongs to, if it is a lifecycle transition
    pub fn class(&self) -> Option<RequestClass> {
        match self {
            Action::Pending { class, .. } | Action::Rejected { class, .. } => Some(*class),
            Action::AllFulfilled { .. } => Some(RequestClass::All),
            Action::PlatformFulfilled { .. } => Some(RequestClass::Platform),
            Action::HistoricalFulfilled { .. } => Some(RequestClass::Historical),
            _ => None,
        }
    }

    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Action::Pending { request_id, .. }
            | Action::AllFulfilled { request_id, .. }
            | Action::PlatformFulfilled { request_id, .. }
            | Action::HistoricalFulfilled { request_id, .. }
            | Action::Rejected { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::SetFilter(_) => "set_filter",
            Action::ResetFilters => "reset_filters",
            Action::SetSelectedPlatform(_) => "set_selected_platform",
            Action::SetSelectedTimeRange(_) => "set_selected_time_range",
            Action::Pending { .. } => "pending",
            Action::AllFulfilled { .. } => "all_fulfilled",
            Action::PlatformFulfilled { .. } => "platform_fulfilled",
            Action::HistoricalFulfilled { .. } => "historical_fulfilled",
            Action::Rejected { .. } => "rejected",
        }
    }
}

/// What applying an action did to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    /// Nothing differed after the action
    Unchanged,
    /// Outcome of a superseded request; dropped
    Stale,
}
