//! Per-class request bookkeeping

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three independent request lifecycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestClass {
    All,
    Platform,
    Historical,
}

impl RequestClass {
    pub const ALL: [RequestClass; 3] = [RequestClass::All, RequestClass::Platform, RequestClass::Historical];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::All => "all",
            RequestClass::Platform => "platform",
            RequestClass::Historical => "historical",
        }
    }

    /// Message used when a rejection carries no text of its own
    pub fn fallback_error(&self) -> &'static str {
        match self {
            RequestClass::All => "Failed to fetch data",
            RequestClass::Platform => "Failed to fetch platform data",
            RequestClass::Historical => "Failed to fetch historical data",
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of one started request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Loading/error flags of one request class.
///
/// `loading` and a present `error` are never true together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestState {
    loading: bool,
    error: Option<String>,
    in_flight: Option<RequestId>,
}

impl RequestState {
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The request whose outcome will be accepted, if one is pending
    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Start a request, superseding whatever was pending.
    /// Returns the superseded request id.
    pub(crate) fn begin(&mut self, id: RequestId) -> Option<RequestId> {
        self.loading = true;
        self.error = None;
        self.in_flight.replace(id)
    }

    /// Whether an outcome for `id` should be applied
    pub(crate) fn accepts(&self, id: RequestId) -> bool {
        self.in_flight == Some(id)
    }

    pub(crate) fn fulfil(&mut self) {
        self.loading = false;
        self.in_flight = None;
    }

    pub(crate) fn reject(&mut self, error: String) {
        self.loading = false;
        self.in_flight = None;
        self.error = Some(error);
    }
}

/// Request states of all three classes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestStates {
    pub all: RequestState,
    pub platform: RequestState,
    pub historical: RequestState,
}

impl RequestStates {
    pub fn get(&self, class: RequestClass) -> &RequestState {
        match class {
            RequestClass::All => &self.all,
            RequestClass::Platform => &self.platform,
            RequestClass::Historical => &self.historical,
        }
    }

    pub(crate) fn get_mut(&mut self, class: RequestClass) -> &mut RequestState {
        match class {
            RequestClass::All => &mut self.all,
            RequestClass::Platform => &mut self.platform,
            RequestClass::Historical => &mut self.historical,
        }
    }
}
