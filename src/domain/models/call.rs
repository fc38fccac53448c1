//! Call identity and backgrounding requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token identifying one call for the lifetime of that call.
///
/// Issued by the Call Session Provider; never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CallId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single request to background the app for a call.
///
/// Built per `initiate_backgrounding` call and consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundingRequest {
    pub call_id: CallId,
    /// Hint; ignored when absent or when the named strategy is unavailable.
    pub preferred_strategy: Option<String>,
}

impl BackgroundingRequest {
    pub fn new(call_id: impl Into<CallId>) -> Self {
        Self {
            call_id: call_id.into(),
            preferred_strategy: None,
        }
    }

    pub fn with_preferred_strategy(mut self, name: impl Into<String>) -> Self {
        self.preferred_strategy = Some(name.into());
        self
    }
}
