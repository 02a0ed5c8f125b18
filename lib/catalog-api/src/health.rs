use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a health check, unique per node
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(pub String);

impl CheckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CheckId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CheckId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// HealthCheck is a check registered on a node
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheck {
    /// Node the check runs on
    pub node: String,

    #[serde(rename = "CheckID")]
    pub check_id: CheckId,

    pub name: String,

    /// One of the values in [`crate::status`]
    pub status: String,

    #[serde(default)]
    pub notes: String,

    /// Output of the last check run
    #[serde(default)]
    pub output: String,

    /// Service this check is bound to; empty for node-level checks
    #[serde(rename = "ServiceID", default)]
    pub service_id: String,

    #[serde(default)]
    pub service_name: String,
}

impl HealthCheck {
    pub fn is_passing(&self) -> bool {
        self.status == crate::status::PASSING
    }
}
