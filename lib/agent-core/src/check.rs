//! Standalone check definitions

use crate::check_type::CheckType;
use catalog_api::{status, CheckId, HealthCheck};
use serde::{Deserialize, Serialize};

/// CheckDefinition is a check registration request from configuration or
/// the API. The mechanism fields sit next to the identity fields in
/// configuration; `status` and `notes` are read here, not from `check`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckDefinition {
    pub id: CheckId,
    pub name: String,
    pub notes: String,

    /// Service the check belongs to; empty for node-level checks
    pub service_id: String,

    pub token: String,

    /// Initial status; empty means critical
    pub status: String,

    #[serde(flatten)]
    pub check: CheckType,
}

impl CheckDefinition {
    /// Build the catalog record for `node`.
    ///
    /// An empty ID falls back to the name. When both are empty the check ID
    /// stays empty and it is up to the caller to refuse it.
    pub fn health_check(&self, node: &str) -> HealthCheck {
        let status = if self.status.is_empty() {
            status::CRITICAL.to_string()
        } else {
            self.status.clone()
        };

        let check_id = if self.id.is_empty() {
            CheckId::new(self.name.clone())
        } else {
            self.id.clone()
        };

        HealthCheck {
            node: node.to_string(),
            check_id,
            name: self.name.clone(),
            status,
            notes: self.notes.clone(),
            service_id: self.service_id.clone(),
            ..Default::default()
        }
    }
}
