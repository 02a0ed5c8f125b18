//! Service definitions as an operator writes them

use crate::check_type::{CheckType, CheckTypes};
use crate::dynamic_tag::DynamicTags;
use catalog_api::NodeService;
use serde::{Deserialize, Serialize};

/// ServiceDefinition is a service registration request from configuration
/// or the API, before defaults are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDefinition {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub dynamic_tags: DynamicTags,
    pub address: String,
    pub port: u16,

    /// Single inline check
    pub check: CheckType,

    pub checks: CheckTypes,

    /// ACL token the service is registered with
    pub token: String,

    pub enable_tag_override: bool,
}

impl ServiceDefinition {
    /// Build the catalog record. The service name doubles as the ID when no
    /// ID is given.
    pub fn node_service(&self) -> NodeService {
        let id = if self.id.is_empty() {
            self.name.clone()
        } else {
            self.id.clone()
        };

        NodeService {
            id,
            service: self.name.clone(),
            tags: self.tags.clone(),
            address: self.address.clone(),
            port: self.port,
            enable_tag_override: self.enable_tag_override,
        }
    }

    /// Checks to register with the service: the inline check first, then
    /// `checks` in order. Incomplete checks are skipped without error.
    pub fn check_types(&self) -> CheckTypes {
        std::iter::once(&self.check)
            .chain(self.checks.iter())
            .filter(|check| check.is_valid())
            .cloned()
            .collect()
    }

    /// Dynamic tags whose check is complete enough to run, in order
    pub fn tags_check_types(&self) -> DynamicTags {
        self.dynamic_tags
            .iter()
            .filter(|tag| tag.is_valid())
            .cloned()
            .collect()
    }
}
