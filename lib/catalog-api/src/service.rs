use serde::{Deserialize, Serialize};

/// NodeService is a service instance as the catalog stores it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeService {
    /// Unique identity of the service on its node
    #[serde(rename = "ID")]
    pub id: String,

    /// Logical service name, shared by every instance
    pub service: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Address the service listens on; empty means the node address
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub port: u16,

    /// Whether the catalog may overwrite the tags of this instance
    #[serde(default)]
    pub enable_tag_override: bool,
}
