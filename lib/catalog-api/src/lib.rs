//! Catalog record types shared between the agent and the catalog
//!
//! This library defines the canonical records the agent hands off:
//! - NodeService: a service instance registered on a node
//! - HealthCheck: a health check registered on a node, optionally bound to a service
//! - CheckId: identifier of a health check

pub mod health;
pub mod service;

pub use health::{CheckId, HealthCheck};
pub use service::NodeService;

/// Health status values understood by the catalog
pub mod status {
    pub const PASSING: &str = "passing";
    pub const WARNING: &str = "warning";
    pub const CRITICAL: &str = "critical";
}
