//! Agent-side service and check registration
//!
//! This library provides:
//! - Service and check definitions as operators write them, and their
//!   translation into catalog records
//! - Dynamic tags, advertised only while their check passes
//! - Local state tracking what is registered on the node
//! - Persistence of runtime registrations across agent restarts

pub mod check;
pub mod check_type;
pub mod config;
pub mod duration;
pub mod dynamic_tag;
pub mod error;
pub mod persisted;
pub mod service;
pub mod state;

pub use check::CheckDefinition;
pub use check_type::{CheckType, CheckTypes};
pub use config::AgentConfig;
pub use dynamic_tag::{DynamicTag, DynamicTags};
pub use error::{AgentError, Result};
pub use persisted::{PersistedService, ServiceStore};
pub use service::ServiceDefinition;
pub use state::LocalState;
