//! Agent configuration files

use crate::check::CheckDefinition;
use crate::service::ServiceDefinition;
use crate::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration read at agent start
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Name this node registers under
    pub node_name: String,

    /// Where runtime registrations are persisted; nothing is persisted
    /// when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    pub services: Vec<ServiceDefinition>,

    pub checks: Vec<CheckDefinition>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            data_dir: None,
            services: Vec::new(),
            checks: Vec::new(),
        }
    }
}

impl AgentConfig {
    /// Read a configuration file. `.yaml` and `.yml` files are parsed as
    /// YAML, anything else as JSON.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).await?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw)?,
            _ => Self::from_json_str(&raw)?,
        };
        debug!(
            "Loaded {} service(s) and {} check(s) from {}",
            config.services.len(),
            config.checks.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.node_name.trim().is_empty() {
            return Err(AgentError::InvalidConfiguration(
                "node_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_node_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}
