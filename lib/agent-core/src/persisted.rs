//! Durable snapshots of registered services
//!
//! Services registered at runtime are written to the data directory together
//! with the token they were registered with, so both can be restored when the
//! agent starts again.

use crate::Result;
use catalog_api::NodeService;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Directory under the data dir holding one file per service
pub const SERVICES_DIR: &str = "services";

/// A service record bundled with its ACL token
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersistedService {
    pub token: String,
    pub service: NodeService,
}

/// On-disk store for [`PersistedService`] records
#[derive(Clone, Debug)]
pub struct ServiceStore {
    dir: PathBuf,
}

impl ServiceStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join(SERVICES_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a service ID is stored under. IDs are hashed so that any
    /// characters are safe in a file name.
    pub fn path_for(&self, service_id: &str) -> PathBuf {
        let digest = Sha256::digest(service_id.as_bytes());
        self.dir.join(hex::encode(digest))
    }

    /// Write or overwrite the snapshot of a service
    pub async fn save(&self, record: &PersistedService) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&record.service.id);
        let encoded = serde_json::to_vec(record)?;
        fs::write(&path, encoded).await?;
        debug!("Persisted service {} to {}", record.service.id, path.display());
        Ok(())
    }

    /// Delete the snapshot of a service; a missing file is not an error
    pub async fn remove(&self, service_id: &str) -> Result<()> {
        match fs::remove_file(self.path_for(service_id)).await {
            Ok(()) => {
                debug!("Removed persisted service {}", service_id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read every snapshot back. Files that cannot be read or decoded are
    /// skipped with a warning so that one corrupt file does not block the
    /// agent from starting.
    pub async fn load_all(&self) -> Result<Vec<PersistedService>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                continue;
            }

            let raw = match fs::read(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping unreadable persisted service {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_slice::<PersistedService>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping persisted service {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| a.service.id.cmp(&b.service.id));
        Ok(records)
    }
}
