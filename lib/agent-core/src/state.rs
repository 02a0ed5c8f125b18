//! Local agent state: the services and checks registered on this node

use crate::check::CheckDefinition;
use crate::check_type::CheckType;
use crate::persisted::{PersistedService, ServiceStore};
use crate::service::ServiceDefinition;
use crate::{AgentError, Result};
use catalog_api::{status, CheckId, HealthCheck, NodeService};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A registered service
#[derive(Clone, Debug)]
struct ServiceEntry {
    service: NodeService,
    token: String,
    /// Dynamic tag name and the ID of the check that drives it
    dynamic_tags: Vec<(String, CheckId)>,
    /// Checks created from the definition, tag checks included
    owned_checks: Vec<CheckId>,
}

/// A registered check along with the description the runner executes
#[derive(Clone, Debug)]
struct CheckEntry {
    check: HealthCheck,
    check_type: CheckType,
    token: String,
}

#[derive(Debug, Default)]
struct Inner {
    services: HashMap<String, ServiceEntry>,
    checks: HashMap<CheckId, CheckEntry>,
}

/// LocalState tracks what is registered on this node
#[derive(Clone)]
pub struct LocalState {
    node_name: String,
    store: Option<ServiceStore>,
    inner: Arc<RwLock<Inner>>,
}

impl LocalState {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            store: None,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Persist services registered with `persist` set into `store`
    pub fn with_store(mut self, store: ServiceStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Register a service together with its checks and dynamic tag checks.
    ///
    /// Registering an ID again replaces the previous registration and the
    /// checks it created; checks added separately with [`Self::add_check`]
    /// are kept. Incomplete checks in the definition are skipped. With
    /// `persist` set the snapshot is written first, and nothing is
    /// registered when writing it fails.
    pub async fn add_service(
        &self,
        def: &ServiceDefinition,
        token: &str,
        persist: bool,
    ) -> Result<NodeService> {
        let service = def.node_service();
        if service.id.is_empty() {
            return Err(AgentError::InvalidConfiguration(
                "service name is required".to_string(),
            ));
        }

        let check_types = def.check_types();
        let supplied = usize::from(def.check != CheckType::default()) + def.checks.len();
        if check_types.len() < supplied {
            warn!(
                "Service {}: skipped {} incomplete check(s)",
                service.id,
                supplied - check_types.len()
            );
        }

        let active_tags = def.tags_check_types();
        if active_tags.len() < def.dynamic_tags.len() {
            warn!(
                "Service {}: skipped {} dynamic tag(s) with incomplete checks",
                service.id,
                def.dynamic_tags.len() - active_tags.len()
            );
        }

        let mut checks = Vec::with_capacity(check_types.len() + active_tags.len());
        for (index, check_type) in check_types.iter().enumerate() {
            let check_id = if check_types.len() == 1 {
                format!("service:{}", service.id)
            } else {
                format!("service:{}:{}", service.id, index + 1)
            };
            let name = format!("Service '{}' check", service.service);
            checks.push(self.service_check(&service, check_id, name, check_type, token));
        }

        let mut dynamic_tags = Vec::with_capacity(active_tags.len());
        for tag in &active_tags {
            let check_id = format!("service:{}:tag:{}", service.id, tag.name);
            let name = format!("Tag '{}' check", tag.name);
            let entry = self.service_check(&service, check_id, name, &tag.check, token);
            dynamic_tags.push((tag.name.clone(), entry.check.check_id.clone()));
            checks.push(entry);
        }

        if persist {
            self.persist(&service, token).await?;
        }

        let owned_checks: Vec<CheckId> = checks.iter().map(|c| c.check.check_id.clone()).collect();
        {
            let mut inner = self.inner.write().await;
            if let Some(previous) = inner.services.remove(&service.id) {
                for check_id in &previous.owned_checks {
                    inner.checks.remove(check_id);
                }
            }
            for entry in checks {
                inner.checks.insert(entry.check.check_id.clone(), entry);
            }
            inner.services.insert(
                service.id.clone(),
                ServiceEntry {
                    service: service.clone(),
                    token: token.to_string(),
                    dynamic_tags,
                    owned_checks,
                },
            );
        }
        debug!("Registered service: {}", service.id);
        Ok(service)
    }

    /// Register a standalone check. IDs of checks created by a service
    /// registration are reserved and refused.
    pub async fn add_check(&self, def: &CheckDefinition) -> Result<HealthCheck> {
        let mut check = def.health_check(&self.node_name);
        if check.check_id.is_empty() {
            return Err(AgentError::InvalidConfiguration(
                "check ID or name is required".to_string(),
            ));
        }
        if !def.check.is_valid() {
            return Err(AgentError::InvalidConfiguration(format!(
                "check {} has no script, http, tcp or ttl configured",
                check.check_id
            )));
        }

        let mut inner = self.inner.write().await;
        if let Some(owner) = inner.check_owner(&check.check_id) {
            return Err(AgentError::InvalidConfiguration(format!(
                "check {} is managed by service {}",
                check.check_id, owner
            )));
        }
        if !check.service_id.is_empty() {
            let entry = inner
                .services
                .get(&check.service_id)
                .ok_or_else(|| AgentError::ServiceNotFound(check.service_id.clone()))?;
            check.service_name = entry.service.service.clone();
        }

        inner.checks.insert(
            check.check_id.clone(),
            CheckEntry {
                check: check.clone(),
                check_type: def.check.clone(),
                token: def.token.clone(),
            },
        );
        debug!("Registered check: {}", check.check_id);
        Ok(check)
    }

    /// Re-register services saved by earlier runs. Services already
    /// registered, e.g. from configuration, win over their snapshots.
    pub async fn restore_services(&self) -> Result<usize> {
        let store = match &self.store {
            Some(store) => store,
            None => return Ok(0),
        };

        let records = store.load_all().await?;
        let mut inner = self.inner.write().await;
        let mut restored = 0;
        for PersistedService { token, service } in records {
            if inner.services.contains_key(&service.id) {
                debug!("Service {} already registered, ignoring snapshot", service.id);
                continue;
            }
            debug!("Restored service: {}", service.id);
            inner.services.insert(
                service.id.clone(),
                ServiceEntry {
                    service,
                    token,
                    dynamic_tags: Vec::new(),
                    owned_checks: Vec::new(),
                },
            );
            restored += 1;
        }
        Ok(restored)
    }

    /// Record the result of a check run
    pub async fn update_check(&self, check_id: &CheckId, status: &str, output: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .checks
            .get_mut(check_id)
            .ok_or_else(|| AgentError::CheckNotFound(check_id.to_string()))?;

        if entry.check.status != status {
            debug!("Check {} is now {}", check_id, status);
        }
        entry.check.status = status.to_string();
        entry.check.output = output.to_string();
        Ok(())
    }

    /// Deregister a service and every check bound to it
    pub async fn remove_service(&self, service_id: &str) -> Result<()> {
        {
            let mut inner = self.inner.write().await;
            if inner.services.remove(service_id).is_none() {
                return Err(AgentError::ServiceNotFound(service_id.to_string()));
            }
            inner.remove_service_checks(service_id);
        }
        debug!("Deregistered service: {}", service_id);

        if let Some(store) = &self.store {
            store.remove(service_id).await?;
        }
        Ok(())
    }

    pub async fn remove_check(&self, check_id: &CheckId) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .checks
            .remove(check_id)
            .ok_or_else(|| AgentError::CheckNotFound(check_id.to_string()))?;
        debug!("Deregistered check: {}", check_id);
        Ok(())
    }

    pub async fn service(&self, service_id: &str) -> Result<NodeService> {
        let inner = self.inner.read().await;
        inner
            .services
            .get(service_id)
            .map(|entry| entry.service.clone())
            .ok_or_else(|| AgentError::ServiceNotFound(service_id.to_string()))
    }

    /// Token the service was registered with
    pub async fn service_token(&self, service_id: &str) -> Result<String> {
        let inner = self.inner.read().await;
        inner
            .services
            .get(service_id)
            .map(|entry| entry.token.clone())
            .ok_or_else(|| AgentError::ServiceNotFound(service_id.to_string()))
    }

    /// All services, ordered by ID
    pub async fn services(&self) -> Vec<NodeService> {
        let inner = self.inner.read().await;
        let mut services: Vec<NodeService> =
            inner.services.values().map(|entry| entry.service.clone()).collect();
        services.sort_by(|a, b| a.id.cmp(&b.id));
        services
    }

    /// All checks, ordered by ID
    pub async fn checks(&self) -> Vec<HealthCheck> {
        let inner = self.inner.read().await;
        let mut checks: Vec<HealthCheck> =
            inner.checks.values().map(|entry| entry.check.clone()).collect();
        checks.sort_by(|a, b| a.check_id.cmp(&b.check_id));
        checks
    }

    /// Checks bound to one service, ordered by ID
    pub async fn service_checks(&self, service_id: &str) -> Vec<HealthCheck> {
        self.checks()
            .await
            .into_iter()
            .filter(|check| check.service_id == service_id)
            .collect()
    }

    /// Execution description of a check, for the check runner
    pub async fn check_type(&self, check_id: &CheckId) -> Result<CheckType> {
        let inner = self.inner.read().await;
        inner
            .checks
            .get(check_id)
            .map(|entry| entry.check_type.clone())
            .ok_or_else(|| AgentError::CheckNotFound(check_id.to_string()))
    }

    /// Token the check was registered with
    pub async fn check_token(&self, check_id: &CheckId) -> Result<String> {
        let inner = self.inner.read().await;
        inner
            .checks
            .get(check_id)
            .map(|entry| entry.token.clone())
            .ok_or_else(|| AgentError::CheckNotFound(check_id.to_string()))
    }

    /// Names of the dynamic tags whose check is passing
    pub async fn active_dynamic_tags(&self, service_id: &str) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        let entry = inner
            .services
            .get(service_id)
            .ok_or_else(|| AgentError::ServiceNotFound(service_id.to_string()))?;
        Ok(inner.passing_tags(entry).collect())
    }

    /// Tags to advertise: static tags followed by passing dynamic tags
    pub async fn effective_tags(&self, service_id: &str) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        let entry = inner
            .services
            .get(service_id)
            .ok_or_else(|| AgentError::ServiceNotFound(service_id.to_string()))?;

        let mut tags = entry.service.tags.clone();
        for tag in inner.passing_tags(entry) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }

    pub async fn service_count(&self) -> usize {
        self.inner.read().await.services.len()
    }

    pub async fn check_count(&self) -> usize {
        self.inner.read().await.checks.len()
    }

    fn service_check(
        &self,
        service: &NodeService,
        check_id: String,
        name: String,
        check_type: &CheckType,
        token: &str,
    ) -> CheckEntry {
        let status = if check_type.status.is_empty() {
            status::CRITICAL.to_string()
        } else {
            check_type.status.clone()
        };

        CheckEntry {
            check: HealthCheck {
                node: self.node_name.clone(),
                check_id: CheckId::new(check_id),
                name,
                status,
                notes: check_type.notes.clone(),
                service_id: service.id.clone(),
                service_name: service.service.clone(),
                ..Default::default()
            },
            check_type: check_type.clone(),
            token: token.to_string(),
        }
    }

    async fn persist(&self, service: &NodeService, token: &str) -> Result<()> {
        if let Some(store) = &self.store {
            let record = PersistedService {
                token: token.to_string(),
                service: service.clone(),
            };
            store.save(&record).await?;
        }
        Ok(())
    }
}

impl Inner {
    fn remove_service_checks(&mut self, service_id: &str) {
        self.checks.retain(|_, entry| entry.check.service_id != service_id);
    }

    /// Service whose registration created `check_id`
    fn check_owner(&self, check_id: &CheckId) -> Option<&str> {
        self.services
            .values()
            .find(|entry| entry.owned_checks.contains(check_id))
            .map(|entry| entry.service.id.as_str())
    }

    fn passing_tags<'a>(&'a self, entry: &'a ServiceEntry) -> impl Iterator<Item = String> + 'a {
        entry
            .dynamic_tags
            .iter()
            .filter(|(_, check_id)| {
                self.checks
                    .get(check_id)
                    .map(|check| {
                        check.check.service_id == entry.service.id && check.check.is_passing()
                    })
                    .unwrap_or(false)
            })
            .map(|(name, _)| name.clone())
    }
}
