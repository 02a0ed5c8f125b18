use agent_core::{AgentConfig, LocalState, ServiceStore};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var("AGENT_CONFIG").unwrap_or_else(|_| "agent.yaml".to_string());
    info!("Starting agent with configuration {}...", config_path);

    let config = AgentConfig::load(&config_path)
        .await
        .with_context(|| format!("failed to load {}", config_path))?;

    let mut state = LocalState::new(config.node_name.clone());
    if let Some(data_dir) = &config.data_dir {
        state = state.with_store(ServiceStore::new(data_dir));
        info!("Restoring service snapshots from {}", data_dir.display());
    } else {
        debug!("No data_dir configured, no service snapshots to restore");
    }

    register_config(&state, &config).await;

    match state.restore_services().await {
        Ok(count) => info!("Restored {} persisted services", count),
        Err(e) => error!("Error restoring persisted services: {}", e),
    }

    info!(
        "Node {} has {} services and {} checks",
        state.node_name(),
        state.service_count().await,
        state.check_count().await
    );

    // Periodic report loop
    let mut interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = interval.tick() => report(&state).await,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down agent");
                return Ok(());
            }
        }
    }
}

/// Register configured services and checks. Configured services are not
/// persisted; they come back from the configuration on the next start. This
/// binary only reads snapshots: they are written by runtime registrations
/// made through `LocalState::add_service` with `persist` set.
async fn register_config(state: &LocalState, config: &AgentConfig) {
    for def in &config.services {
        match state.add_service(def, &def.token, false).await {
            Ok(service) => info!("Registered service {} on port {}", service.id, service.port),
            Err(e) => error!("Error registering service {:?}: {}", def.name, e),
        }
    }

    for def in &config.checks {
        match state.add_check(def).await {
            Ok(check) => info!("Registered check {}", check.check_id),
            Err(e) => error!("Error registering check {:?}: {}", def.name, e),
        }
    }
}

async fn report(state: &LocalState) {
    for service in state.services().await {
        let tags = match state.effective_tags(&service.id).await {
            Ok(tags) => tags,
            Err(e) => {
                error!("Error reading tags of {}: {}", service.id, e);
                continue;
            }
        };

        let failing = state
            .service_checks(&service.id)
            .await
            .into_iter()
            .filter(|check| check.status == catalog_api::status::CRITICAL)
            .count();

        debug!(
            "Service {} advertises tags {:?} ({} critical checks)",
            service.id, tags, failing
        );
    }
}
