use agent_core::{AgentConfig, AgentError, LocalState};
use catalog_api::status;
use std::time::Duration;

const YAML: &str = r#"
node_name: node1
data_dir: /var/lib/agent
services:
  - name: redis
    tags: [cache]
    port: 6379
    check:
      tcp: localhost:6379
      interval: 10s
    dynamic_tags:
      - name: master
        script: /usr/local/bin/redis-is-master
        interval: 5s
      - name: unfinished
        interval: 5s
  - id: web-1
    name: web
    port: 8080
    checks:
      - http: http://localhost:8080/healthz
        interval: 15s
        timeout: 2s
      - script: /bin/true
checks:
  - name: ping
    ttl: 30s
  - id: mem
    name: Memory
    status: passing
    script: /usr/local/bin/check_mem
    interval: 1m
"#;

#[tokio::test]
async fn test_load_yaml_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("agent.yaml");
    std::fs::write(&path, YAML).unwrap();

    let config = AgentConfig::load(&path).await.unwrap();
    assert_eq!(config.node_name, "node1");
    assert_eq!(config.services.len(), 2);
    assert_eq!(config.checks.len(), 2);

    let redis = &config.services[0];
    assert_eq!(redis.node_service().id, "redis");
    assert_eq!(redis.dynamic_tags.names(), vec!["master", "unfinished"]);
    assert_eq!(redis.tags_check_types().names(), vec!["master"]);

    let web = &config.services[1];
    assert_eq!(web.node_service().id, "web-1");
    let checks = web.check_types();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].timeout, Duration::from_secs(2));

    let ping = config.checks[0].health_check("node1");
    assert_eq!(ping.check_id.as_str(), "ping");
    assert_eq!(ping.status, status::CRITICAL);

    let mem = config.checks[1].health_check("node1");
    assert_eq!(mem.check_id.as_str(), "mem");
    assert_eq!(mem.status, status::PASSING);
}

#[tokio::test]
async fn test_load_json_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("agent.json");
    std::fs::write(
        &path,
        r#"{"node_name":"node2","services":[{"name":"web","port":80}]}"#,
    )
    .unwrap();

    let config = AgentConfig::load(&path).await.unwrap();
    assert_eq!(config.node_name, "node2");
    assert_eq!(config.services[0].node_service().port, 80);
}

#[tokio::test]
async fn test_missing_file() {
    let err = AgentConfig::load("/nonexistent/agent.yaml").await.unwrap_err();
    assert!(matches!(err, AgentError::Io(_)));
}

#[tokio::test]
async fn test_bad_duration_is_reported() {
    let err = AgentConfig::from_yaml_str("services:\n  - name: x\n    check:\n      ttl: later\n")
        .unwrap_err();
    assert!(matches!(err, AgentError::Yaml(_)));
}

#[tokio::test]
async fn test_register_loaded_config() {
    let config = AgentConfig::from_yaml_str(YAML).unwrap();
    let state = LocalState::new(config.node_name.clone());

    for service in &config.services {
        state.add_service(service, &service.token, false).await.unwrap();
    }
    for check in &config.checks {
        state.add_check(check).await.unwrap();
    }

    assert_eq!(state.service_count().await, 2);
    // redis: tcp + master tag, web: http, plus ping and mem
    assert_eq!(state.check_count().await, 5);
    assert_eq!(state.effective_tags("redis").await.unwrap(), vec!["cache"]);
}
