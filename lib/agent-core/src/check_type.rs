//! Check mechanism descriptions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// CheckType describes how a health check is executed.
///
/// It has no identity of its own; it becomes a check once it is attached to
/// a node or a service. Exactly which mechanism runs is decided by the check
/// runner, the predicates here only say whether enough is filled in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckType {
    /// Script run periodically; exit code maps to status
    pub script: String,

    /// URL polled periodically
    pub http: String,

    /// host:port dialed periodically
    pub tcp: String,

    /// Container the script is executed in
    pub docker_container_id: String,

    /// Shell used inside the container
    pub shell: String,

    #[serde(with = "crate::duration")]
    pub interval: Duration,

    #[serde(with = "crate::duration")]
    pub timeout: Duration,

    /// Check is passing only while it is refreshed within this window
    #[serde(with = "crate::duration")]
    pub ttl: Duration,

    /// Initial status; empty means the catalog default
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl CheckType {
    pub fn is_ttl(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn is_monitor(&self) -> bool {
        !self.script.is_empty() && self.docker_container_id.is_empty() && self.has_interval()
    }

    pub fn is_http(&self) -> bool {
        !self.http.is_empty() && self.has_interval()
    }

    pub fn is_tcp(&self) -> bool {
        !self.tcp.is_empty() && self.has_interval()
    }

    pub fn is_docker(&self) -> bool {
        !self.docker_container_id.is_empty() && !self.script.is_empty() && self.has_interval()
    }

    /// Whether the description is complete enough to register
    pub fn is_valid(&self) -> bool {
        self.is_ttl() || self.is_monitor() || self.is_http() || self.is_tcp() || self.is_docker()
    }

    fn has_interval(&self) -> bool {
        !self.interval.is_zero()
    }
}

/// Ordered collection of check types; registration order is kept
pub type CheckTypes = Vec<CheckType>;

#[cfg(test)]
mod tests {
    use super::*;

    fn every_ten_seconds() -> CheckType {
        CheckType {
            interval: Duration::from_secs(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_check_is_invalid() {
        assert!(!CheckType::default().is_valid());
        assert!(!every_ten_seconds().is_valid());
    }

    #[test]
    fn test_ttl_needs_nothing_else() {
        let check = CheckType {
            ttl: Duration::from_secs(30),
            ..Default::default()
        };
        assert!(check.is_ttl());
        assert!(check.is_valid());
    }

    #[test]
    fn test_interval_mechanisms() {
        let script = CheckType {
            script: "/bin/check_mem".to_string(),
            ..every_ten_seconds()
        };
        assert!(script.is_monitor());
        assert!(script.is_valid());

        let http = CheckType {
            http: "http://localhost:8080/healthz".to_string(),
            ..every_ten_seconds()
        };
        assert!(http.is_http());
        assert!(http.is_valid());

        let tcp = CheckType {
            tcp: "localhost:6379".to_string(),
            ..every_ten_seconds()
        };
        assert!(tcp.is_tcp());
        assert!(tcp.is_valid());
    }

    #[test]
    fn test_interval_mechanisms_without_interval() {
        let http = CheckType {
            http: "http://localhost:8080/healthz".to_string(),
            ..Default::default()
        };
        assert!(!http.is_valid());

        let script = CheckType {
            script: "/bin/true".to_string(),
            timeout: Duration::from_secs(1),
            ..Default::default()
        };
        assert!(!script.is_valid());
    }

    #[test]
    fn test_docker_is_not_a_monitor() {
        let docker = CheckType {
            script: "/bin/check".to_string(),
            docker_container_id: "f972c95ebf0e".to_string(),
            shell: "/bin/sh".to_string(),
            ..every_ten_seconds()
        };
        assert!(docker.is_docker());
        assert!(!docker.is_monitor());
        assert!(docker.is_valid());

        let no_script = CheckType {
            docker_container_id: "f972c95ebf0e".to_string(),
            ..every_ten_seconds()
        };
        assert!(!no_script.is_valid());
    }

    #[test]
    fn test_decode_from_config() {
        let check: CheckType =
            serde_json::from_str(r#"{"http":"http://localhost/health","interval":"15s","timeout":"1s"}"#)
                .unwrap();
        assert_eq!(check.interval, Duration::from_secs(15));
        assert_eq!(check.timeout, Duration::from_secs(1));
        assert!(check.is_http());
    }
}
