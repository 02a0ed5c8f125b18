//! Serde adapters for durations written as "10s", "1m30s", "250ms"
//!
//! A zero duration means "unset" and serializes as an empty string.

use serde::{de, Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if duration.is_zero() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(raw)
        .map_err(|e| de::Error::custom(format!("invalid duration {:?}: {}", raw, e)))
}
