//! Relay configuration

use sensorwatch_common::{Result, SensorwatchError, DEFAULT_COLLECTION_INTERVAL_MS, DEFAULT_HISTORY_SIZE};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Whether usage events follow the instance monitoring flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UsageGating {
    /// Usage events are emitted regardless of the monitoring flag
    #[default]
    Independent,
    /// Usage events are only emitted for instances with monitoring enabled
    FollowMonitoring,
}

impl FromStr for UsageGating {
    type Err = SensorwatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(UsageGating::Independent),
            "follow-monitoring" | "follow_monitoring" => Ok(UsageGating::FollowMonitoring),
            other => Err(SensorwatchError::Config(format!(
                "unknown usage gating policy: {}",
                other
            ))),
        }
    }
}

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Historical values requested per dimension
    pub history_size: u32,
    /// Collection cycle length in milliseconds
    pub collection_interval_ms: u64,
    /// Resources processed concurrently within one batch
    pub max_concurrent_resources: usize,
    /// Usage event policy for unmonitored instances
    pub usage_gating: UsageGating,
    /// Usage event channel buffer size
    pub event_channel_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            collection_interval_ms: DEFAULT_COLLECTION_INTERVAL_MS,
            max_concurrent_resources: 1,
            usage_gating: UsageGating::Independent,
            event_channel_buffer: 10000,
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment, reading `.env` if present
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        if let Some(v) = env_parse("SENSORWATCH_HISTORY_SIZE") {
            cfg.history_size = v;
        }
        if let Some(v) = env_parse("SENSORWATCH_COLLECTION_INTERVAL_MS") {
            cfg.collection_interval_ms = v;
        }
        if let Some(v) = env_parse("SENSORWATCH_MAX_CONCURRENT_RESOURCES") {
            cfg.max_concurrent_resources = v;
        }
        if let Some(v) = env_parse("SENSORWATCH_USAGE_GATING") {
            cfg.usage_gating = v;
        }
        if let Some(v) = env_parse("SENSORWATCH_EVENT_CHANNEL_BUFFER") {
            cfg.event_channel_buffer = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the relay cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.history_size == 0 {
            return Err(SensorwatchError::Config("history_size must be positive".into()));
        }
        if self.collection_interval_ms == 0 {
            return Err(SensorwatchError::Config(
                "collection_interval_ms must be positive".into(),
            ));
        }
        if self.max_concurrent_resources == 0 {
            return Err(SensorwatchError::Config(
                "max_concurrent_resources must be positive".into(),
            ));
        }
        if self.event_channel_buffer == 0 {
            return Err(SensorwatchError::Config(
                "event_channel_buffer must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Parse an environment variable, keeping the default on a bad value
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring invalid configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = RelayConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.usage_gating, UsageGating::Independent);
        assert_eq!(cfg.max_concurrent_resources, 1);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let cfg = RelayConfig {
            collection_interval_ms: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_usage_gating_parse() {
        assert_eq!(
            "follow-monitoring".parse::<UsageGating>().unwrap(),
            UsageGating::FollowMonitoring
        );
        assert_eq!(
            " Independent ".parse::<UsageGating>().unwrap(),
            UsageGating::Independent
        );
        assert!("sometimes".parse::<UsageGating>().is_err());
    }

    #[test]
    fn test_load_reads_environment() {
        std::env::set_var("SENSORWATCH_HISTORY_SIZE", "12");
        std::env::set_var("SENSORWATCH_USAGE_GATING", "follow-monitoring");
        std::env::set_var("SENSORWATCH_MAX_CONCURRENT_RESOURCES", "not-a-number");

        let cfg = RelayConfig::load().unwrap();
        assert_eq!(cfg.history_size, 12);
        assert_eq!(cfg.usage_gating, UsageGating::FollowMonitoring);
        assert_eq!(cfg.max_concurrent_resources, 1);

        std::env::remove_var("SENSORWATCH_HISTORY_SIZE");
        std::env::remove_var("SENSORWATCH_USAGE_GATING");
        std::env::remove_var("SENSORWATCH_MAX_CONCURRENT_RESOURCES");
    }
}
