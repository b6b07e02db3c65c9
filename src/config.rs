use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, time::Duration};

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreConfig {
    #[serde(default)]
    pub observer_failure: ObserverFailurePolicy,

    /// Fan-outs slower than this are logged. Delivery is never cut short.
    #[serde(default = "default_slow_dispatch_threshold", with = "duration_ms")]
    pub slow_dispatch_threshold: Duration,
}

/// What the dispatcher does when an observer returns an error mid fan-out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ObserverFailurePolicy {
    /// Stop at the first failure and return it. Observers later in the
    /// snapshot are not invoked.
    #[default]
    Abort,
    /// Invoke every observer in the snapshot, then report all failures.
    Continue,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            observer_failure: ObserverFailurePolicy::default(),
            slow_dispatch_threshold: default_slow_dispatch_threshold(),
        }
    }
}

impl CoreConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        from_file(path)
    }

    pub fn from_str(s: &str) -> CoreResult<Self> {
        from_str(s)
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> CoreResult<T> {
    let file = File::open(path)
        .map_err(|e| CoreError::config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| CoreError::config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> CoreResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| CoreError::config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_slow_dispatch_threshold() -> Duration {
    Duration::from_millis(250)
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.observer_failure, ObserverFailurePolicy::Abort);
        assert_eq!(config.slow_dispatch_threshold, Duration::from_millis(250));
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = CoreConfig::from_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "observer_failure": "continue",
            "slow_dispatch_threshold": 1500
        }"#;
        let config = CoreConfig::from_str(json).unwrap();
        assert_eq!(config.observer_failure, ObserverFailurePolicy::Continue);
        assert_eq!(config.slow_dispatch_threshold, Duration::from_millis(1500));
    }

    #[test]
    fn test_serialize_round_trips_threshold_as_millis() {
        let config = CoreConfig {
            observer_failure: ObserverFailurePolicy::Continue,
            slow_dispatch_threshold: Duration::from_secs(2),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["slow_dispatch_threshold"], 2000);
        assert_eq!(json["observer_failure"], "continue");
    }

    #[test]
    fn test_invalid_config() {
        let err = CoreConfig::from_str(r#"{"observer_failure": "retry"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!(
            "multicore_mvc_config_{}.json",
            std::process::id()
        ));
        {
            let mut file = File::create(&path).unwrap();
            write!(file, r#"{{"slow_dispatch_threshold": 10}}"#).unwrap();
        }
        let config = CoreConfig::from_file(&path).unwrap();
        assert_eq!(config.slow_dispatch_threshold, Duration::from_millis(10));
        std::fs::remove_file(&path).unwrap();

        assert!(CoreConfig::from_file(&path).is_err());
    }
}
