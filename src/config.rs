use crate::fetch::Category;
use crate::utils::duration::parse_interval_seconds;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Dashboard configuration, mirroring the YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON node list; relative paths are resolved against the config file
    pub nodes: PathBuf,
    /// Credential sent with every status request
    #[serde(default)]
    pub api_key: String,
    /// Polling interval (e.g., "30s", "5m"); zero or negative polls once
    #[serde(default = "default_interval", deserialize_with = "deserialize_interval")]
    pub interval: String,
    /// Upper bound for a single status request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Also poll the privileged wallet seed endpoint
    #[serde(default)]
    pub include_seed: bool,
    /// (Optional) Log filter, e.g. "info" or "fleetwatch=debug"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.nodes.as_os_str().is_empty() {
            return Err(ValidationError::InvalidNodes(
                "nodes path cannot be empty".to_string(),
            ));
        }

        self.interval_secs()?;

        if self.request_timeout.is_zero() {
            return Err(ValidationError::InvalidTimeout(
                "request_timeout must be greater than zero".to_string(),
            ));
        }

        if let Some(level) = &self.log_level {
            if level.trim().is_empty() {
                return Err(ValidationError::InvalidLogLevel(
                    "log_level cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Polling interval in seconds
    pub fn interval_secs(&self) -> Result<i64, ValidationError> {
        parse_interval_seconds(&self.interval).map_err(ValidationError::InvalidInterval)
    }

    /// Categories to poll, in merge order
    pub fn categories(&self) -> Vec<Category> {
        Category::enabled(self.include_seed)
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid nodes configuration: {0}")]
    InvalidNodes(String),
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
    #[error("Invalid request timeout: {0}")]
    InvalidTimeout(String),
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

fn default_interval() -> String {
    "0".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Accept both `interval: 5` and `interval: "5s"`
fn deserialize_interval<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawInterval {
        Seconds(i64),
        Text(String),
    }

    Ok(match RawInterval::deserialize(deserializer)? {
        RawInterval::Seconds(secs) => secs.to_string(),
        RawInterval::Text(text) => text,
    })
}
