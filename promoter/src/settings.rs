//! Settings file management

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::PromoterError;
use crate::logs::LogLevel;

/// Agent settings, read from an optional JSON file. Every field has a
/// default so a missing or partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,

    /// Platform API configuration
    #[serde(default)]
    pub platform: PlatformSettings,

    /// Delay between processing status checks, in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-request HTTP timeout, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    20
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            platform: PlatformSettings::default(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn load(path: &Path) -> Result<Self, PromoterError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            PromoterError::ConfigError(format!(
                "unable to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    /// Validated platform base URL
    pub fn platform_base_url(&self) -> Result<Url, PromoterError> {
        Url::parse(&self.platform.base_url).map_err(|e| {
            PromoterError::ConfigError(format!(
                "invalid platform base URL '{}': {}",
                self.platform.base_url, e
            ))
        })
    }
}

/// Platform API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Base URL for the platform API
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.poll_interval_secs, 20);
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.log_level, LogLevel::Info);
        assert!(!settings.json_logs);
    }

    #[test]
    fn test_partial_override() {
        let settings: Settings = serde_json::from_str(
            r#"{"poll_interval_secs": 5, "platform": {"base_url": "https://platform.example/api"}}"#,
        )
        .unwrap();
        assert_eq!(settings.poll_interval_secs, 5);
        assert_eq!(settings.platform.base_url, "https://platform.example/api");
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let settings = Settings {
            platform: PlatformSettings {
                base_url: "not a url".to_string(),
            },
            ..Default::default()
        };
        assert!(settings.platform_base_url().is_err());
    }
}
