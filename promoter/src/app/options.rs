//! Application configuration options

use std::time::Duration;

use crate::deploy::monitor::MonitorSettings;
use crate::settings::Settings;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Platform API base URL
    pub platform_base_url: String,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Processing monitor settings
    pub monitor: MonitorSettings,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AppOptions {
    /// Build options from a settings file
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            platform_base_url: settings.platform.base_url.clone(),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            monitor: MonitorSettings {
                poll_interval: Duration::from_secs(settings.poll_interval_secs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_settings() {
        let mut settings = Settings::default();
        settings.poll_interval_secs = 7;
        settings.request_timeout_secs = 12;

        let options = AppOptions::from_settings(&settings);
        assert_eq!(options.monitor.poll_interval, Duration::from_secs(7));
        assert_eq!(options.request_timeout, Duration::from_secs(12));
    }
}
