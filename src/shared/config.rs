use std::fs;
use std::path::Path;

use crate::shared::errors::AppError;
use crate::shared::types::WatchConfig;

pub const DEFAULT_CONFIG_PATH: &str = "RefundWatch.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate the configuration from a TOML file
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WatchConfig, AppError> {
        let config_content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::parse(&config_content)
    }

    pub fn parse(content: &str) -> Result<WatchConfig, AppError> {
        let config: WatchConfig = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &WatchConfig) -> Result<(), AppError> {
        if config.api.endpoint.trim().is_empty() {
            return Err(AppError::ConfigError("api.endpoint must be set".into()));
        }
        if config.route.start_node_name.trim().is_empty()
            || config.route.arrival_node_name.trim().is_empty()
        {
            return Err(AppError::ConfigError(
                "route.start_node_name and route.arrival_node_name must be set".into(),
            ));
        }
        if config.monitor.interval_secs == 0 {
            return Err(AppError::ConfigError("monitor.interval_secs must be positive".into()));
        }
        if config.monitor.alert_threshold == 0 {
            return Err(AppError::ConfigError("monitor.alert_threshold must be at least 1".into()));
        }
        if config.email.enabled
            && (config.email.sender_email.is_empty() || config.email.receiver_email.is_empty())
        {
            return Err(AppError::ConfigError(
                "email.sender_email and email.receiver_email are required when email is enabled".into(),
            ));
        }
        Ok(())
    }
}
