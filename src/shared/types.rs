//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Booking service endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    #[serde(default = "ApiConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// The booking service certificate chain is not always valid
    #[serde(default = "ApiConfig::default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    /// Sent verbatim with every request (authorization, user-agent, referer, ...)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ApiConfig {
    fn default_timeout_secs() -> u64 {
        15
    }

    fn default_accept_invalid_certs() -> bool {
        true
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: Self::default_timeout_secs(),
            accept_invalid_certs: Self::default_accept_invalid_certs(),
            headers: BTreeMap::new(),
        }
    }
}

/// Location block embedded in the `_JsonText` query parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub gis: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city_code: String,
    #[serde(default)]
    pub city_name: String,
    #[serde(default)]
    pub township: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub search_start_district: String,
    #[serde(default)]
    pub search_end_district: String,
}

/// The single origin/destination pair being watched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteConfig {
    pub start_node_name: String,
    pub arrival_node_name: String,
    #[serde(default)]
    pub start_node_gis: String,
    #[serde(default)]
    pub arrival_node_gis: String,
    #[serde(default)]
    pub start_city_code: String,
    #[serde(default)]
    pub arrival_city_code: String,
    #[serde(default)]
    pub start_node_district_name: String,
    #[serde(default)]
    pub arrival_node_district_name: String,
    #[serde(default)]
    pub location: LocationConfig,
}

impl RouteConfig {
    pub fn describe(&self) -> String {
        format!("{} -> {}", self.start_node_name, self.arrival_node_name)
    }
}

/// Polling defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorDefaults {
    #[serde(default = "MonitorDefaults::default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "MonitorDefaults::default_alert_threshold")]
    pub alert_threshold: u32,
}

impl MonitorDefaults {
    fn default_interval_secs() -> u64 {
        30
    }

    fn default_alert_threshold() -> u32 {
        1
    }
}

impl Default for MonitorDefaults {
    fn default() -> Self {
        Self {
            interval_secs: Self::default_interval_secs(),
            alert_threshold: Self::default_alert_threshold(),
        }
    }
}

/// SMTP submission settings for refund alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "EmailConfig::default_smtp_server")]
    pub smtp_server: String,
    /// Implicit TLS port
    #[serde(default = "EmailConfig::default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default = "EmailConfig::default_sender_name")]
    pub sender_name: String,
    /// Mailbox authorization code, not the account password
    #[serde(default)]
    pub authorization_code: String,
    #[serde(default)]
    pub receiver_email: String,
    #[serde(default = "EmailConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EmailConfig {
    fn default_smtp_server() -> String {
        "smtp.qq.com".to_string()
    }

    fn default_smtp_port() -> u16 {
        465
    }

    fn default_sender_name() -> String {
        "Refund Ticket Watch".to_string()
    }

    fn default_timeout_secs() -> u64 {
        30
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: Self::default_smtp_server(),
            smtp_port: Self::default_smtp_port(),
            sender_email: String::new(),
            sender_name: Self::default_sender_name(),
            authorization_code: String::new(),
            receiver_email: String::new(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Watcher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub route: RouteConfig,
    #[serde(default)]
    pub monitor: MonitorDefaults,
    #[serde(default)]
    pub email: EmailConfig,
}
