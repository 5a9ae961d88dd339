//! Application configuration loaded from environment variables.

use common::LogFormat;

use crate::feature::service::FEATURE_TOGGLE_TOPIC;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` (default `0.0.0.0`) and `PORT` (default `20000`)
/// - `RUST_LOG` tracing filter, `LOG_FORMAT` (`text` or `json`)
/// - `DATABASE_URL`: Postgres connection; toggles are kept in memory when unset
/// - `KAFKA_BROKERS`: broker list; the in-memory bus is used when unset
/// - `FEATURE_TOGGLE_TOPIC` (default `event.backoffice.feature-toggle`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub kafka_brokers: Option<String>,
    pub feature_toggle_topic: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: LogFormat::from_env(),
            database_url: non_empty_var("DATABASE_URL"),
            kafka_brokers: non_empty_var("KAFKA_BROKERS"),
            feature_toggle_topic: std::env::var("FEATURE_TOGGLE_TOPIC")
                .unwrap_or(defaults.feature_toggle_topic),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 20000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            kafka_brokers: None,
            feature_toggle_topic: FEATURE_TOGGLE_TOPIC.to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
