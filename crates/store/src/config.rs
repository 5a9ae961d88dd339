//! Application configuration loaded from environment variables.

use std::time::Duration;

use common::LogFormat;
use messaging::RetryPolicy;

use crate::events::EventProcessorConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` (default `0.0.0.0`) and `PORT` (default `8081`)
/// - `RUST_LOG` tracing filter, `LOG_FORMAT` (`text` or `json`)
/// - `DATABASE_URL`: Postgres connection; stores are kept in memory when unset
/// - `KAFKA_BROKERS`: broker list; the in-memory bus is used when unset
/// - `FEATURE_TOGGLE_TOPIC` (default `event.backoffice.feature-toggle`)
/// - `BACKOFFICE_URL`, `NAVER_API_URL`, `KAKAO_API_URL`
/// - `UPSTREAM_TIMEOUT_SECS` (default `10`) for outgoing HTTP calls
/// - `EVENT_WORKERS` (default `2`), `EVENT_QUEUE_CAPACITY` (default `500`)
/// - `TOGGLE_RETRY_ATTEMPTS` (default `3`), `TOGGLE_RETRY_BACKOFF_MS` (default `3000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub kafka_brokers: Option<String>,
    pub feature_toggle_topic: String,
    pub backoffice_url: String,
    pub naver_api_url: String,
    pub kakao_api_url: String,
    pub upstream_timeout_secs: u64,
    pub event_workers: usize,
    pub event_queue_capacity: usize,
    pub toggle_retry_attempts: u32,
    pub toggle_retry_backoff_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parsed_var("PORT").unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: LogFormat::from_env(),
            database_url: non_empty_var("DATABASE_URL"),
            kafka_brokers: non_empty_var("KAFKA_BROKERS"),
            feature_toggle_topic: std::env::var("FEATURE_TOGGLE_TOPIC")
                .unwrap_or(defaults.feature_toggle_topic),
            backoffice_url: std::env::var("BACKOFFICE_URL").unwrap_or(defaults.backoffice_url),
            naver_api_url: std::env::var("NAVER_API_URL").unwrap_or(defaults.naver_api_url),
            kakao_api_url: std::env::var("KAKAO_API_URL").unwrap_or(defaults.kakao_api_url),
            upstream_timeout_secs: parsed_var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout_secs),
            event_workers: parsed_var("EVENT_WORKERS").unwrap_or(defaults.event_workers),
            event_queue_capacity: parsed_var("EVENT_QUEUE_CAPACITY")
                .unwrap_or(defaults.event_queue_capacity),
            toggle_retry_attempts: parsed_var("TOGGLE_RETRY_ATTEMPTS")
                .unwrap_or(defaults.toggle_retry_attempts),
            toggle_retry_backoff_ms: parsed_var("TOGGLE_RETRY_BACKOFF_MS")
                .unwrap_or(defaults.toggle_retry_backoff_ms),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn event_processor(&self) -> EventProcessorConfig {
        EventProcessorConfig {
            workers: self.event_workers,
            queue_capacity: self.event_queue_capacity,
        }
    }

    pub fn toggle_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.toggle_retry_attempts,
            backoff: Duration::from_millis(self.toggle_retry_backoff_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            kafka_brokers: None,
            feature_toggle_topic: "event.backoffice.feature-toggle".to_string(),
            backoffice_url: "http://localhost:20000".to_string(),
            naver_api_url: "http://localhost:10000/naver-api".to_string(),
            kakao_api_url: "http://localhost:8082/kakao-api".to_string(),
            upstream_timeout_secs: 10,
            event_workers: 2,
            event_queue_capacity: 500,
            toggle_retry_attempts: 3,
            toggle_retry_backoff_ms: 3000,
        }
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.port, 8081);
        assert_eq!(config.backoffice_url, "http://localhost:20000");
        assert_eq!(config.naver_api_url, "http://localhost:10000/naver-api");
        assert_eq!(config.kakao_api_url, "http://localhost:8082/kakao-api");
    }

    #[test]
    fn test_event_processor_defaults() {
        assert_eq!(
            Config::default().event_processor(),
            EventProcessorConfig::default()
        );
    }

    #[test]
    fn test_toggle_retry_policy_defaults() {
        assert_eq!(Config::default().toggle_retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:9000");
    }
}
