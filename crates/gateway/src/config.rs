//! Application configuration loaded from environment variables.

use std::time::Duration;

use common::LogFormat;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` (default `0.0.0.0`) and `PORT` (default `8080`)
/// - `RUST_LOG` tracing filter, `LOG_FORMAT` (`text` or `json`)
/// - `BACKEND_URL`: where `/app` traffic goes (default `http://localhost:8081`)
/// - `AUTH_URL`: token validation service (default `http://localhost:12000/auth`)
/// - `UPSTREAM_TIMEOUT_SECS` (default `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub backend_url: String,
    pub auth_url: String,
    pub upstream_timeout_secs: u64,
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
            backend_url: std::env::var("BACKEND_URL").unwrap_or(defaults.backend_url),
            auth_url: std::env::var("AUTH_URL").unwrap_or(defaults.auth_url),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.upstream_timeout_secs),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            backend_url: "http://localhost:8081".to_string(),
            auth_url: "http://localhost:12000/auth".to_string(),
            upstream_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend_url, "http://localhost:8081");
        assert_eq!(config.auth_url, "http://localhost:12000/auth");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
