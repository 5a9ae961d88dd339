//! Application configuration loaded from environment variables.

use common::LogFormat;

use crate::platform::Platform;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `MARKETPLACE`: profile to imitate (default `naver`)
/// - `HOST` (default `0.0.0.0`) and `PORT` (default depends on the profile)
/// - `RUST_LOG` tracing filter, `LOG_FORMAT` (`text` or `json`)
#[derive(Debug, Clone)]
pub struct Config {
    pub platform: Platform,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// An unknown `MARKETPLACE` is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self, String> {
        let platform = match std::env::var("MARKETPLACE") {
            Ok(name) if !name.trim().is_empty() => name.parse()?,
            _ => Platform::Naver,
        };
        let defaults = Self::for_platform(platform);
        Ok(Self {
            platform,
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: LogFormat::from_env(),
        })
    }

    /// Defaults for one profile.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            host: "0.0.0.0".to_string(),
            port: platform.default_port(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_platform(Platform::Naver)
    }
}
