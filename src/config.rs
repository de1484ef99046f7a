use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub stream: StreamConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the provider's JSON API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Fixed per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Polling interval in seconds; the next tick is also the retry mechanism
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_base_url() -> String {
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Logical name of the partitioned play-event stream (required)
    #[serde(default)]
    pub name: String,
    /// Provider region hint
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
        }
    }
}

fn default_api_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("upstream.base_url", default_base_url())?
            .set_default("upstream.timeout_secs", default_timeout_secs() as i64)?
            .set_default("upstream.interval_secs", default_interval_secs() as i64)?
            .set_default("stream.name", "")?
            .set_default("stream.region", default_region())?
            .set_default("api.port", default_api_port() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GRIDIRON_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GRIDIRON_STREAM__NAME, etc.)
            .add_source(
                Environment::with_prefix("GRIDIRON")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Create a configuration for one-shot CLI usage and tests
    pub fn default_config(stream_name: &str) -> Self {
        Self {
            upstream: UpstreamConfig {
                base_url: default_base_url(),
                timeout_secs: default_timeout_secs(),
                interval_secs: default_interval_secs(),
            },
            stream: StreamConfig {
                name: stream_name.to_string(),
                region: default_region(),
            },
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // The target stream identity is the only configuration the process
        // cannot start without.
        if self.stream.name.trim().is_empty() {
            errors.push("stream.name must be set (target stream identity)".to_string());
        }

        if self.upstream.timeout_secs == 0 {
            errors.push("upstream.timeout_secs must be positive".to_string());
        }

        if self.upstream.interval_secs == 0 {
            errors.push("upstream.interval_secs must be positive".to_string());
        }

        if self.upstream.base_url.trim().is_empty() {
            errors.push("upstream.base_url must be set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default_config("nfl-play-events");
        assert!(config.validate().is_ok());
        assert_eq!(config.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(config.upstream.interval(), Duration::from_secs(30));
    }

    #[test]
    fn empty_stream_name_is_rejected() {
        let mut config = AppConfig::default_config("nfl-play-events");
        config.stream.name = "  ".to_string();

        let errors = config.validate().expect_err("blank stream name must fail");
        assert!(errors.iter().any(|e| e.contains("stream.name")));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = AppConfig::default_config("nfl-play-events");
        config.upstream.interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
