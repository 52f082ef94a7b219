//! Application configuration management.
//!
//! Layering, lowest precedence first: `config/default.toml`,
//! `config/{RUN_MODE}.toml`, then `BUBBLEBANK__SECTION__KEY` environment
//! variables.

use std::time::Duration;

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

use crate::types::OverdraftPolicy;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger store behaviour.
    #[serde(default)]
    pub store: StoreConfig,
    /// Retry policy for serialization and connectivity failures.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Logging configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when opening a new connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Log every statement sqlx executes.
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

impl DatabaseConfig {
    /// Connection timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Pool acquire timeout as a [`Duration`].
    #[must_use]
    pub const fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Ledger store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Upper bound for one executor transaction, commit included.
    #[serde(default = "default_transaction_timeout_ms")]
    pub transaction_timeout_ms: u64,
    /// Whether transfers may overdraw the source account.
    #[serde(default)]
    pub overdraft: OverdraftPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            transaction_timeout_ms: default_transaction_timeout_ms(),
            overdraft: OverdraftPolicy::default(),
        }
    }
}

fn default_transaction_timeout_ms() -> u64 {
    5000
}

impl StoreConfig {
    /// Transaction timeout as a [`Duration`].
    #[must_use]
    pub const fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Cap on any single delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    10
}

fn default_max_delay_ms() -> u64 {
    500
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Deployment environment name.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_service_name() -> String {
    "bubblebank".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BUBBLEBANK").separator("__"));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> Result<AppConfig, config::ConfigError> {
        AppConfig::from_builder(
            config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse(
            r#"
            [database]
            url = "postgres://localhost/bubblebank"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.store.transaction_timeout(), Duration::from_secs(5));
        assert_eq!(config.store.overdraft, OverdraftPolicy::Reject);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 10);
        assert_eq!(config.retry.max_delay_ms, 500);
        assert_eq!(config.telemetry.service_name, "bubblebank");
        assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config = parse(
            r#"
            [server]
            port = 9090

            [database]
            url = "postgres://db/bank"
            sqlx_logging = true

            [store]
            transaction_timeout_ms = 250
            overdraft = "allow"

            [retry]
            max_attempts = 2

            [telemetry]
            log_format = "json"
            environment = "production"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert!(config.database.sqlx_logging);
        assert_eq!(
            config.store.transaction_timeout(),
            Duration::from_millis(250)
        );
        assert_eq!(config.store.overdraft, OverdraftPolicy::Allow);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(config.telemetry.environment, "production");
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(parse("[server]\nport = 1").is_err());
    }
}
