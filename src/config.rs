//! Runtime configuration loading and validation.
//!
//! Configuration comes from a TOML file; Telegram credentials come from
//! environment variables and never from the file.

use std::path::Path;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use crate::app::{DEFAULT_CHECK_INTERVAL_SECS, MIN_CHECK_INTERVAL_SECS};
use crate::domain::SubscriptionSpec;
use crate::error::{ConfigError, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Subscriptions seeded into the store at startup.
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionSpec>,
}

/// Poll-loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

fn default_check_interval_secs() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

/// Where availability and price lookups go.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:19998".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorSettings::default(),
            source: SourceSettings::default(),
            logging: LoggingConfig::default(),
            subscriptions: Vec::new(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.monitor.check_interval_secs < MIN_CHECK_INTERVAL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "monitor.check_interval_secs",
                reason: format!("must be at least {MIN_CHECK_INTERVAL_SECS}s"),
            }
            .into());
        }
        if let Err(error) = Url::parse(&self.source.base_url) {
            return Err(ConfigError::InvalidValue {
                field: "source.base_url",
                reason: error.to_string(),
            }
            .into());
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "source.timeout_secs",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        for spec in &self.subscriptions {
            if spec.plan_code.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "subscriptions.plan_code",
                }
                .into());
            }
        }
        Ok(())
    }
}

impl LoggingConfig {
    /// Install the global subscriber; `RUST_LOG` overrides the file level.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}
