use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors from the external availability and price collaborators.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("availability lookup for {plan_code} failed: {reason}")]
    Availability { plan_code: String, reason: String },

    #[error("price lookup failed: {0}")]
    Price(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Scheduler lifecycle and runtime-configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("monitor is already running")]
    AlreadyRunning,

    #[error("monitor is not running")]
    NotRunning,

    #[error("check interval {requested}s is below the minimum of {minimum}s")]
    IntervalTooShort { requested: u64, minimum: u64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

pub type Result<T> = std::result::Result<T, Error>;
