//! Configuration loading from the environment.
//!
//! The proxy is configured the way its deployment environment provides
//! settings: `PORT`, `PROXY_API_KEY`, `BASE_URL` and `SMARTVEND_API_KEY`,
//! plus optional tuning knobs. Values are read once at startup into an
//! explicit [`ProxyConfig`] and validated before the listener binds.

use std::env;
use std::str::FromStr;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is absent.
    Missing(&'static str),
    /// An environment variable is present but unparsable.
    Invalid { name: &'static str, value: String },
    /// The assembled config failed semantic validation.
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "missing required environment variable {name}"),
            ConfigError::Invalid { name, value } => {
                write!(f, "invalid value for {name}: {value:?}")
            }
            ConfigError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate the configuration from environment variables.
pub fn from_env() -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::default();

    if let Some(port) = read_parsed::<u16>("PORT")? {
        config.listener.bind_address = format!("0.0.0.0:{port}");
    }

    config.auth.proxy_api_key = require("PROXY_API_KEY")?;
    config.upstream.api_key = require("SMARTVEND_API_KEY")?;
    // A trailing slash would double up when paths are appended.
    config.upstream.base_url = require("BASE_URL")?.trim_end_matches('/').to_string();

    if let Some(enabled) = read_parsed::<bool>("RATE_LIMIT_ENABLED")? {
        config.rate_limit.enabled = enabled;
    }
    if let Some(window_ms) = read_parsed::<u64>("RATE_LIMIT_WINDOW_MS")? {
        config.rate_limit.window_ms = window_ms;
    }
    if let Some(max_requests) = read_parsed::<u64>("RATE_LIMIT_MAX_REQUESTS")? {
        config.rate_limit.max_requests = max_requests;
    }
    if let Some(max_body_size) = read_parsed::<usize>("MAX_BODY_SIZE")? {
        config.security.max_body_size = max_body_size;
    }
    if let Some(request_secs) = read_parsed::<u64>("REQUEST_TIMEOUT_SECS")? {
        config.timeouts.request_secs = Some(request_secs);
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(enabled) = read_parsed::<bool>("METRICS_ENABLED")? {
        config.observability.metrics_enabled = enabled;
    }
    if let Ok(address) = env::var("METRICS_ADDRESS") {
        config.observability.metrics_address = address;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn read_parsed<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(None),
    }
}
