//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the bind address and upstream URL actually parse
//! - Require both credentials to be present
//! - Validate rate-limit value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before the listener binds, so startup fails fast

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single configuration problem, tied to the field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {:?}", config.listener.bind_address),
        });
    }

    if config.auth.proxy_api_key.is_empty() {
        errors.push(ValidationError {
            field: "auth.proxy_api_key",
            message: "inbound credential must not be empty (set PROXY_API_KEY)".to_string(),
        });
    }

    if config.upstream.api_key.is_empty() {
        errors.push(ValidationError {
            field: "upstream.api_key",
            message: "upstream credential must not be empty (set SMARTVEND_API_KEY)".to_string(),
        });
    }

    if config.upstream.base_url.is_empty() {
        errors.push(ValidationError {
            field: "upstream.base_url",
            message: "upstream base URL must not be empty (set BASE_URL)".to_string(),
        });
    } else {
        match Url::parse(&config.upstream.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError {
                field: "upstream.base_url",
                message: format!("unsupported scheme {:?}", url.scheme()),
            }),
            Err(err) => errors.push(ValidationError {
                field: "upstream.base_url",
                message: format!("not a valid URL: {err}"),
            }),
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_ms == 0 {
            errors.push(ValidationError {
                field: "rate_limit.window_ms",
                message: "window must be longer than zero".to_string(),
            });
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError {
                field: "rate_limit.max_requests",
                message: "threshold must be greater than zero".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.auth.proxy_api_key = "inbound".into();
        config.upstream.base_url = "https://api.example.com/v1".into();
        config.upstream.api_key = "upstream".into();
        config
    }

    #[test]
    fn accepts_a_complete_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn empty_config_reports_every_missing_field() {
        let errors = validate_config(&ProxyConfig::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"auth.proxy_api_key"));
        assert!(fields.contains(&"upstream.api_key"));
        assert!(fields.contains(&"upstream.base_url"));
    }

    #[test]
    fn rejects_non_http_upstream() {
        let mut config = valid_config();
        config.upstream.base_url = "ftp://example.com".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "upstream.base_url");
    }

    #[test]
    fn rejects_zero_width_rate_window() {
        let mut config = valid_config();
        config.rate_limit.window_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "rate_limit.window_ms");
    }

    #[test]
    fn disabled_limiter_skips_range_checks() {
        let mut config = valid_config();
        config.rate_limit.enabled = false;
        config.rate_limit.window_ms = 0;
        config.rate_limit.max_requests = 0;
        assert!(validate_config(&config).is_ok());
    }
}
