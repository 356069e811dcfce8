//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that would make the
//! pipeline misbehave at runtime. All errors are collected, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::TelemetryConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must not be empty when the sink is enabled")]
    MissingCredential(&'static str),

    #[error("{field} must be at least {min}")]
    TooSmall { field: &'static str, min: u64 },

    #[error("{0}: invalid socket address")]
    InvalidAddress(&'static str),
}

/// Validate a parsed configuration, returning every error found.
pub fn validate_config(config: &TelemetryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.metrics.enabled {
        check_sink(
            &mut errors,
            ("metrics.url", &config.metrics.url),
            ("metrics.user_id", &config.metrics.user_id),
            ("metrics.api_key", &config.metrics.api_key),
        );
        if config.metrics.source.is_empty() {
            errors.push(ValidationError::MissingCredential("metrics.source"));
        }
    }
    if config.metrics.interval_secs < 1 {
        errors.push(ValidationError::TooSmall { field: "metrics.interval_secs", min: 1 });
    }

    if config.logging.enabled {
        check_sink(
            &mut errors,
            ("logging.url", &config.logging.url),
            ("logging.user_id", &config.logging.user_id),
            ("logging.api_key", &config.logging.api_key),
        );
    }
    if config.logging.max_field_len < 1 {
        errors.push(ValidationError::TooSmall { field: "logging.max_field_len", min: 1 });
    }

    if config.delivery.max_attempts < 1 {
        errors.push(ValidationError::TooSmall { field: "delivery.max_attempts", min: 1 });
    }
    if config.delivery.attempt_timeout_secs < 1 {
        errors.push(ValidationError::TooSmall { field: "delivery.attempt_timeout_secs", min: 1 });
    }

    if config.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress("server.bind_address"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress("observability.metrics_address"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_sink(
    errors: &mut Vec<ValidationError>,
    url: (&'static str, &str),
    user_id: (&'static str, &str),
    api_key: (&'static str, &str),
) {
    let (field, value) = url;
    match Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidUrl { field, value: value.to_string() }),
    }
    for (field, value) in [user_id, api_key] {
        if value.is_empty() {
            errors.push(ValidationError::MissingCredential(field));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&TelemetryConfig::default()).is_ok());
    }

    #[test]
    fn test_enabled_sink_requires_url_and_credentials() {
        let mut config = TelemetryConfig::default();
        config.logging.enabled = true;
        config.logging.url = "not a url".into();
        config.delivery.max_attempts = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidUrl {
            field: "logging.url",
            value: "not a url".into()
        }));
        assert!(errors.contains(&ValidationError::MissingCredential("logging.user_id")));
        assert!(errors.contains(&ValidationError::MissingCredential("logging.api_key")));
        assert!(errors.contains(&ValidationError::TooSmall { field: "delivery.max_attempts", min: 1 }));
    }
}
