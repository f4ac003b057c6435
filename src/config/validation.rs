//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Backend base URL must be an absolute http(s) URL
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Backend timeout must expire before the request deadline
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend.base_url '{0}' is not a valid absolute URL")]
    InvalidBaseUrl(String),

    #[error("backend.base_url scheme '{0}' is not http or https")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than 0")]
    ZeroTimeout(&'static str),

    #[error("backend.timeout_secs ({backend}) must be less than timeouts.request_secs ({request})")]
    BackendTimeoutTooLong { backend: u64, request: u64 },

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("security.max_body_size must be greater than 0")]
    ZeroBodyLimit,
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.backend.base_url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidBaseUrl(config.backend.base_url.clone())),
    }

    if config.backend.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("backend.timeout_secs"));
    }
    if config.backend.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("backend.connect_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if let Some(backend) = config.backend.timeout_secs {
        if backend >= config.timeouts.request_secs {
            errors.push(ValidationError::BackendTimeoutTooLong {
                backend,
                request: config.timeouts.request_secs,
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
