//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, ports and addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::http::headers::HEAD_TERMINATOR;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.port must be given when no bind_address is set")]
    MissingPort,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("limits.max_request_bytes must be at least {min}, got {got}")]
    RequestLimitTooSmall { min: usize, got: usize },

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match &config.listener.bind_address {
        Some(addr) if addr.parse::<SocketAddr>().is_err() => {
            errors.push(ValidationError::InvalidBindAddress(addr.clone()))
        }
        None if config.listener.port == 0 => errors.push(ValidationError::MissingPort),
        _ => {}
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero {
            field: "listener.max_connections",
        });
    }

    if config.limits.max_request_bytes < HEAD_TERMINATOR.len() {
        errors.push(ValidationError::RequestLimitTooSmall {
            min: HEAD_TERMINATOR.len(),
            got: config.limits.max_request_bytes,
        });
    }
    if config.limits.relay_chunk_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "limits.relay_chunk_bytes",
        });
    }
    if config.limits.response_header_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "limits.response_header_bytes",
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
