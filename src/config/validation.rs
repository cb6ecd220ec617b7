//! Configuration validation.
//!
//! Serde handles syntax; this module checks the values make sense. Returns
//! all validation errors, not just the first.

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}': not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("poll_interval_secs must not exceed drain_timeout_secs")]
    PollExceedsTimeout,

    #[error("{field} must not be empty")]
    EmptyMessage { field: &'static str },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.broadcast.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "broadcast.interval_secs",
        });
    }
    if config.shutdown.drain_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "shutdown.drain_timeout_secs",
        });
    }
    if config.shutdown.poll_interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "shutdown.poll_interval_secs",
        });
    } else if config.shutdown.poll_interval_secs > config.shutdown.drain_timeout_secs {
        errors.push(ValidationError::PollExceedsTimeout);
    }

    if config.broadcast.message.is_empty() {
        errors.push(ValidationError::EmptyMessage {
            field: "broadcast.message",
        });
    }
    if config.shutdown.drain_message.is_empty() {
        errors.push(ValidationError::EmptyMessage {
            field: "shutdown.drain_message",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
