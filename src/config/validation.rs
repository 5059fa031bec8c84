//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Reject blank list entries
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the system

use std::net::SocketAddr;

use crate::config::schema::Settings;

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "must be non-zero"));
    }
    if settings
        .listener
        .socket_address()
        .parse::<SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not an IP address", settings.listener.bind_address),
        ));
    }

    if settings.forwarding.hop_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "forwarding.hop_timeout_secs",
            "must be greater than zero",
        ));
    }

    let lists: [(&'static str, &Vec<String>); 4] = [
        ("access.origin_whitelist", &settings.access.origin_whitelist),
        ("access.origin_blacklist", &settings.access.origin_blacklist),
        ("access.allowed_hosts", &settings.access.allowed_hosts),
        ("forwarding.remove_headers", &settings.forwarding.remove_headers),
    ];
    for (field, items) in lists {
        if items.iter().any(|item| item.trim().is_empty()) {
            errors.push(ValidationError::new(field, "contains an empty entry"));
        }
    }

    if settings.observability.metrics_enabled
        && settings
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                settings.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
