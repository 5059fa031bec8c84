//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Emit the one-line-per-request access log
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON or pretty output, chosen by configuration
//! - `RUST_LOG` overrides the configured level

use std::time::Duration;

use axum::http::{Method, StatusCode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cors_bypass_proxy={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Access log line for a completed or failed request.
pub fn log_request(
    method: &Method,
    target: &str,
    status: StatusCode,
    origin: Option<&str>,
    elapsed: Duration,
) {
    let origin = origin.filter(|o| !o.is_empty()).unwrap_or("no-origin");
    let elapsed_ms = elapsed.as_millis() as u64;

    if status.is_server_error() {
        tracing::warn!(
            %method,
            target_url = %target,
            status = status.as_u16(),
            %origin,
            elapsed_ms,
            "Request failed"
        );
    } else {
        tracing::info!(
            %method,
            target_url = %target,
            status = status.as_u16(),
            %origin,
            elapsed_ms,
            "Request completed"
        );
    }
}
