//! Error types surfaced to the HTTP boundary.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// A terminal proxy failure carrying the message shown to the client.
///
/// The message is the only detail that ever leaves the process; anything
/// more sensitive belongs in the server-side log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CorsProxyError {
    message: String,
    status: StatusCode,
}

impl CorsProxyError {
    /// Create an error with the default 500 status.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::BAD_REQUEST)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::FORBIDDEN)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::BAD_GATEWAY)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::GATEWAY_TIMEOUT)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Anything a handler can fail with.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Proxy(#[from] CorsProxyError),

    /// Unanticipated failure. The detail is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServeError::Proxy(e) => (e.status, e.message),
            ServeError::Internal(detail) => {
                tracing::error!(error = %detail, "Unexpected error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let mut response = (status, body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        response
    }
}
