//! Response shaping.
//!
//! # Responsibilities
//! - Turn a `ProxyResponse` into the client response
//! - Turn handler errors into plain-text error responses
//! - Attach the CORS policy everywhere except the diagnostic endpoint
//!
//! # Design Decisions
//! - Upstream headers first, CORS headers last
//! - Hop-by-hop headers stripped automatically

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::ServeError;
use crate::forwarding::ProxyResponse;
use crate::security::headers::{apply_cors_headers, strip_hop_by_hop};

/// Client response for a completed forward.
pub fn proxied_response(proxied: ProxyResponse, origin: Option<&HeaderValue>) -> Response {
    let mut response = Response::new(Body::from(proxied.body));
    *response.status_mut() = proxied.status;
    *response.headers_mut() = strip_hop_by_hop(&proxied.headers);
    apply_cors_headers(response.headers_mut(), origin);
    response
}

/// Plain-text error response with CORS headers.
pub fn error_response(err: ServeError, origin: Option<&HeaderValue>) -> Response {
    let mut response = err.into_response();
    apply_cors_headers(response.headers_mut(), origin);
    response
}

/// `text/plain` response without CORS headers.
pub fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    let mut response = (status, body.into()).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain"),
    );
    response
}

/// Empty 200 answering a CORS preflight.
pub fn preflight_response(origin: Option<&HeaderValue>) -> Response {
    let mut response = StatusCode::OK.into_response();
    apply_cors_headers(response.headers_mut(), origin);
    response
}
