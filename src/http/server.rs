//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, preflight)
//! - Bind server to listener
//! - Run access control, then hand proxied requests to the forwarding engine
//! - Log one line per request and record metrics

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::error::{CorsProxyError, ServeError};
use crate::forwarding::{extract_target, Forwarder, InboundRequest, ProxyConfig, ProxyResponse};
use crate::http::help::{help_text, DIAGNOSTIC_BODY};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::{error_response, plain_text, preflight_response, proxied_response};
use crate::observability::{logging::log_request, metrics};
use crate::security::access_control::{check_origin, check_required_header};
use crate::security::headers::apply_cors_headers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
    pub require_header: bool,
    pub help_text: Arc<str>,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self, CorsProxyError> {
        Ok(Self {
            forwarder: Forwarder::new(ProxyConfig::from_settings(settings))?,
            require_header: settings.access.require_header,
            help_text: Arc::from(help_text(settings)),
        })
    }
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given settings.
    pub fn new(settings: &Settings) -> Result<Self, CorsProxyError> {
        let state = AppState::from_settings(settings)?;
        Ok(Self {
            router: build_router(state),
        })
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(help_handler))
        .route("/iscorsneeded", any(diagnostic_handler))
        .route("/{*target}", any(proxy_handler))
        .with_state(state)
        .layer(middleware::from_fn(preflight_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id(request.headers()),
                        )
                    }),
                )
                .layer(propagate_request_id_layer()),
        )
}

fn origin_of(request: &Request<Body>) -> Option<HeaderValue> {
    request.headers().get(header::ORIGIN).cloned()
}

/// Text of a present `Origin` header. Bytes that are not valid UTF-8 are
/// replaced, so an unreadable origin is still checked and never matches.
fn origin_str(origin: Option<&HeaderValue>) -> Option<Cow<'_, str>> {
    origin.map(|o| String::from_utf8_lossy(o.as_bytes()))
}

/// `/` and `/iscorsneeded` are only served for the exact path; with a
/// query string the request is proxied like any other target.
fn has_query(request: &Request<Body>) -> bool {
    request.uri().query().is_some()
}

/// Answer `OPTIONS` on any path before routing.
async fn preflight_middleware(request: Request<Body>, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let start = Instant::now();
    let origin = origin_of(&request);
    let response = preflight_response(origin.as_ref());
    log_request(
        &Method::OPTIONS,
        request.uri().path(),
        response.status(),
        origin_str(origin.as_ref()).as_deref(),
        start.elapsed(),
    );
    metrics::record_request(Method::OPTIONS.as_str(), response.status().as_u16(), start);
    response
}

async fn help_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    if has_query(&request) {
        return proxy_handler(State(state), request).await;
    }

    let start = Instant::now();
    let origin = origin_of(&request);

    let mut response = plain_text(StatusCode::OK, state.help_text.as_ref());
    apply_cors_headers(response.headers_mut(), origin.as_ref());

    log_request(
        request.method(),
        "/",
        response.status(),
        origin_str(origin.as_ref()).as_deref(),
        start.elapsed(),
    );
    metrics::record_request(request.method().as_str(), response.status().as_u16(), start);
    response
}

async fn diagnostic_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    if has_query(&request) {
        return proxy_handler(State(state), request).await;
    }

    let start = Instant::now();
    let origin = origin_of(&request);

    let response = plain_text(StatusCode::OK, DIAGNOSTIC_BODY);

    log_request(
        request.method(),
        "/iscorsneeded",
        response.status(),
        origin_str(origin.as_ref()).as_deref(),
        start.elapsed(),
    );
    metrics::record_request(request.method().as_str(), response.status().as_u16(), start);
    response
}

/// Main proxy handler.
/// Validates the caller, forwards the request, and shapes the response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let origin = origin_of(&request);

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let target = extract_target(&path_and_query);
    let log_target = target.clone().unwrap_or_else(|| path_and_query.clone());

    tracing::debug!(
        method = %method,
        target_url = %log_target,
        "Proxying request"
    );

    let response = match proxy(&state, target, origin.as_ref(), request).await {
        Ok(proxied) => proxied_response(proxied, origin.as_ref()),
        Err(e) => error_response(e, origin.as_ref()),
    };

    log_request(
        &method,
        &log_target,
        response.status(),
        origin_str(origin.as_ref()).as_deref(),
        start.elapsed(),
    );
    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

async fn proxy(
    state: &AppState,
    target: Option<String>,
    origin: Option<&HeaderValue>,
    request: Request<Body>,
) -> Result<ProxyResponse, ServeError> {
    let config = state.forwarder.config();
    check_origin(
        origin_str(origin).as_deref(),
        &config.origin_whitelist,
        &config.origin_blacklist,
    )?;

    if state.require_header {
        check_required_header(request.headers())?;
    }

    let target = target.ok_or_else(|| {
        CorsProxyError::bad_request("Please specify a URL to proxy. Example: /<url>")
    })?;

    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ServeError::Internal(format!("failed to read request body: {}", e)))?;

    let inbound = InboundRequest::new(parts.method, parts.headers, body);
    let proxied = state.forwarder.forward(&target, &inbound).await?;
    Ok(proxied)
}
