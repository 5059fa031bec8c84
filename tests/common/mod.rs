//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral local port.
pub async fn start_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    addr
}

/// A local address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Upstream exposing the behaviours the proxy has to cope with.
///
/// - `/start`  301 → `/next`
/// - `/next`   200 `final body`
/// - `/found`  302 → `/next` with body `found body`
/// - `/loop`   302 → `/loop`, forever
/// - `/echo`   request body back; method, host and header names in `x-echo-*`
/// - `/slow`   200 after two seconds
/// - `/status/{code}` empty response with that status
pub fn upstream_router() -> Router {
    Router::new()
        .route(
            "/start",
            get(|| async {
                (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/next")], "moved")
            }),
        )
        .route("/next", get(|| async { "final body" }))
        .route(
            "/found",
            any(|| async { (StatusCode::FOUND, [(header::LOCATION, "/next")], "found body") }),
        )
        .route(
            "/loop",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/loop")], "") }),
        )
        .route("/echo", any(echo))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "slow"
            }),
        )
        .route("/status/{code}", get(status))
}

/// Upstream whose `/cross` redirects to `/echo` on `target`.
pub fn cross_host_router(target: SocketAddr) -> Router {
    let location = format!("http://{}/echo", target);
    Router::new().route(
        "/cross",
        get(move || {
            let location = location.clone();
            async move { (StatusCode::FOUND, [(header::LOCATION, location)], "") }
        }),
    )
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let names: Vec<&str> = headers.keys().map(|k| k.as_str()).collect();
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    (
        [
            ("x-echo-method", method.to_string()),
            ("x-echo-host", host),
            ("x-echo-headers", names.join(",")),
        ],
        body,
    )
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Header names the echo endpoint saw, from its `x-echo-headers`.
pub fn echoed_header_names(headers: &HeaderMap) -> Vec<String> {
    headers
        .get("x-echo-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
