//! Forwarding engine against live mock upstreams.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use cors_bypass_proxy::forwarding::{Forwarder, InboundRequest, ProxyConfig};

mod common;

fn get_request() -> InboundRequest {
    InboundRequest::new(Method::GET, HeaderMap::new(), Bytes::new())
}

#[tokio::test]
async fn test_redirect_followed() {
    let addr = common::start_upstream(common::upstream_router()).await;
    let forwarder = Forwarder::new(ProxyConfig::default()).unwrap();

    let target = format!("http://{}/start", addr);
    let response = forwarder.forward(&target, &get_request()).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"final body");

    let first = format!("http://{}/start", addr);
    assert_eq!(response.redirect_chain.len(), 1);
    assert_eq!(response.redirect_chain[0].as_str(), first);
    assert_eq!(response.headers["x-cors-redirect-1"], first.as_str());
    assert!(response.headers.get("x-cors-redirect-2").is_none());
    assert_eq!(response.headers["x-request-url"], target.as_str());
    assert_eq!(
        response.headers["x-final-url"],
        format!("http://{}/next", addr).as_str()
    );
}

#[tokio::test]
async fn test_zero_budget_returns_redirect_verbatim() {
    let addr = common::start_upstream(common::upstream_router()).await;
    let forwarder = Forwarder::new(ProxyConfig {
        max_redirects: 0,
        ..Default::default()
    })
    .unwrap();

    let response = forwarder
        .forward(&format!("http://{}/found", addr), &get_request())
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.headers[header::LOCATION], "/next");
    assert_eq!(&response.body[..], b"found body");
    assert!(response.redirect_chain.is_empty());
    assert!(response.headers.get("x-cors-redirect-1").is_none());
}

#[tokio::test]
async fn test_redirect_loop_stops_at_budget() {
    let addr = common::start_upstream(common::upstream_router()).await;
    let forwarder = Forwarder::new(ProxyConfig {
        max_redirects: 3,
        ..Default::default()
    })
    .unwrap();

    let response = forwarder
        .forward(&format!("http://{}/loop", addr), &get_request())
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.redirect_chain.len(), 3);
    assert!(response.headers.get("x-cors-redirect-3").is_some());
    assert!(response.headers.get("x-cors-redirect-4").is_none());
}

#[tokio::test]
async fn test_cookie_never_reaches_upstream() {
    let addr = common::start_upstream(common::upstream_router()).await;
    let forwarder = Forwarder::new(ProxyConfig::default()).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("session=secret"));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer token"));
    headers.insert(header::HOST, HeaderValue::from_static("proxy.local"));
    headers.insert("x-custom", HeaderValue::from_static("kept"));
    let inbound = InboundRequest::new(Method::GET, headers, Bytes::new());

    let response = forwarder
        .forward(&format!("http://{}/echo", addr), &inbound)
        .await
        .unwrap();

    let seen = common::echoed_header_names(&response.headers);
    assert!(!seen.iter().any(|h| h == "cookie"), "cookie leaked: {:?}", seen);
    assert!(seen.iter().any(|h| h == "authorization"));
    assert!(seen.iter().any(|h| h == "x-custom"));
    assert_eq!(response.headers["x-echo-host"], addr.to_string().as_str());
}

#[tokio::test]
async fn test_method_and_body_forwarded() {
    let addr = common::start_upstream(common::upstream_router()).await;
    let forwarder = Forwarder::new(ProxyConfig::default()).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    let inbound = InboundRequest::new(Method::POST, headers, Bytes::from_static(b"payload"));

    let response = forwarder
        .forward(&format!("http://{}/echo", addr), &inbound)
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-echo-method"], "POST");
    assert_eq!(&response.body[..], b"payload");
}

#[tokio::test]
async fn test_schemeless_target_uses_http() {
    let addr = common::start_upstream(common::upstream_router()).await;
    let forwarder = Forwarder::new(ProxyConfig::default()).unwrap();

    let response = forwarder
        .forward(&format!("{}/next", addr), &get_request())
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers["x-final-url"],
        format!("http://{}/next", addr).as_str()
    );
}

#[tokio::test]
async fn test_cross_host_redirect_rebuilds_host_header() {
    let echo_addr = common::start_upstream(common::upstream_router()).await;
    let entry_addr = common::start_upstream(common::cross_host_router(echo_addr)).await;
    let forwarder = Forwarder::new(ProxyConfig::default()).unwrap();

    let response = forwarder
        .forward(&format!("http://{}/cross", entry_addr), &get_request())
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-echo-host"], echo_addr.to_string().as_str());
    assert_eq!(
        response.headers["x-cors-redirect-1"],
        format!("http://{}/cross", entry_addr).as_str()
    );
}

#[tokio::test]
async fn test_upstream_error_status_passed_through() {
    let addr = common::start_upstream(common::upstream_router()).await;
    let forwarder = Forwarder::new(ProxyConfig::default()).unwrap();

    let response = forwarder
        .forward(&format!("http://{}/status/404", addr), &get_request())
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.redirect_chain.is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_502() {
    let addr = common::closed_port().await;
    let forwarder = Forwarder::new(ProxyConfig::default()).unwrap();

    let err = forwarder
        .forward(&format!("http://{}/", addr), &get_request())
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    assert!(err.message().starts_with("Failed to proxy request"));
}

#[tokio::test]
async fn test_https_target_uses_tls_transport() {
    let addr = common::closed_port().await;
    let forwarder = Forwarder::new(ProxyConfig::default()).unwrap();

    let err = forwarder
        .forward(&format!("https://{}/", addr), &get_request())
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    assert!(err.message().starts_with("Failed to proxy request"));
}

#[tokio::test]
async fn test_slow_hop_is_504() {
    let addr = common::start_upstream(common::upstream_router()).await;
    let forwarder = Forwarder::new(ProxyConfig {
        hop_timeout: Duration::from_millis(200),
        ..Default::default()
    })
    .unwrap();

    let err = forwarder
        .forward(&format!("http://{}/slow", addr), &get_request())
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(err.message(), "Request timeout");
}

#[tokio::test]
async fn test_host_allowlist_checked_before_dispatch() {
    let forwarder = Forwarder::new(ProxyConfig {
        allowed_hosts: Some(vec!["api.example.com".into()]),
        ..Default::default()
    })
    .unwrap();

    let err = forwarder
        .forward("http://evil.com/x", &get_request())
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        err.message(),
        "The request host \"evil.com\" isn't allowed by the operator for proxy"
    );
}
