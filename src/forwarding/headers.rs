//! Outbound header projection.
//!
//! The upstream sees the client's headers minus the configured removals,
//! with `host` rewritten for the hop's target and `connection` dropped.

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

use crate::error::CorsProxyError;
use crate::forwarding::types::ProxyConfig;

/// `host[:port]` of `url`, omitting the scheme's default port.
pub fn host_header(url: &Url) -> Result<HeaderValue, CorsProxyError> {
    let host = url
        .host_str()
        .ok_or_else(|| CorsProxyError::bad_request("Invalid target URL"))?;
    let value = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    HeaderValue::from_str(&value).map_err(|_| CorsProxyError::bad_request("Invalid target URL"))
}

/// Build the header set for one hop to `target`.
pub fn project_headers(
    inbound: &HeaderMap,
    config: &ProxyConfig,
    target: &Url,
) -> Result<HeaderMap, CorsProxyError> {
    let mut outbound = HeaderMap::with_capacity(inbound.len() + 1);

    for (name, value) in inbound.iter() {
        if name == header::HOST
            || name == header::CONNECTION
            || value.is_empty()
            || config.should_remove(name.as_str())
        {
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }

    outbound.insert(header::HOST, host_header(target)?);
    Ok(outbound)
}
