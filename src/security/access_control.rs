//! Access control checks.
//!
//! Pure predicates over the request origin, the presence of identifying
//! headers, and the target host. Nothing here performs I/O.

use axum::http::HeaderMap;
use url::Url;

use crate::error::CorsProxyError;

/// Decide whether a browser-presented origin may use the proxy.
///
/// A missing (or empty) origin is always allowed; the lists only constrain
/// browsers. The blacklist is checked first and wins over the whitelist.
pub fn validate_origin(origin: Option<&str>, whitelist: &[String], blacklist: &[String]) -> bool {
    let origin = match origin {
        Some(o) if !o.is_empty() => o,
        _ => return true,
    };

    if !blacklist.is_empty() && blacklist.iter().any(|b| b == origin) {
        return false;
    }

    if !whitelist.is_empty() && !whitelist.iter().any(|w| w == origin) {
        return false;
    }

    true
}

/// [`validate_origin`] with the rejection turned into a 403.
pub fn check_origin(
    origin: Option<&str>,
    whitelist: &[String],
    blacklist: &[String],
) -> Result<(), CorsProxyError> {
    if validate_origin(origin, whitelist, blacklist) {
        Ok(())
    } else {
        Err(CorsProxyError::forbidden(format!(
            "Origin \"{}\" is not allowed to use this proxy service",
            origin.unwrap_or_default()
        )))
    }
}

/// Reject requests that carry neither `Origin` nor `X-Requested-With`.
///
/// Keeps people from browsing the proxy as a regular URL in a tab.
pub fn check_required_header(headers: &HeaderMap) -> Result<(), CorsProxyError> {
    let present = |name: &str| {
        headers
            .get(name)
            .map(|v| !v.as_bytes().is_empty())
            .unwrap_or(false)
    };

    if present("origin") || present("x-requested-with") {
        Ok(())
    } else {
        Err(CorsProxyError::bad_request(
            "Missing required header. Please set Origin or X-Requested-With header.",
        ))
    }
}

/// Enforce the host allowlist against a resolved target.
///
/// `None` or an empty list means any host may be targeted.
pub fn check_allowed_host(
    url: &Url,
    allowed_hosts: Option<&[String]>,
) -> Result<(), CorsProxyError> {
    let allowed = match allowed_hosts {
        Some(hosts) if !hosts.is_empty() => hosts,
        _ => return Ok(()),
    };

    let host = url.host_str().unwrap_or_default();
    if allowed.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        Ok(())
    } else {
        tracing::warn!(host = %host, "Target host rejected by allowlist");
        Err(CorsProxyError::forbidden(format!(
            "The request host \"{}\" isn't allowed by the operator for proxy",
            host
        )))
    }
}
