//! Response header shaping.
//!
//! # Responsibilities
//! - Attach the public CORS policy to proxy responses
//! - Strip hop-by-hop headers before copying an upstream response
//!
//! # Design Decisions
//! - The proxy's CORS headers are written last and overwrite anything the
//!   upstream sent, so the policy is the same for every target
//! - Credentials are never allowed; the origin is echoed only for clarity

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS, HEAD";
pub const ALLOW_HEADERS: &str =
    "Origin, X-Requested-With, Content-Type, Accept, Authorization, Range";
pub const EXPOSE_HEADERS: &str = "Content-Length, Content-Range, X-Request-URL, X-Final-URL";
pub const MAX_AGE_SECS: &str = "86400";

/// Prefix of the per-hop redirect annotations.
pub const REDIRECT_HEADER_PREFIX: &str = "x-cors-redirect-";

/// Headers meaningful only for a single connection.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| name.as_str().eq_ignore_ascii_case(h))
}

/// Copy `source` into a new map, skipping hop-by-hop headers.
/// Multi-valued headers keep every value.
pub fn strip_hop_by_hop(source: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(source.len());
    for (name, value) in source.iter() {
        if !is_hop_by_hop(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

/// Write the CORS policy onto `headers`.
///
/// `origin` is echoed back when present, otherwise `*`. Any redirect
/// annotations already in `headers` are added to the exposed list.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: Option<&HeaderValue>) {
    let allow_origin = origin
        .filter(|o| !o.as_bytes().is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("false"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECS),
    );

    let mut redirects: Vec<&str> = headers
        .keys()
        .map(HeaderName::as_str)
        .filter(|name| name.starts_with(REDIRECT_HEADER_PREFIX))
        .collect();
    let expose = if redirects.is_empty() {
        HeaderValue::from_static(EXPOSE_HEADERS)
    } else {
        redirects.sort_by_key(|name| {
            name[REDIRECT_HEADER_PREFIX.len()..]
                .parse::<u32>()
                .unwrap_or(u32::MAX)
        });
        let joined = format!("{}, {}", EXPOSE_HEADERS, redirects.join(", "));
        HeaderValue::from_str(&joined).unwrap_or_else(|_| HeaderValue::from_static(EXPOSE_HEADERS))
    };
    headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, expose);
}
