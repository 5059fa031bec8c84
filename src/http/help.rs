//! Usage text served on `/`.

use crate::config::{Environment, Settings, DIAGNOSTIC_HOST};

pub const DIAGNOSTIC_BODY: &str = "No CORS headers on this response";

const FALLBACK_PUBLIC_URL: &str = "https://cors-proxy.example.com";

/// Base URL used in the examples.
fn base_url(settings: &Settings) -> String {
    match (settings.environment, settings.public_url.as_deref()) {
        (Environment::Development, _) => format!("http://localhost:{}", settings.listener.port),
        (_, Some(url)) => url.trim_end_matches('/').to_string(),
        (_, None) => FALLBACK_PUBLIC_URL.to_string(),
    }
}

/// Render the help text for the active settings.
pub fn help_text(settings: &Settings) -> String {
    let base = base_url(settings);
    let access = &settings.access;

    let mut security = Vec::new();
    security.push(if access.require_header {
        "- Requires Origin or X-Requested-With header".to_string()
    } else {
        "- No header requirements".to_string()
    });

    let hosts: Vec<&str> = access
        .allowed_hosts
        .iter()
        .map(String::as_str)
        .filter(|h| *h != DIAGNOSTIC_HOST)
        .collect();
    security.push(if hosts.is_empty() {
        "- No host restrictions (open proxy)".to_string()
    } else {
        format!("- Allowed hosts: {}", hosts.join(", "))
    });

    if !access.origin_whitelist.is_empty() {
        security.push(format!("- Origin whitelist: {}", access.origin_whitelist.join(", ")));
    }
    if !access.origin_blacklist.is_empty() {
        security.push(format!("- Origin blacklist: {}", access.origin_blacklist.join(", ")));
    }

    format!(
        "CORS Bypass Proxy

Usage:
  /                 Shows this help message
  /iscorsneeded     Test endpoint (served without CORS headers)
  /<url>            Proxy request to <url> with CORS headers

Examples:
  {base}/https://api.example.com/data
  {base}/http://example.com

Features:
  - Automatic redirect following (up to {max_redirects} redirects)
  - Cookies are stripped from requests
  - CORS headers added to all responses
  - Protocol defaults to http (https for port 443)

Security:
  {security}",
        base = base,
        max_redirects = settings.forwarding.max_redirects,
        security = security.join("\n  "),
    )
}
