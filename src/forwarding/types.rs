//! Forwarding engine data types.

use std::collections::HashSet;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::config::{Settings, DEFAULT_REMOVE_HEADERS};
use crate::resilience::DEFAULT_HOP_TIMEOUT;

/// Immutable per-request forwarding policy, derived once from [`Settings`].
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Redirects followed before the redirect response itself is returned.
    pub max_redirects: u32,

    /// Lowercased header names never forwarded upstream.
    pub remove_headers: HashSet<String>,

    /// When set and non-empty, the only hostnames that may be targeted.
    pub allowed_hosts: Option<Vec<String>>,

    pub origin_whitelist: Vec<String>,
    pub origin_blacklist: Vec<String>,

    /// Deadline for each upstream hop.
    pub hop_timeout: Duration,
}

impl ProxyConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let allowed_hosts = settings.access.effective_allowed_hosts();
        Self {
            max_redirects: settings.forwarding.max_redirects,
            remove_headers: lowercase_set(&settings.forwarding.remove_headers),
            allowed_hosts: if allowed_hosts.is_empty() {
                None
            } else {
                Some(allowed_hosts)
            },
            origin_whitelist: settings.access.origin_whitelist.clone(),
            origin_blacklist: settings.access.origin_blacklist.clone(),
            hop_timeout: Duration::from_secs(settings.forwarding.hop_timeout_secs),
        }
    }

    /// Replace the removed-header set. Names are matched case-insensitively.
    pub fn with_remove_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.remove_headers = names
            .into_iter()
            .map(|n| n.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    pub fn should_remove(&self, name: &str) -> bool {
        self.remove_headers.contains(&name.to_ascii_lowercase())
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            max_redirects: 5,
            remove_headers: DEFAULT_REMOVE_HEADERS.iter().map(|h| h.to_string()).collect(),
            allowed_hosts: None,
            origin_whitelist: Vec::new(),
            origin_blacklist: Vec::new(),
            hop_timeout: DEFAULT_HOP_TIMEOUT,
        }
    }
}

fn lowercase_set(names: &[String]) -> HashSet<String> {
    names.iter().map(|n| n.trim().to_ascii_lowercase()).collect()
}

/// The parts of the client request the engine replays on every hop.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    /// Fully buffered request body; empty when the client sent none.
    pub body: Bytes,
}

impl InboundRequest {
    pub fn new(method: Method, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            headers,
            body,
        }
    }
}

/// Result envelope of a completed forward.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// URLs redirected *from*, in order. Empty when no redirect was followed.
    pub redirect_chain: Vec<Url>,
}
