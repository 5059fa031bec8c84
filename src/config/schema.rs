//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Synthetic host added to a non-empty host allowlist so `/iscorsneeded`
/// variants keep resolving through the proxy path.
pub const DIAGNOSTIC_HOST: &str = "iscorsneeded";

/// Headers stripped from every forwarded request unless overridden.
pub const DEFAULT_REMOVE_HEADERS: &[&str] = &[
    "cookie",
    "cookie2",
    "x-request-start",
    "x-request-id",
    "via",
    "connect-time",
    "total-route-time",
];

/// Root configuration for the CORS proxy process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Origin and host restrictions.
    pub access: AccessConfig,

    /// Upstream forwarding behaviour.
    pub forwarding: ForwardingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Deployment mode. Only changes display text.
    pub environment: Environment,

    /// Public base URL shown in the help text outside development.
    pub public_url: Option<String>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_address: String,

    /// TCP port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Who may use the proxy and what it may reach.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AccessConfig {
    /// Origins allowed to use the proxy. Empty means any.
    pub origin_whitelist: Vec<String>,

    /// Origins always rejected. Takes precedence over the whitelist.
    pub origin_blacklist: Vec<String>,

    /// Hostnames that may be targeted. Empty means any (open proxy).
    pub allowed_hosts: Vec<String>,

    /// Reject proxied requests carrying neither `Origin` nor `X-Requested-With`.
    pub require_header: bool,
}

impl AccessConfig {
    /// Allowed hosts as the engine sees them, with the diagnostic host
    /// appended when any restriction is configured.
    pub fn effective_allowed_hosts(&self) -> Vec<String> {
        let mut hosts = self.allowed_hosts.clone();
        if !hosts.is_empty() && !hosts.iter().any(|h| h == DIAGNOSTIC_HOST) {
            hosts.push(DIAGNOSTIC_HOST.to_string());
        }
        hosts
    }
}

/// Upstream forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Maximum number of redirects followed per request.
    pub max_redirects: u32,

    /// Request headers never forwarded (case-insensitive).
    pub remove_headers: Vec<String>,

    /// Deadline for each upstream hop in seconds.
    pub hop_timeout_secs: u64,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            max_redirects: 5,
            remove_headers: DEFAULT_REMOVE_HEADERS.iter().map(|h| h.to_string()).collect(),
            hop_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(format!(
                "unknown environment '{}' (expected development, production or test)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        };
        f.write_str(name)
    }
}
