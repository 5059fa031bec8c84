//! Environment-style overrides.
//!
//! Deployment platforms hand the proxy its settings as flat strings
//! (`ORIGIN_WHITELIST="a, b"`). This module turns those strings into the
//! typed [`Settings`] fields.

use crate::config::schema::{Environment, LogFormat, Settings};

/// Split a comma-separated list, trimming each item.
///
/// Empty items are dropped, so `""` and `" , "` both yield an empty list.
pub fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Only the literal `true` enables a flag.
pub fn parse_env_flag(value: &str) -> bool {
    value == "true"
}

/// Raw override values. `None` leaves the loaded setting untouched.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub port: Option<u16>,
    pub origin_whitelist: Option<String>,
    pub origin_blacklist: Option<String>,
    pub allowed_hosts: Option<String>,
    pub require_header: Option<String>,
    pub environment: Option<Environment>,
    pub public_url: Option<String>,
    pub log_format: Option<LogFormat>,
    pub metrics_address: Option<String>,
}

impl EnvOverrides {
    /// Apply every present override on top of `settings`.
    pub fn apply(self, settings: &mut Settings) {
        if let Some(port) = self.port {
            settings.listener.port = port;
        }
        if let Some(list) = self.origin_whitelist {
            settings.access.origin_whitelist = parse_env_list(&list);
        }
        if let Some(list) = self.origin_blacklist {
            settings.access.origin_blacklist = parse_env_list(&list);
        }
        if let Some(list) = self.allowed_hosts {
            settings.access.allowed_hosts = parse_env_list(&list);
        }
        if let Some(flag) = self.require_header {
            settings.access.require_header = parse_env_flag(&flag);
        }
        if let Some(environment) = self.environment {
            settings.environment = environment;
        }
        if let Some(url) = self.public_url.filter(|u| !u.trim().is_empty()) {
            settings.public_url = Some(url);
        }
        if let Some(format) = self.log_format {
            settings.observability.log_format = format;
        }
        if let Some(addr) = self.metrics_address {
            settings.observability.metrics_enabled = true;
            settings.observability.metrics_address = addr;
        }
    }
}
