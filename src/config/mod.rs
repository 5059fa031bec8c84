//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → loader.rs (optional TOML file)
//!     → env.rs (PORT, ORIGIN_WHITELIST, ... overrides)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → ProxyConfig derived once, shared via Arc to every request
//! ```
//!
//! # Design Decisions
//! - Settings are read once at startup; there is no reload
//! - All fields have defaults to allow an empty environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{parse_env_list, EnvOverrides};
pub use loader::{load_settings, ConfigError};
pub use schema::{
    AccessConfig, Environment, ForwardingConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    Settings, DEFAULT_REMOVE_HEADERS, DIAGNOSTIC_HOST,
};
