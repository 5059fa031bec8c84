//! Public CORS bypass proxy library.

pub mod config;
pub mod error;
pub mod forwarding;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::Settings;
pub use error::{CorsProxyError, ServeError};
pub use forwarding::{Forwarder, InboundRequest, ProxyConfig, ProxyResponse};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::validate_origin;
