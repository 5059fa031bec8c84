//! Forwarding engine.
//!
//! # Data Flow
//! ```text
//! raw target string
//!     → target.rs (scheme inference, URL parse)          400 on failure
//!     → security::access_control (host allowlist)        403 on failure
//!     → loop:
//!         headers.rs (project inbound headers, set host)
//!         engine.rs  (dispatch hop under deadline)        502 / 504
//!         redirect.rs (Follow(next) | Done)
//!     → engine.rs finalize (x-cors-redirect-N, x-request-url, x-final-url)
//!     → ProxyResponse
//! ```

pub mod engine;
pub mod headers;
pub mod redirect;
pub mod target;
pub mod types;

pub use engine::{build_client, Forwarder, UpstreamClient, X_FINAL_URL, X_REQUEST_URL};
pub use target::{extract_target, normalize_target};
pub use types::{InboundRequest, ProxyConfig, ProxyResponse};
