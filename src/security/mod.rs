//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming proxied request:
//!     → access_control.rs (origin allow/deny, required header)
//!     → forwarding engine (host allowlist via access_control.rs)
//!     → headers.rs (strip hop-by-hop, attach CORS policy)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Checks are pure functions over immutable configuration
//! - Blacklist beats whitelist
//! - Fail closed: any rejection ends the request before dispatch

pub mod access_control;
pub mod headers;

pub use access_control::{check_allowed_host, check_origin, check_required_header, validate_origin};
pub use headers::{apply_cors_headers, strip_hop_by_hop};
