//! HTTP boundary subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → OPTIONS? → preflight response
//!     → "/"            → help.rs text (+ CORS)
//!     → "/iscorsneeded" → diagnostic text (no CORS)
//!     → "/<target>"    → security checks → forwarding engine
//!     → response.rs (strip hop-by-hop, add CORS, map errors)
//!     → Send to client
//! ```

pub mod help;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
