//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Each upstream hop:
//!     → timeouts.rs (enforce the per-hop deadline)
//!     → On expiry: abort the connection, surface 504
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No automatic retries: a failed hop ends the redirect chain and
//!   retrying is left to the caller

pub mod timeouts;

pub use timeouts::{with_hop_timeout, DEFAULT_HOP_TIMEOUT};
