//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Client head read / upstream connect / forward write / relay I/O
//!     → timeouts.rs (enforce per-stage deadline)
//!     → On expiry: connection is abandoned, never retried
//! ```
//!
//! # Design Decisions
//! - Every blocking stage may carry a deadline; all are configurable
//! - No retries: a failed request is over

pub mod timeouts;

pub use timeouts::{with_deadline, with_io_deadline};
