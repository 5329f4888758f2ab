//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Connection pipeline produces:
//!     → events.rs (diagnostic lines via ProxyObserver → stdout)
//!     → logging.rs (structured tracing events → stderr)
//!     → metrics.rs (counters, gauges, histograms → Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Diagnostics are an injected capability, not a global stream
//! - Connection ID flows through all log events of a connection
//! - Metrics are cheap and optional (no recorder, no cost)

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{ConsoleObserver, ProxyEvent, ProxyObserver, RecordingObserver};
