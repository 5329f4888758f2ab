//! Forward proxy subsystem.
//!
//! # Data Flow
//! ```text
//! server.rs (accept, spawn per connection)
//!     → handler.rs (read, parse, resolve)
//!     → upstream.rs (resolve name, connect)
//!     → forward.rs (write request verbatim)
//!     → relay.rs (copy response back, sniff Content-Length)
//! ```
//!
//! # Design Decisions
//! - One upstream connection per client connection, one request each
//! - No response is ever synthesized; failures just close the client
//! - Errors stay local to their connection

pub mod error;
pub mod forward;
pub mod handler;
pub mod relay;
pub mod server;
pub mod upstream;

pub use error::ProxyError;
pub use handler::handle_connection;
pub use relay::{RelayEnd, RelayOptions, RelayOutcome};
pub use server::ProxyServer;
pub use upstream::{TcpConnector, UpstreamConnector};
