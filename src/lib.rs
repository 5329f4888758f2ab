//! Forward HTTP proxy library.
//!
//! Reads one plaintext HTTP/1.1 `GET` per client connection, connects to the
//! upstream named by the request, forwards the request verbatim and relays
//! the response back byte for byte.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use lifecycle::Shutdown;
pub use observability::{ProxyEvent, ProxyObserver};
pub use proxy::{handle_connection, ProxyError, ProxyServer};
