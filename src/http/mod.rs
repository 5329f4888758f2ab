//! HTTP/1.1 wire handling subsystem.
//!
//! # Data Flow
//! ```text
//! Client bytes
//!     → framing.rs (accumulate until \r\n\r\n, bounded by buffer.rs)
//!     → request.rs (request line, Host header, request tail)
//!     → target.rs (origin-form vs absolute-form → ResolvedTarget)
//!
//! Upstream bytes
//!     → response.rs (sniff Content-Length from the leading head)
//! ```
//!
//! # Design Decisions
//! - Works on raw bytes; the request is never re-serialized
//! - Bounded buffers give explicit capacity errors instead of truncation

pub mod buffer;
pub mod framing;
pub mod headers;
pub mod request;
pub mod response;
pub mod target;

pub use buffer::{BoundedBuffer, CapacityExceeded};
pub use framing::{read_request_head, RawRequest};
pub use request::{parse_request, request_tail, ParsedRequest};
pub use response::ResponseSniffer;
pub use target::{resolve_target, ResolvedTarget};
