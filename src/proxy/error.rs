//! Error taxonomy for the per-connection pipeline.
//!
//! Every variant is local to one connection. None of them is escalated to the
//! accept loop, and none produces an HTTP error response.

use std::io;
use std::time::Duration;

/// Failure of one stage of handling a client connection.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Client closed before a complete request head arrived.
    #[error("client closed the connection before the request head completed")]
    ConnectionClosed,

    /// Reading from the client failed.
    #[error("failed to read from client: {0}")]
    Read(#[source] io::Error),

    /// The request head did not fit into the framing buffer.
    #[error("request head exceeds {limit} bytes")]
    RequestTooLarge { limit: usize },

    #[error("invalid request line: {0}")]
    InvalidRequestLine(&'static str),

    #[error("no Host header found")]
    MissingHostHeader,

    #[error("invalid Host header: {0}")]
    InvalidHostHeader(&'static str),

    /// Request target that is neither a `/` path nor an `http://` URI with a
    /// usable authority.
    #[error("invalid request target: {0}")]
    InvalidTarget(&'static str),

    #[error("failed to resolve {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: io::Error,
    },

    /// Every resolved address refused or timed out.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("failed to forward request upstream: {0}")]
    Forward(#[source] io::Error),

    /// Writing to the client failed for a reason other than a peer disconnect.
    #[error("failed to relay response to client: {0}")]
    RelayWrite(#[source] io::Error),

    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },
}

impl ProxyError {
    /// Stable label for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::ConnectionClosed => "connection_closed",
            ProxyError::Read(_) => "read_error",
            ProxyError::RequestTooLarge { .. } => "request_too_large",
            ProxyError::InvalidRequestLine(_) => "invalid_request_line",
            ProxyError::MissingHostHeader => "missing_host_header",
            ProxyError::InvalidHostHeader(_) => "invalid_host_header",
            ProxyError::InvalidTarget(_) => "invalid_target",
            ProxyError::Resolution { .. } => "resolution_error",
            ProxyError::Connect { .. } => "connect_error",
            ProxyError::Forward(_) => "forward_error",
            ProxyError::RelayWrite(_) => "relay_write_error",
            ProxyError::Timeout { .. } => "timeout",
        }
    }

    /// True for conditions caused by the client simply going away.
    pub fn is_client_disconnect(&self) -> bool {
        match self {
            ProxyError::ConnectionClosed => true,
            ProxyError::Read(e) => is_peer_disconnect(e),
            _ => false,
        }
    }
}

/// I/O errors that mean the peer reset or closed its end.
pub fn is_peer_disconnect(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
    )
}
