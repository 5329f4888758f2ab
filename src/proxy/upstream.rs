//! Upstream connection establishment.
//!
//! # Responsibilities
//! - Split `host[:port]` targets (default port 80)
//! - Resolve names, address-family agnostic
//! - Try each resolved address in order until one connects
//!
//! # Design Decisions
//! - Connector is a trait so the handler can run over any byte stream
//! - Each address attempt has its own deadline; a timeout is just a failed
//!   candidate
//! - No retries beyond walking the resolved address list

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::proxy::ProxyError;
use crate::resilience::with_io_deadline;

pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Opens byte streams to upstream targets.
pub trait UpstreamConnector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connect to `actual_host`, given as `hostname` or `hostname:port`.
    fn connect(
        &self,
        actual_host: &str,
    ) -> impl Future<Output = Result<Self::Stream, ProxyError>> + Send;
}

/// Split a target on its first colon into hostname and port.
///
/// A bracketed IPv6 literal (`[::1]:8080`) is split after the closing
/// bracket and returned without brackets.
pub fn split_host_port(actual_host: &str) -> Result<(&str, u16), ProxyError> {
    let (host, port) = match actual_host.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| resolution_error(actual_host, "unterminated IPv6 literal"))?;
            match after.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None if after.is_empty() => (host, None),
                None => return Err(resolution_error(actual_host, "junk after IPv6 literal")),
            }
        }
        None => match actual_host.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (actual_host, None),
        },
    };

    if host.is_empty() {
        return Err(resolution_error(actual_host, "empty hostname"));
    }
    let port = match port {
        Some(port) => port
            .parse()
            .map_err(|_| resolution_error(actual_host, "invalid port"))?,
        None => DEFAULT_HTTP_PORT,
    };
    Ok((host, port))
}

fn resolution_error(host: &str, message: &'static str) -> ProxyError {
    ProxyError::Resolution {
        host: host.to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, message),
    }
}

/// Plain TCP connector using the system resolver.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        Self { connect_timeout }
    }

    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, ProxyError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| ProxyError::Resolution {
                host: host.to_string(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(ProxyError::Resolution {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            });
        }
        Ok(addrs)
    }
}

impl UpstreamConnector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, actual_host: &str) -> Result<TcpStream, ProxyError> {
        let (host, port) = split_host_port(actual_host)?;
        let addrs = self.resolve(host, port).await?;

        let stream =
            connect_candidates(host, port, addrs, self.connect_timeout, TcpStream::connect).await?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
        }
        Ok(stream)
    }
}

/// Try `attempt` on each address in order, each under its own deadline.
///
/// A timed-out attempt is a failed candidate like any other. When all fail
/// the last error is reported as `Connect`.
async fn connect_candidates<S, F, Fut>(
    host: &str,
    port: u16,
    addrs: Vec<SocketAddr>,
    limit: Option<Duration>,
    mut attempt: F,
) -> Result<S, ProxyError>
where
    F: FnMut(SocketAddr) -> Fut,
    Fut: Future<Output = io::Result<S>>,
{
    let mut last_error = None;
    for addr in addrs {
        match with_io_deadline(limit, attempt(addr)).await {
            Ok(stream) => {
                tracing::debug!(upstream = %addr, "Connected upstream");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(upstream = %addr, error = %e, "Upstream candidate failed");
                last_error = Some(e);
            }
        }
    }

    Err(ProxyError::Connect {
        host: host.to_string(),
        port,
        source: last_error
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses")),
    })
}
