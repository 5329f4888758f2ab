//! Response relaying from upstream to client.
//!
//! # Responsibilities
//! - Copy every upstream byte to the client, in order, until upstream EOF
//! - Feed the leading bytes to a `ResponseSniffer` for `Content-Length`
//! - Tell client disconnects apart from real write failures
//!
//! # Design Decisions
//! - Sniffing is a side path; a chunk is written whether or not it was
//!   sniffed
//! - Upstream read failure ends the response as-is (possibly truncated)
//! - Each read and write has an idle deadline, not the response as a whole

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::ResponseSniffer;
use crate::observability::{ProxyEvent, ProxyObserver};
use crate::proxy::error::{is_peer_disconnect, ProxyError};
use crate::resilience::with_io_deadline;

/// Tuning for one relay.
#[derive(Debug, Clone, Copy)]
pub struct RelayOptions {
    /// Maximum bytes per upstream read.
    pub chunk_size: usize,
    /// Capacity of the response header accumulator.
    pub header_capacity: usize,
    /// Maximum stall of a single read or write.
    pub idle_timeout: Option<Duration>,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            chunk_size: 8 * 1024,
            header_capacity: 16 * 1024,
            idle_timeout: None,
        }
    }
}

/// Why relaying stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// Upstream closed its side; the response is complete.
    UpstreamClosed,
    /// Reading from upstream failed or stalled; the response may be truncated.
    UpstreamFailed,
    /// The client reset or closed the connection mid-response.
    ClientDisconnected,
}

/// Summary of a finished relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutcome {
    pub bytes_relayed: u64,
    pub content_length: Option<u64>,
    pub end: RelayEnd,
}

/// Relay the response from `upstream` to `client`.
///
/// Fails only with `RelayWrite`, when a client write fails for a reason other
/// than the client going away.
pub async fn relay_response<U, C>(
    upstream: &mut U,
    client: &mut C,
    options: RelayOptions,
    observer: &dyn ProxyObserver,
) -> Result<RelayOutcome, ProxyError>
where
    U: AsyncRead + Unpin,
    C: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; options.chunk_size.max(1)];
    let mut sniffer = ResponseSniffer::new(options.header_capacity);
    let mut outcome = RelayOutcome {
        bytes_relayed: 0,
        content_length: None,
        end: RelayEnd::UpstreamClosed,
    };

    loop {
        let read = match with_io_deadline(options.idle_timeout, upstream.read(&mut chunk)).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bytes_relayed = outcome.bytes_relayed,
                    "Upstream read failed"
                );
                outcome.end = RelayEnd::UpstreamFailed;
                break;
            }
        };

        if let Some(length) = sniffer.observe(&chunk[..read]) {
            outcome.content_length = Some(length);
            observer.notify(ProxyEvent::ResponseBodyLength(length));
        }

        let write = async {
            client.write_all(&chunk[..read]).await?;
            client.flush().await
        };
        match with_io_deadline(options.idle_timeout, write).await {
            Ok(()) => outcome.bytes_relayed += read as u64,
            Err(e) if is_peer_disconnect(&e) => {
                tracing::debug!(error = %e, "Client went away during relay");
                outcome.end = RelayEnd::ClientDisconnected;
                break;
            }
            Err(e) => return Err(ProxyError::RelayWrite(e)),
        }
    }

    Ok(outcome)
}
