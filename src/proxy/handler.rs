//! Per-connection request pipeline.
//!
//! ```text
//! client ─▶ read_request_head ─▶ parse_request ─▶ resolve_target
//!        ─▶ connector.connect ─▶ forward_request ─▶ relay_response ─▶ client
//! ```
//!
//! Any failure before the relay drops both streams without writing anything
//! to the client. Once relaying ends, both streams are shut down whatever the
//! outcome.

use std::fmt::Write as _;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::config::ProxyConfig;
use crate::http::request::request_tail_raw;
use crate::http::{parse_request, read_request_head, request_tail, resolve_target};
use crate::observability::{ProxyEvent, ProxyObserver};
use crate::proxy::forward::forward_request;
use crate::proxy::relay::{relay_response, RelayOptions, RelayOutcome};
use crate::proxy::upstream::UpstreamConnector;
use crate::proxy::ProxyError;
use crate::resilience::with_deadline;

/// Handle one client connection end to end.
///
/// Opens at most one upstream connection. `client` is consumed and closed
/// on every path.
pub async fn handle_connection<S, C>(
    mut client: S,
    connector: &C,
    config: &ProxyConfig,
    observer: &dyn ProxyObserver,
) -> Result<RelayOutcome, ProxyError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    C: UpstreamConnector,
{
    let raw = with_deadline(
        "request_head",
        config.timeouts.client_read(),
        read_request_head(&mut client, config.limits.max_request_bytes),
    )
    .await?;

    let parsed = parse_request(raw.head())?;

    if let Some(line) = request_tail_raw(raw.head()) {
        tracing::debug!(bytes = line.len(), raw = %hex(line), "Request tail bytes");
    }
    if let Some(tail) = request_tail(raw.head()) {
        observer.notify(ProxyEvent::RequestTail(tail));
    }

    let target = resolve_target(&parsed)?;
    observer.notify(ProxyEvent::Getting {
        host: parsed.host.clone(),
        print_uri: target.print_uri.clone(),
    });
    tracing::debug!(
        host = %parsed.host,
        upstream = %target.actual_host,
        path = %target.actual_uri,
        "Request parsed"
    );

    let mut upstream = connector.connect(&target.actual_host).await?;

    forward_request(&mut upstream, raw.as_bytes(), config.timeouts.write()).await?;

    let options = RelayOptions {
        chunk_size: config.limits.relay_chunk_bytes,
        header_capacity: config.limits.response_header_bytes,
        idle_timeout: config.timeouts.idle(),
    };
    let result = relay_response(&mut upstream, &mut client, options, observer).await;

    if let Err(e) = upstream.shutdown().await {
        tracing::trace!(error = %e, "Upstream shutdown failed");
    }
    if let Err(e) = client.shutdown().await {
        tracing::trace!(error = %e, "Client shutdown failed");
    }

    result
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 3), |mut out, b| {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{:02x}", b);
        out
    })
}
