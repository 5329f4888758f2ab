//! Accept loop.
//!
//! # Responsibilities
//! - Accept connections under the listener's permit limit
//! - Spawn one task per connection with a config snapshot
//! - Log and count per-connection failures
//! - Stop accepting on shutdown and drain in-flight connections

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::config::SharedConfig;
use crate::net::{ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::observability::{metrics, ProxyEvent, ProxyObserver};
use crate::proxy::handler::handle_connection;
use crate::proxy::upstream::TcpConnector;
use crate::proxy::ProxyError;

/// Pause after a failed accept so fd exhaustion does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// The forward proxy server.
pub struct ProxyServer {
    config: SharedConfig,
    observer: Arc<dyn ProxyObserver>,
    tracker: ConnectionTracker,
}

impl ProxyServer {
    pub fn new(config: SharedConfig, observer: Arc<dyn ProxyObserver>) -> Self {
        Self {
            config,
            observer,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Connections currently in flight.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Serve `listener` until `shutdown` fires, then drain.
    pub async fn run(
        &self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "Proxy accepting connections");
        }

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr, permit)) => self.spawn(stream, peer_addr, permit),
                    Err(ListenerError::Accept(e)) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                    Err(e) => return Err(e),
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested, no longer accepting");
                    break;
                }
            }
        }

        drop(listener);
        self.drain().await;
        Ok(())
    }

    fn spawn(&self, stream: TcpStream, peer_addr: std::net::SocketAddr, permit: ConnectionPermit) {
        self.observer.notify(ProxyEvent::Accepted);

        let guard = self.tracker.track();
        let config = self.config.load_full();
        let observer = Arc::clone(&self.observer);
        let span = tracing::info_span!(
            "connection",
            connection_id = %guard.id(),
            peer_addr = %peer_addr,
        );

        tokio::spawn(
            async move {
                let _permit = permit;
                let _guard = guard;
                let start = Instant::now();
                let connector = TcpConnector::new(config.timeouts.connect());

                match handle_connection(stream, &connector, &config, observer.as_ref()).await {
                    Ok(outcome) => {
                        tracing::debug!(
                            bytes = outcome.bytes_relayed,
                            content_length = ?outcome.content_length,
                            end = ?outcome.end,
                            "Connection finished"
                        );
                        metrics::record_request("relayed", outcome.bytes_relayed, start);
                    }
                    Err(e) => {
                        log_failure(&e);
                        metrics::record_error(e.kind());
                        metrics::record_request(e.kind(), 0, start);
                    }
                }
            }
            .instrument(span),
        );
    }

    async fn drain(&self) {
        let active = self.tracker.active_count();
        if active == 0 {
            return;
        }
        let grace = self.config.load().timeouts.shutdown_grace();
        tracing::info!(active, grace = ?grace, "Draining connections");

        if self.tracker.wait_for_shutdown(grace).await {
            tracing::info!("All connections drained");
        } else {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Shutdown grace elapsed with connections still open"
            );
        }
    }
}

fn log_failure(error: &ProxyError) {
    if error.is_client_disconnect() {
        tracing::debug!(error = %error, kind = error.kind(), "Client went away");
    } else {
        tracing::warn!(error = %error, kind = error.kind(), "Request failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{shared, ProxyConfig};
    use crate::observability::RecordingObserver;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn start() -> (
        std::net::SocketAddr,
        Arc<RecordingObserver>,
        crate::lifecycle::Shutdown,
        tokio::task::JoinHandle<Result<(), ListenerError>>,
    ) {
        let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let listener = Listener::from_tcp(tcp, 16).unwrap();
        let addr = listener.local_addr().unwrap();

        let observer = Arc::new(RecordingObserver::new());
        let server = ProxyServer::new(shared(ProxyConfig::default()), observer.clone());
        let shutdown = crate::lifecycle::Shutdown::new();
        let rx = shutdown.subscribe();
        let handle = tokio::spawn(async move { server.run(listener, rx).await });
        (addr, observer, shutdown, handle)
    }

    #[tokio::test]
    async fn announces_each_accepted_connection() {
        let (addr, observer, shutdown, handle) = start().await;

        for _ in 0..2 {
            let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
            client.write_all(b"garbage\r\n\r\n").await.unwrap();
            let mut buf = Vec::new();
            client.read_to_end(&mut buf).await.unwrap();
            assert!(buf.is_empty());
        }

        shutdown.trigger();
        handle.await.unwrap().unwrap();
        assert_eq!(observer.lines(), vec!["Accepted", "Accepted"]);
    }

    #[tokio::test]
    async fn shutdown_stops_accepting() {
        let (addr, _observer, shutdown, handle) = start().await;
        shutdown.trigger();
        handle.await.unwrap().unwrap();
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
