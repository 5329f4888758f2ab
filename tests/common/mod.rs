//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use forward_proxy::config::{shared, ProxyConfig};
use forward_proxy::net::{Listener, ListenerError};
use forward_proxy::observability::RecordingObserver;
use forward_proxy::proxy::{
    handle_connection, ProxyError, ProxyServer, RelayOutcome, TcpConnector, UpstreamConnector,
};
use forward_proxy::Shutdown;

/// Build an HTTP/1.1 200 response with a `Content-Length` body.
pub fn ok_response(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}

/// A loopback upstream that records each request head it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    accepted: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

/// Start an upstream that answers every connection with `chunks`, written
/// one by one with `gap` between them, then closes.
pub async fn start_chunked_upstream(chunks: Vec<Vec<u8>>, gap: Duration) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let accepted = Arc::new(AtomicUsize::new(0));

    let upstream = MockUpstream {
        addr,
        requests: requests.clone(),
        accepted: accepted.clone(),
    };
    let chunks = Arc::new(chunks);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let requests = requests.clone();
                    let chunks = chunks.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        requests.lock().unwrap().push(head);
                        for chunk in chunks.iter() {
                            if socket.write_all(chunk).await.is_err() {
                                return;
                            }
                            if !gap.is_zero() {
                                tokio::time::sleep(gap).await;
                            }
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    upstream
}

/// Start an upstream that answers every connection with `response`.
pub async fn start_mock_upstream(response: Vec<u8>) -> MockUpstream {
    start_chunked_upstream(vec![response], Duration::ZERO).await
}

async fn read_head(socket: &mut TcpStream) -> Vec<u8> {
    let mut head = Vec::new();
    let mut buf = [0u8; 4096];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    head
}

/// A port on loopback with nothing listening.
pub async fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Sends every target to one fixed address, remembering the names asked for.
pub struct MappedConnector {
    target: SocketAddr,
    inner: TcpConnector,
    seen: Mutex<Vec<String>>,
}

impl MappedConnector {
    pub fn new(target: SocketAddr) -> Self {
        Self {
            target,
            inner: TcpConnector::new(Some(Duration::from_secs(5))),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl UpstreamConnector for MappedConnector {
    type Stream = TcpStream;

    async fn connect(&self, actual_host: &str) -> Result<TcpStream, ProxyError> {
        self.seen.lock().unwrap().push(actual_host.to_string());
        self.inner.connect(&self.target.to_string()).await
    }
}

/// Write `request` on a fresh connection and read until the peer closes.
///
/// A reset after partial data still returns what arrived.
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let _ = stream.write_all(request).await;
    let mut received = Vec::new();
    let _ = stream.read_to_end(&mut received).await;
    received
}

/// Run one handler invocation over a real loopback connection.
pub async fn proxy_once<C: UpstreamConnector>(
    request: &[u8],
    connector: &C,
    config: &ProxyConfig,
    observer: &RecordingObserver,
) -> (Result<RelayOutcome, ProxyError>, Vec<u8>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let request = request.to_vec();
    let client = tokio::spawn(async move { send_raw(addr, &request).await });

    let (stream, _) = listener.accept().await.unwrap();
    let result = handle_connection(stream, connector, config, observer).await;
    let received = client.await.unwrap();
    (result, received)
}

/// A proxy server running on an ephemeral loopback port.
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub observer: Arc<RecordingObserver>,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), ListenerError>>,
}

impl RunningProxy {
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let listener = Listener::from_tcp(tcp, config.listener.max_connections).unwrap();
    let addr = listener.local_addr().unwrap();

    let observer = Arc::new(RecordingObserver::new());
    let server = ProxyServer::new(shared(config), observer.clone());
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    RunningProxy {
        addr,
        observer,
        shutdown,
        handle,
    }
}
