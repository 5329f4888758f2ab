//! Diagnostic events emitted while handling connections.
//!
//! # Responsibilities
//! - Define the diagnostic facts the proxy reports
//! - Deliver them through an injected `ProxyObserver`
//!
//! # Design Decisions
//! - Components call the observer, never stdout directly, so tests can
//!   capture output deterministically
//! - `ConsoleObserver` writes the operator-facing lines to stdout; structured
//!   logs go to stderr through `tracing`

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// One diagnostic fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyEvent {
    /// A client connection was accepted.
    Accepted,
    /// A request was parsed. `host` is the Host header value.
    Getting { host: String, print_uri: String },
    /// Last header line of the request.
    RequestTail(String),
    /// Declared `Content-Length` of the response.
    ResponseBodyLength(u64),
}

impl fmt::Display for ProxyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyEvent::Accepted => write!(f, "Accepted"),
            ProxyEvent::Getting { host, print_uri } => write!(f, "GETting {} {}", host, print_uri),
            ProxyEvent::RequestTail(tail) => write!(f, "Request tail {}", tail),
            ProxyEvent::ResponseBodyLength(n) => write!(f, "Response body length {}", n),
        }
    }
}

/// Receiver of diagnostic events. Shared across connection tasks.
pub trait ProxyObserver: Send + Sync {
    fn notify(&self, event: ProxyEvent);
}

/// Writes each event as one line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl ProxyObserver for ConsoleObserver {
    fn notify(&self, event: ProxyEvent) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", event).and_then(|_| out.flush()) {
            tracing::debug!(error = %e, "Failed to write diagnostic line");
        }
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProxyEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<ProxyEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Recorded events rendered as their output lines.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl ProxyObserver for RecordingObserver {
    fn notify(&self, event: ProxyEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
