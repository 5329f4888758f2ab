//! Response header sniffing on the relay path.
//!
//! # Responsibilities
//! - Accumulate the leading response bytes until `\r\n\r\n`
//! - Extract the declared `Content-Length` exactly once
//!
//! # Design Decisions
//! - Observes copies of relayed chunks; never holds back data
//! - Only the part of a chunk that fits is accumulated; a chunk larger than
//!   the accumulator can still carry a complete head
//! - Once the accumulator fills without a terminator, sniffing is abandoned
//!   for the rest of the response

use crate::http::buffer::BoundedBuffer;
use crate::http::headers::{find_header, trim_ows, HEAD_TERMINATOR};

#[derive(Debug)]
enum SniffState {
    Accumulating(BoundedBuffer),
    Done,
    Abandoned,
}

/// Watches the start of an upstream response for its declared body length.
#[derive(Debug)]
pub struct ResponseSniffer {
    state: SniffState,
}

impl ResponseSniffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: SniffState::Accumulating(BoundedBuffer::new(capacity)),
        }
    }

    /// Feed the next relayed chunk.
    ///
    /// Returns the declared content length on the one call where the header
    /// block completes and carries a parseable `Content-Length`.
    pub fn observe(&mut self, chunk: &[u8]) -> Option<u64> {
        let SniffState::Accumulating(buffer) = &mut self.state else {
            return None;
        };

        let scan_from = buffer.len().saturating_sub(HEAD_TERMINATOR.len() - 1);
        let fit = chunk.len().min(buffer.remaining());
        if let Err(e) = buffer.try_extend(&chunk[..fit]) {
            tracing::trace!(error = %e, "Sniff buffer rejected chunk prefix");
            self.state = SniffState::Abandoned;
            return None;
        }

        let Some(boundary) = buffer.find_from(HEAD_TERMINATOR, scan_from) else {
            if fit < chunk.len() {
                tracing::trace!(
                    capacity = buffer.capacity(),
                    "Response head exceeds sniff buffer; not sniffing"
                );
                self.state = SniffState::Abandoned;
            }
            return None;
        };
        let length = content_length(&buffer.as_slice()[..boundary + HEAD_TERMINATOR.len()]);
        self.state = SniffState::Done;
        length
    }

    /// True once the header boundary was seen.
    pub fn headers_complete(&self) -> bool {
        matches!(self.state, SniffState::Done)
    }

    /// True if the header block never fit into the accumulator.
    pub fn abandoned(&self) -> bool {
        matches!(self.state, SniffState::Abandoned)
    }
}

/// Value of the `Content-Length` header in a complete response head.
pub fn content_length(head: &[u8]) -> Option<u64> {
    let value = trim_ows(find_header(head, b"Content-Length:")?);
    std::str::from_utf8(value).ok()?.parse().ok()
}
