//! Request framing on a raw client byte stream.
//!
//! # Responsibilities
//! - Accumulate client bytes until the `\r\n\r\n` head terminator appears
//! - Enforce the maximum request head size
//! - Distinguish peer close, read errors and oversized heads
//!
//! # Design Decisions
//! - Bytes arriving after the terminator in the same read are kept and
//!   forwarded with the head; nothing the client sent is dropped
//! - The terminator search rescans only the tail that could complete a match

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::buffer::BoundedBuffer;
use crate::http::headers::HEAD_TERMINATOR;
use crate::proxy::ProxyError;

/// Largest single read from the client.
const READ_CHUNK: usize = 8 * 1024;

/// A framed client request exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    bytes: Vec<u8>,
    head_len: usize,
}

impl RawRequest {
    /// Every byte read from the client, in order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The request head, up to and including `\r\n\r\n`.
    pub fn head(&self) -> &[u8] {
        &self.bytes[..self.head_len]
    }

    pub fn head_len(&self) -> usize {
        self.head_len
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read from `reader` until a complete request head has been received.
pub async fn read_request_head<R>(
    reader: &mut R,
    max_bytes: usize,
) -> Result<RawRequest, ProxyError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BoundedBuffer::new(max_bytes);
    let mut chunk = vec![0u8; READ_CHUNK.min(max_bytes.max(1))];

    loop {
        if buffer.is_full() {
            return Err(ProxyError::RequestTooLarge { limit: max_bytes });
        }

        let want = chunk.len().min(buffer.remaining());
        let read = reader
            .read(&mut chunk[..want])
            .await
            .map_err(ProxyError::Read)?;
        if read == 0 {
            return Err(ProxyError::ConnectionClosed);
        }

        let scan_from = buffer.len().saturating_sub(HEAD_TERMINATOR.len() - 1);
        buffer
            .try_extend(&chunk[..read])
            .map_err(|_| ProxyError::RequestTooLarge { limit: max_bytes })?;

        if let Some(pos) = buffer.find_from(HEAD_TERMINATOR, scan_from) {
            let head_len = pos + HEAD_TERMINATOR.len();
            tracing::trace!(head_len, total = buffer.len(), "Request head framed");
            return Ok(RawRequest {
                bytes: buffer.into_vec(),
                head_len,
            });
        }
    }
}
