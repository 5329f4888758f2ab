//! Fixed-capacity byte buffer.
//!
//! # Design Decisions
//! - Capacity is fixed at construction and never grows
//! - Appending past capacity is an explicit error; nothing is truncated
//! - A rejected append leaves the buffer untouched

/// Returned when an append would exceed the buffer's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("buffer capacity of {capacity} bytes exceeded (len {len}, attempted +{attempted})")]
pub struct CapacityExceeded {
    pub capacity: usize,
    pub len: usize,
    pub attempted: usize,
}

/// An append-only byte container with an enforced maximum size.
#[derive(Debug, Clone)]
pub struct BoundedBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl BoundedBuffer {
    /// Create an empty buffer that will hold at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity.min(64 * 1024)),
            capacity,
        }
    }

    /// Append `data`, or reject it whole if it does not fit.
    pub fn try_extend(&mut self, data: &[u8]) -> Result<(), CapacityExceeded> {
        if data.len() > self.remaining() {
            return Err(CapacityExceeded {
                capacity: self.capacity,
                len: self.bytes.len(),
                attempted: data.len(),
            });
        }
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// Position of the first occurrence of `needle`, searching from `from`.
    pub fn find_from(&self, needle: &[u8], from: usize) -> Option<usize> {
        find_subsequence(self.bytes.get(from..)?, needle).map(|idx| idx + from)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that can still be appended.
    pub fn remaining(&self) -> usize {
        self.capacity - self.bytes.len()
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

/// Index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
