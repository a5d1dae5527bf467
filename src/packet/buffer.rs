//! Ordered byte buffer with O(1) length and O(1) sub-range views.
//!
//! Backed by `Arc<[u8]>` so a view is a cheap (offset, length) pair that
//! keeps the underlying allocation alive for as long as any view exists —
//! the "views never outlive their backing buffer" invariant falls out of
//! reference counting rather than a borrow checker lifetime, which is what
//! lets packets cross the block/channel thread boundary as plain owned,
//! `'static` values.

use std::sync::Arc;

/// An immutable, shareable sequence of octets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Arc<[u8]>,
    start: usize,
    len: usize,
}

impl ByteBuffer {
    /// Builds a buffer owning a fresh copy of `bytes`.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        ByteBuffer {
            data: Arc::from(bytes.into_boxed_slice()),
            start: 0,
            len,
        }
    }

    /// Builds a buffer from a slice, copying it once.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    /// Number of bytes in this view.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrowed view of the bytes covered by this buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..self.start + self.len]
    }

    /// Returns a sub-range view in O(1): no copy, shares the same backing
    /// allocation. Panics if the range is out of bounds, matching slice
    /// indexing semantics.
    pub fn slice(&self, offset: usize, len: usize) -> ByteBuffer {
        assert!(
            offset + len <= self.len,
            "slice {offset}..{} out of bounds for buffer of length {}",
            offset + len,
            self.len
        );
        ByteBuffer {
            data: self.data.clone(),
            start: self.start + offset,
            len,
        }
    }

    /// Concatenates several buffers into one fresh, owned buffer.
    pub fn concat(parts: &[ByteBuffer]) -> ByteBuffer {
        let total: usize = parts.iter().map(|p| p.len()).sum();
        let mut out = Vec::with_capacity(total);
        for p in parts {
            out.extend_from_slice(p.as_slice());
        }
        ByteBuffer::from_vec(out)
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(v: Vec<u8>) -> Self {
        ByteBuffer::from_vec(v)
    }
}
