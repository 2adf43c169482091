//! Binary side channel
//!
//! A [`BlobStore`] is an append-only region of length-prefixed chunks. Every
//! chunk record has the same layout in memory and on disk:
//!
//! ```text
//! [payload length: u64 LE][payload][zero padding to an 8-byte boundary]
//! ```
//!
//! `write_chunk` returns the offset of the payload (record start + 8), so a
//! reader can fetch exactly `len` bytes without looking at the prefix. Empty
//! payloads are not stored; they return offset 0.
//!
//! This module holds the trait and the in-memory [`BlobCollection`]. File
//! backings live in `blobjson-durability`.

use crate::error::BlobError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Size of the length prefix in front of every chunk payload
pub const CHUNK_HEADER_LEN: u64 = 8;

/// Append-only store of binary chunks.
///
/// Implementations must accept concurrent `write_chunk` calls; each call gets
/// a disjoint byte range.
pub trait BlobStore: Send + Sync {
    /// Append `data` as one chunk and return its payload offset.
    ///
    /// Empty payloads return `Ok(0)` without writing a record.
    fn write_chunk(&self, data: &[u8]) -> Result<u64, BlobError>;

    /// Copy `buf.len()` payload bytes starting at `offset` into `buf`.
    fn read_chunk(&self, offset: u64, buf: &mut [u8]) -> Result<(), BlobError>;

    /// True once any write on this store has failed.
    fn has_failed(&self) -> bool;

    /// Total bytes reserved by chunk records so far (headers and padding
    /// included).
    fn bytes_reserved(&self) -> u64;
}

/// Shared handle to a blob store
pub type SharedBlobStore = Arc<dyn BlobStore>;

/// Round `n` up to the next multiple of 8.
#[inline]
pub const fn round_up8(n: u64) -> u64 {
    (n + 7) & !7
}

/// Bytes occupied by the record holding a payload of `len` bytes.
#[inline]
pub const fn chunk_record_len(len: u64) -> u64 {
    round_up8(len) + CHUNK_HEADER_LEN
}

/// Zero bytes used to pad records.
pub const PADDING: [u8; 8] = [0; 8];

/// Append a full chunk record (prefix, payload, padding) to `out`.
pub fn append_chunk_record(out: &mut Vec<u8>, data: &[u8]) {
    let len = data.len() as u64;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(data);
    let pad = (round_up8(len) - len) as usize;
    out.extend_from_slice(&PADDING[..pad]);
}

struct CollectionInner {
    data: Vec<u8>,
    /// `(payload offset, payload length)` per part, in write order
    parts: Vec<(u64, u64)>,
}

/// In-memory blob store.
///
/// Parts are kept in one contiguous buffer using the uncompressed file record
/// layout, so offsets handed out here stay valid if the buffer is persisted
/// byte for byte.
pub struct BlobCollection {
    inner: Mutex<CollectionInner>,
}

impl BlobCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        BlobCollection {
            inner: Mutex::new(CollectionInner {
                data: Vec::new(),
                parts: Vec::new(),
            }),
        }
    }

    /// Create an empty collection behind a shared handle.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of non-empty parts written so far.
    pub fn part_count(&self) -> usize {
        self.inner.lock().parts.len()
    }

    /// Copy of the payload of part `index`.
    pub fn part(&self, index: usize) -> Option<Vec<u8>> {
        let inner = self.inner.lock();
        let &(offset, len) = inner.parts.get(index)?;
        let start = offset as usize;
        Some(inner.data[start..start + len as usize].to_vec())
    }

    /// Copy of the whole record buffer, identical to an uncompressed blob file
    /// holding the same parts.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.lock().data.clone()
    }

    /// Length of the record buffer in bytes.
    pub fn len(&self) -> usize {
        self.inner.lock().data.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BlobCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BlobCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BlobCollection")
            .field("parts", &inner.parts.len())
            .field("bytes", &inner.data.len())
            .finish()
    }
}

impl BlobStore for BlobCollection {
    fn write_chunk(&self, data: &[u8]) -> Result<u64, BlobError> {
        if data.is_empty() {
            return Ok(0);
        }
        let mut inner = self.inner.lock();
        let offset = inner.data.len() as u64 + CHUNK_HEADER_LEN;
        append_chunk_record(&mut inner.data, data);
        inner.parts.push((offset, data.len() as u64));
        Ok(offset)
    }

    fn read_chunk(&self, offset: u64, buf: &mut [u8]) -> Result<(), BlobError> {
        let inner = self.inner.lock();
        let available = inner.data.len() as u64;
        let len = buf.len() as u64;
        match offset.checked_add(len) {
            Some(end) if end <= available => {
                buf.copy_from_slice(&inner.data[offset as usize..end as usize]);
                Ok(())
            }
            _ => Err(BlobError::OutOfRange {
                offset,
                len,
                available,
            }),
        }
    }

    fn has_failed(&self) -> bool {
        false
    }

    fn bytes_reserved(&self) -> u64 {
        self.inner.lock().data.len() as u64
    }
}
