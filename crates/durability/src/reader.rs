//! Read-only blob file
//!
//! The whole file is loaded into memory once. The plain path is tried first;
//! if it does not exist, the path with the compressed suffix is inflated
//! instead. After loading, `read_chunk` is a bounds-checked copy.

use crate::config::BlobFileConfig;
use blobjson_core::{BlobError, BlobStore};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixed part of each read increment; the rest is half the data loaded so far.
const READ_INCREMENT: usize = 8192;

/// Read everything from `reader`, growing the buffer by
/// `8192 + len / 2` bytes per read.
pub(crate) fn read_growing<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    loop {
        let start = data.len();
        data.resize(start + READ_INCREMENT + start / 2, 0);
        let n = loop {
            match reader.read(&mut data[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        data.truncate(start + n);
        if n == 0 {
            return Ok(data);
        }
    }
}

/// Open `path`, or `path` with the compressed suffix when the plain file is
/// missing, and return its decompressed contents.
pub(crate) fn read_plain_or_compressed(
    path: &Path,
    config: &BlobFileConfig,
) -> io::Result<(Vec<u8>, PathBuf)> {
    match File::open(path) {
        Ok(file) => Ok((read_growing(file)?, path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let compressed = config.compressed_path(path);
            let file = File::open(&compressed)?;
            let data = read_growing(zstd::Decoder::new(file)?)?;
            Ok((data, compressed))
        }
        Err(e) => Err(e),
    }
}

/// Blob file loaded fully into memory
pub struct BlobFileReader {
    data: Vec<u8>,
    path: PathBuf,
}

impl BlobFileReader {
    /// Load the blob file at `path` (plain, else compressed).
    pub fn open(path: impl AsRef<Path>, config: &BlobFileConfig) -> Result<Self, BlobError> {
        let (data, path) = read_plain_or_compressed(path.as_ref(), config)?;
        debug!(target: "blobjson::blobs", path = %path.display(), bytes = data.len(), "Loaded blob file");
        Ok(BlobFileReader { data, path })
    }

    /// Serve blob data that is already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        BlobFileReader {
            data,
            path: PathBuf::new(),
        }
    }

    /// Path the data was loaded from (empty for [`from_bytes`](Self::from_bytes)).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loaded length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the file was empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl BlobStore for BlobFileReader {
    fn write_chunk(&self, _data: &[u8]) -> Result<u64, BlobError> {
        Err(BlobError::ReadOnly)
    }

    fn read_chunk(&self, offset: u64, buf: &mut [u8]) -> Result<(), BlobError> {
        let available = self.data.len() as u64;
        let len = buf.len() as u64;
        match offset.checked_add(len) {
            Some(end) if end <= available => {
                buf.copy_from_slice(&self.data[offset as usize..end as usize]);
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
        self.data.len() as u64
    }
}
