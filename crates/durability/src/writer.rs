//! Blob file writers
//!
//! Both writers produce the same record layout as the in-memory
//! `BlobCollection`:
//!
//! ```text
//! [len: u64 LE][payload][zero padding to 8 bytes] [len][payload][pad] ...
//! ```
//!
//! - [`UncompressedBlobWriter`] reserves each record with one atomic
//!   fetch-add and writes it with positioned writes, so concurrent writers
//!   never wait on each other.
//! - [`CompressedBlobWriter`] pushes records through one zstd stream behind
//!   a mutex, so writers are serialized.
//!
//! Write failures set a sticky flag and are returned as `Err`; they never
//! panic. Callers check [`BlobStore::has_failed`] (or the result of
//! `finish`) after a batch.

use crate::config::{BlobCompression, BlobFileConfig};
use blobjson_core::blob::{chunk_record_len, round_up8, CHUNK_HEADER_LEN, PADDING};
use blobjson_core::{BlobCollection, BlobError, BlobStore, SharedBlobStore};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn create_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write `data` to `path` through a temp file and an atomic rename.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    create_parent_dir(path)?;
    let temp_path = crate::config::with_suffix(path, ".tmp");
    let result = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()
    })();
    match result {
        Ok(()) => fs::rename(&temp_path, path),
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(e)
        }
    }
}

/// Persist an in-memory collection as an uncompressed blob file.
///
/// The file is byte-identical to what [`UncompressedBlobWriter`] would have
/// produced for the same parts, so offsets stay valid.
pub fn write_collection(collection: &BlobCollection, path: impl AsRef<Path>) -> Result<(), BlobError> {
    let path = path.as_ref();
    let bytes = collection.to_bytes();
    write_atomic(path, &bytes)?;
    debug!(target: "blobjson::blobs", path = %path.display(), bytes = bytes.len(), "Blob collection written");
    Ok(())
}

/// Uncompressed blob file with lock-free concurrent appends
pub struct UncompressedBlobWriter {
    file: File,
    path: PathBuf,
    next_offset: AtomicU64,
    failed: AtomicBool,
}

impl UncompressedBlobWriter {
    /// Create (or truncate) the blob file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, BlobError> {
        let path = path.as_ref();
        create_parent_dir(path)?;
        let file = File::create(path)?;
        debug!(target: "blobjson::blobs", path = %path.display(), "Opened blob file for writing");
        Ok(UncompressedBlobWriter {
            file,
            path: path.to_path_buf(),
            next_offset: AtomicU64::new(0),
            failed: AtomicBool::new(false),
        })
    }

    /// Path of the blob file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush file contents to disk and report the sticky failure flag.
    ///
    /// Returns the number of bytes written.
    pub fn finish(&self) -> Result<u64, BlobError> {
        if self.has_failed() {
            return Err(BlobError::Failed);
        }
        self.file.sync_all()?;
        let bytes = self.bytes_reserved();
        debug!(target: "blobjson::blobs", path = %self.path.display(), bytes, "Blob file finished");
        Ok(bytes)
    }

    fn write_record(&self, base: u64, data: &[u8]) -> io::Result<()> {
        let len = data.len() as u64;
        write_all_at(&self.file, &len.to_le_bytes(), base)?;
        write_all_at(&self.file, data, base + CHUNK_HEADER_LEN)?;
        let pad = (round_up8(len) - len) as usize;
        if pad > 0 {
            write_all_at(&self.file, &PADDING[..pad], base + CHUNK_HEADER_LEN + len)?;
        }
        Ok(())
    }
}

impl BlobStore for UncompressedBlobWriter {
    fn write_chunk(&self, data: &[u8]) -> Result<u64, BlobError> {
        if data.is_empty() {
            return Ok(0);
        }
        let base = self
            .next_offset
            .fetch_add(chunk_record_len(data.len() as u64), Ordering::SeqCst);
        match self.write_record(base, data) {
            Ok(()) => {
                trace!(target: "blobjson::blobs", offset = base + CHUNK_HEADER_LEN, len = data.len(), "Chunk written");
                Ok(base + CHUNK_HEADER_LEN)
            }
            Err(e) => {
                self.failed.store(true, Ordering::SeqCst);
                warn!(target: "blobjson::blobs", path = %self.path.display(), offset = base, len = data.len(), error = %e, "Blob write failed");
                Err(e.into())
            }
        }
    }

    fn read_chunk(&self, _offset: u64, _buf: &mut [u8]) -> Result<(), BlobError> {
        Err(BlobError::WriteOnly)
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn bytes_reserved(&self) -> u64 {
        self.next_offset.load(Ordering::SeqCst)
    }
}

impl Drop for UncompressedBlobWriter {
    fn drop(&mut self) {
        debug!(
            target: "blobjson::blobs",
            path = %self.path.display(),
            bytes = self.bytes_reserved(),
            failed = self.has_failed(),
            "Closed blob file"
        );
    }
}

struct CompressedState {
    encoder: Option<zstd::Encoder<'static, BufWriter<File>>>,
    offset: u64,
}

/// zstd-compressed blob file; writers are serialized
pub struct CompressedBlobWriter {
    state: Mutex<CompressedState>,
    path: PathBuf,
    failed: AtomicBool,
}

impl CompressedBlobWriter {
    /// Create (or truncate) the compressed blob file at `path`.
    ///
    /// `path` is used as given; callers append the compressed suffix.
    pub fn create(path: impl AsRef<Path>, level: i32) -> Result<Self, BlobError> {
        let path = path.as_ref();
        create_parent_dir(path)?;
        let file = File::create(path)?;
        let encoder = zstd::Encoder::new(BufWriter::new(file), level)?;
        debug!(target: "blobjson::blobs", path = %path.display(), level, "Opened compressed blob file for writing");
        Ok(CompressedBlobWriter {
            state: Mutex::new(CompressedState {
                encoder: Some(encoder),
                offset: 0,
            }),
            path: path.to_path_buf(),
            failed: AtomicBool::new(false),
        })
    }

    /// Path of the compressed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Finish the zstd stream and flush it to disk.
    ///
    /// Later writes fail with [`BlobError::Closed`]. Calling `finish` again is
    /// a no-op. Returns the number of uncompressed bytes written.
    pub fn finish(&self) -> Result<u64, BlobError> {
        let mut state = self.state.lock();
        let offset = state.offset;
        if let Some(encoder) = state.encoder.take() {
            let result = finish_stream(encoder);
            match result {
                Ok(compressed) => {
                    debug!(target: "blobjson::blobs", path = %self.path.display(), bytes = offset, compressed, "Compressed blob file finished");
                }
                Err(e) => {
                    self.failed.store(true, Ordering::SeqCst);
                    warn!(target: "blobjson::blobs", path = %self.path.display(), error = %e, "Compressed blob file finish failed");
                    return Err(e.into());
                }
            }
        }
        if self.has_failed() {
            return Err(BlobError::Failed);
        }
        Ok(offset)
    }
}

fn finish_stream(encoder: zstd::Encoder<'static, BufWriter<File>>) -> io::Result<u64> {
    let mut writer = encoder.finish()?;
    writer.flush()?;
    let file = writer.get_ref();
    file.sync_all()?;
    Ok(file.metadata()?.len())
}

impl BlobStore for CompressedBlobWriter {
    fn write_chunk(&self, data: &[u8]) -> Result<u64, BlobError> {
        if data.is_empty() {
            return Ok(0);
        }
        let mut state = self.state.lock();
        let base = state.offset;
        let Some(encoder) = state.encoder.as_mut() else {
            return Err(BlobError::Closed);
        };
        let len = data.len() as u64;
        let pad = (round_up8(len) - len) as usize;
        let result = encoder
            .write_all(&len.to_le_bytes())
            .and_then(|()| encoder.write_all(data))
            .and_then(|()| encoder.write_all(&PADDING[..pad]));
        state.offset += chunk_record_len(len);
        match result {
            Ok(()) => {
                trace!(target: "blobjson::blobs", offset = base + CHUNK_HEADER_LEN, len, "Compressed chunk written");
                Ok(base + CHUNK_HEADER_LEN)
            }
            Err(e) => {
                self.failed.store(true, Ordering::SeqCst);
                warn!(target: "blobjson::blobs", path = %self.path.display(), offset = base, len, error = %e, "Compressed blob write failed");
                Err(e.into())
            }
        }
    }

    fn read_chunk(&self, _offset: u64, _buf: &mut [u8]) -> Result<(), BlobError> {
        Err(BlobError::WriteOnly)
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn bytes_reserved(&self) -> u64 {
        self.state.lock().offset
    }
}

impl Drop for CompressedBlobWriter {
    fn drop(&mut self) {
        let encoder = self.state.get_mut().encoder.take();
        if let Some(encoder) = encoder {
            if let Err(e) = finish_stream(encoder) {
                warn!(target: "blobjson::blobs", path = %self.path.display(), error = %e, "Compressed blob file not finished cleanly");
            } else {
                debug!(target: "blobjson::blobs", path = %self.path.display(), "Compressed blob file finished on drop");
            }
        }
    }
}

/// Blob writer selected by [`BlobFileConfig::compression`]
#[derive(Clone)]
pub enum BlobWriter {
    /// Uncompressed file at the plain path
    Plain(Arc<UncompressedBlobWriter>),
    /// zstd file at the plain path plus the compressed suffix
    Compressed(Arc<CompressedBlobWriter>),
}

impl BlobWriter {
    /// Create the writer for blob file `path` according to `config`.
    pub fn create(path: impl AsRef<Path>, config: &BlobFileConfig) -> Result<Self, BlobError> {
        let path = path.as_ref();
        Ok(match config.compression {
            BlobCompression::None => BlobWriter::Plain(Arc::new(UncompressedBlobWriter::create(path)?)),
            BlobCompression::Zstd { level } => BlobWriter::Compressed(Arc::new(
                CompressedBlobWriter::create(config.compressed_path(path), level)?,
            )),
        })
    }

    /// Shared handle for encoding.
    pub fn shared(&self) -> SharedBlobStore {
        match self {
            BlobWriter::Plain(w) => w.clone(),
            BlobWriter::Compressed(w) => w.clone(),
        }
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        match self {
            BlobWriter::Plain(w) => w.path(),
            BlobWriter::Compressed(w) => w.path(),
        }
    }

    /// Flush the file and report any earlier write failure.
    pub fn finish(&self) -> Result<u64, BlobError> {
        match self {
            BlobWriter::Plain(w) => w.finish(),
            BlobWriter::Compressed(w) => w.finish(),
        }
    }
}
