//! Value file pair
//!
//! A value is persisted as two sibling files:
//! - `<name>`: the encoded text (or `<name>.zst` when text compression is on)
//! - `<name>.blobs`: the blob records its descriptors point into (or
//!   `<name>.blobs.zst` when blob compression is on)
//!
//! Loading reads the text plain-then-compressed and eagerly opens the blob
//! file, if one exists, as a read-only store attached to the returned value.

use crate::config::{BlobCompression, BlobFileConfig, ConfigError};
use crate::reader::{read_plain_or_compressed, BlobFileReader};
use crate::writer::{write_atomic, BlobWriter};
use blobjson_core::{encode_with_blobs, BlobError, DecodeError, JsonCodec, SharedBlobStore, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// zstd level for value text when blob compression is off
const DEFAULT_TEXT_LEVEL: i32 = 3;

/// Errors from saving or loading a value file pair
#[derive(Debug, Error)]
pub enum ValueFileError {
    /// I/O error on the text file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Blob file failure
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Text could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result type for value file operations
pub type ValueFileResult<T> = Result<T, ValueFileError>;

/// Value file pair being written
pub struct ValueFile {
    path: PathBuf,
    config: BlobFileConfig,
    blobs: BlobWriter,
}

impl ValueFile {
    /// Start a value file at `path`; opens the sibling blob writer.
    pub fn create(path: impl AsRef<Path>, config: BlobFileConfig) -> ValueFileResult<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();
        let blobs = BlobWriter::create(config.blobs_path(&path), &config)?;
        Ok(ValueFile {
            path,
            config,
            blobs,
        })
    }

    /// Path of the text file (before any compressed suffix).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared handle to the blob writer.
    pub fn blobs(&self) -> SharedBlobStore {
        self.blobs.shared()
    }

    /// Encode `value`, sending numeric arrays to this file's blob writer.
    pub fn encode<T: JsonCodec>(&self, value: &T) -> ValueFileResult<Value> {
        Ok(encode_with_blobs(value, self.blobs())?)
    }

    /// Finish the blob file, then write the text atomically.
    ///
    /// Returns the path the text was written to.
    pub fn save(self, value: &Value) -> ValueFileResult<PathBuf> {
        self.blobs.finish()?;
        let (target, stale) = if self.config.compress_text {
            let level = match self.config.compression {
                BlobCompression::Zstd { level } => level,
                BlobCompression::None => DEFAULT_TEXT_LEVEL,
            };
            let compressed = zstd::encode_all(value.as_bytes(), level)?;
            let target = self.config.compressed_path(&self.path);
            write_atomic(&target, &compressed)?;
            (target, self.path.clone())
        } else {
            write_atomic(&self.path, value.as_bytes())?;
            (self.path.clone(), self.config.compressed_path(&self.path))
        };
        // leftovers in the other form would shadow or outlive these files
        remove_stale(&stale)?;
        let blobs_path = self.config.blobs_path(&self.path);
        if self.config.compression.is_compressed() {
            remove_stale(&blobs_path)?;
        } else {
            remove_stale(&self.config.compressed_path(&blobs_path))?;
        }
        debug!(
            target: "blobjson::blobs",
            path = %target.display(),
            text_bytes = value.len(),
            blobs = %self.blobs.path().display(),
            "Value file saved"
        );
        Ok(target)
    }

    /// Load the value at `path` with its blob file attached when present.
    pub fn load(path: impl AsRef<Path>, config: &BlobFileConfig) -> ValueFileResult<Value> {
        let path = path.as_ref();
        let (text, text_path) = read_plain_or_compressed(path, config)?;
        let blobs_path = config.blobs_path(path);
        let value = Value::from_parts(text, None);
        let value = match BlobFileReader::open(&blobs_path, config) {
            Ok(reader) => value.with_blobs(Arc::new(reader)),
            Err(BlobError::Io(e)) if e.kind() == io::ErrorKind::NotFound => value,
            Err(e) => return Err(e.into()),
        };
        debug!(
            target: "blobjson::blobs",
            path = %text_path.display(),
            text_bytes = value.len(),
            has_blobs = value.blobs().is_some(),
            "Value file loaded"
        );
        Ok(value)
    }
}

fn remove_stale(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Encode `value` and save it as a value file pair at `path`.
pub fn save_value<T: JsonCodec>(
    path: impl AsRef<Path>,
    value: &T,
    config: &BlobFileConfig,
) -> ValueFileResult<PathBuf> {
    let file = ValueFile::create(path, config.clone())?;
    let encoded = file.encode(value)?;
    file.save(&encoded)
}

/// Load and decode the value file pair at `path`.
pub fn load_value<T: JsonCodec>(
    path: impl AsRef<Path>,
    config: &BlobFileConfig,
) -> ValueFileResult<T> {
    Ok(ValueFile::load(path, config)?.decode()?)
}
