//! Blob file configuration.
//!
//! Controls how blob files and value text files are written and which file
//! names are tried when they are read back.

use std::path::{Path, PathBuf};

/// Compression applied to a blob file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobCompression {
    /// Plain records written with positioned writes; concurrent writers do
    /// not block each other.
    #[default]
    None,
    /// Records written through one zstd stream; writers are serialized.
    Zstd {
        /// zstd compression level (1-22)
        level: i32,
    },
}

impl BlobCompression {
    /// True for any compressed variant.
    pub fn is_compressed(&self) -> bool {
        !matches!(self, BlobCompression::None)
    }
}

/// Blob file configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobFileConfig {
    /// Compression for newly written blob files (default: none).
    pub compression: BlobCompression,

    /// Suffix appended to the name of a compressed file (default: `.zst`).
    ///
    /// Readers try the plain name first and then the name with this suffix.
    pub compressed_suffix: String,

    /// Suffix of the blob file that sits next to a value text file
    /// (default: `.blobs`).
    pub blobs_suffix: String,

    /// Whether value text files are compressed too (default: false).
    pub compress_text: bool,
}

impl Default for BlobFileConfig {
    fn default() -> Self {
        BlobFileConfig {
            compression: BlobCompression::None,
            compressed_suffix: ".zst".to_string(),
            blobs_suffix: ".blobs".to_string(),
            compress_text: false,
        }
    }
}

impl BlobFileConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set blob compression (builder pattern).
    pub fn with_compression(mut self, compression: BlobCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the compressed-file suffix (builder pattern).
    pub fn with_compressed_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.compressed_suffix = suffix.into();
        self
    }

    /// Set the blob file suffix (builder pattern).
    pub fn with_blobs_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.blobs_suffix = suffix.into();
        self
    }

    /// Set whether value text is compressed (builder pattern).
    pub fn with_compress_text(mut self, compress: bool) -> Self {
        self.compress_text = compress;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let BlobCompression::Zstd { level } = self.compression {
            if !(1..=22).contains(&level) {
                return Err(ConfigError::InvalidCompressionLevel(level));
            }
        }
        if self.compressed_suffix.is_empty() {
            return Err(ConfigError::EmptySuffix("compressed_suffix"));
        }
        if self.blobs_suffix.is_empty() {
            return Err(ConfigError::EmptySuffix("blobs_suffix"));
        }
        if self.compressed_suffix == self.blobs_suffix {
            return Err(ConfigError::SuffixClash);
        }
        Ok(())
    }

    /// Create a configuration for testing (compressed blobs and text, fast
    /// level).
    pub fn for_testing() -> Self {
        BlobFileConfig {
            compression: BlobCompression::Zstd { level: 1 },
            compress_text: true,
            ..Self::default()
        }
    }

    /// Path of the blob file belonging to the value text at `path`.
    pub fn blobs_path(&self, path: &Path) -> PathBuf {
        with_suffix(path, &self.blobs_suffix)
    }

    /// `path` with the compressed suffix appended.
    pub fn compressed_path(&self, path: &Path) -> PathBuf {
        with_suffix(path, &self.compressed_suffix)
    }
}

/// Append `suffix` to the file name of `path`.
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Blob file configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// zstd level outside 1..=22.
    #[error("Compression level {0} is outside 1..=22")]
    InvalidCompressionLevel(i32),

    /// A file suffix is empty.
    #[error("{0} must not be empty")]
    EmptySuffix(&'static str),

    /// Compressed and blob suffixes are identical.
    #[error("compressed_suffix and blobs_suffix must differ")]
    SuffixClash,
}
