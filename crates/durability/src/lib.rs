//! File-backed blob stores for blobjson
//!
//! This crate handles everything that touches disk:
//!
//! - Blob writers: uncompressed (lock-free positioned writes) and zstd
//!   (one serialized stream)
//! - Blob reader: loads a plain or compressed blob file into memory
//! - Value files: encoded text plus its sibling blob file
//! - Configuration: compression, file suffixes, validation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod reader;
pub mod value_file;
pub mod writer;

pub use config::{BlobCompression, BlobFileConfig, ConfigError};
pub use reader::BlobFileReader;
pub use value_file::{load_value, save_value, ValueFile, ValueFileError, ValueFileResult};
pub use writer::{write_collection, BlobWriter, CompressedBlobWriter, UncompressedBlobWriter};
