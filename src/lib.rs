//! blobjson - typed JSON codec with a binary blob side channel
//!
//! Values are encoded to compact JSON text. Large numeric arrays can be
//! diverted into a blob store; the text then carries a small descriptor
//! object with the array's dtype, shape and position instead of the numbers.
//!
//! # Quick Start
//!
//! ```
//! use blobjson::{BlobCollection, Value};
//!
//! let blobs = BlobCollection::shared();
//! let weights: Vec<f64> = (0..1000).map(|i| i as f64).collect();
//!
//! let value = Value::encode_with_blobs(&weights, blobs.clone()).unwrap();
//! assert!(value.as_str().unwrap().starts_with("{\"dtype\":\"float64\""));
//!
//! let back: Vec<f64> = value.decode().unwrap();
//! assert_eq!(back, weights);
//! ```
//!
//! # Architecture
//!
//! The codec itself lives in `blobjson-core` and is re-exported here whole.
//! Disk-backed stores and value files come from `blobjson-durability`.

pub use blobjson_core::*;

pub use blobjson_durability::{
    load_value, save_value, write_collection, BlobCompression, BlobFileConfig, BlobFileReader,
    BlobWriter, CompressedBlobWriter, ConfigError, UncompressedBlobWriter, ValueFile,
    ValueFileError, ValueFileResult,
};
