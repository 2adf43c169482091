//! Core codec for blobjson
//!
//! This crate holds everything that does not touch disk:
//! - Value: encoded text plus an optional shared blob store
//! - JsonCodec: per-type size hint, writer and reader
//! - EncodeContext / DecodeContext: cursors, blob handles, failure state
//! - Lexer: the one tokenizer shared by readers and the skip path
//! - BlobStore: the append-only binary side channel, with the in-memory
//!   BlobCollection
//! - NdArrayDescriptor: the object written in place of a blob-backed array
//! - Error types: DecodeError, BlobError, Error
//!
//! File-backed blob stores live in `blobjson-durability`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blob;
pub mod codec;
pub mod decode;
pub mod descriptor;
pub mod dtype;
pub mod encode;
pub mod error;
pub mod format;
pub mod lexer;
pub mod linalg;
pub mod value;

pub use blob::{BlobCollection, BlobStore, SharedBlobStore};
pub use codec::{ByteString, JsonCodec};
pub use decode::{decode_bytes, decode_str, DecodeContext, DecodeResult, Failed};
pub use descriptor::{NdArrayDescriptor, NumericRange};
pub use dtype::{DType, Element};
pub use encode::{encode, encode_with, encode_with_blobs, EncodeContext, EncodeOptions};
pub use error::{BlobError, DecodeError, Error, Result};
pub use lexer::{Lexer, MAX_NESTING_DEPTH};
pub use linalg::Complex64;
pub use value::Value;
