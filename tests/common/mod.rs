//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use blobjson::{BlobCollection, EncodeContext, JsonCodec, SharedBlobStore};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Encoding helpers
// ============================================================================

/// Encode `value` into a fresh context and return (size hint, bytes written).
pub fn hint_and_len<T: JsonCodec>(value: &T, blobs: Option<SharedBlobStore>) -> (usize, usize) {
    let mut ctx = match blobs {
        Some(b) => EncodeContext::with_blobs(b),
        None => EncodeContext::new(),
    };
    let hint = value.size_hint(&ctx);
    value.write_json(&mut ctx);
    (hint, ctx.len())
}

/// Fresh in-memory blob store, both as its concrete type and as a shared handle.
pub fn memory_store() -> (Arc<BlobCollection>, SharedBlobStore) {
    let collection = BlobCollection::shared();
    let shared: SharedBlobStore = collection.clone();
    (collection, shared)
}

/// Parse encoded text with serde_json; panics with the text on failure.
pub fn parse_json(text: &[u8]) -> serde_json::Value {
    serde_json::from_slice(text).unwrap_or_else(|e| {
        panic!("not valid JSON ({}): {}", e, String::from_utf8_lossy(text))
    })
}

// ============================================================================
// Files and payloads
// ============================================================================

/// Temporary directory that lives as long as the returned guard.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

/// Deterministic pseudo-random payloads of lengths in `0..max_len`.
pub fn random_payloads(seed: u64, count: usize, max_len: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(0..max_len);
            (0..len).map(|_| rng.gen::<u8>()).collect()
        })
        .collect()
}
