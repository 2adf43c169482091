//! Integration tests for the blob side channel.
//!
//! These tests cover the descriptor path end to end: arrays diverted into
//! memory and file stores, concurrent chunk writers, and value files that
//! persist text and blobs side by side.

#[path = "../common/mod.rs"]
mod common;

mod arrays;
mod concurrency;
mod files;
