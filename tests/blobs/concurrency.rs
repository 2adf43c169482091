//! Concurrent chunk writers.

use crate::common::*;
use blobjson::blob::chunk_record_len;
use blobjson::{
    BlobCollection, BlobFileConfig, BlobFileReader, BlobStore, CompressedBlobWriter,
    UncompressedBlobWriter,
};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

/// Write `payloads` from `THREADS` threads at once; returns (offset, payload).
fn write_concurrently(store: Arc<dyn BlobStore>, seed: u64) -> Vec<(u64, Vec<u8>)> {
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let payloads = random_payloads(seed + t as u64, PER_THREAD, 300);
                barrier.wait();
                payloads
                    .into_iter()
                    .map(|p| (store.write_chunk(&p).unwrap(), p))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect()
}

/// Record ranges must tile without overlap and cover exactly what was reserved.
fn assert_disjoint(written: &[(u64, Vec<u8>)], reserved: u64) {
    let mut ranges: Vec<(u64, u64)> = written
        .iter()
        .filter(|(_, p)| !p.is_empty())
        .map(|(offset, p)| (offset - 8, offset - 8 + chunk_record_len(p.len() as u64)))
        .collect();
    ranges.sort();
    for pair in ranges.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "overlap: {:?} and {:?}", pair[0], pair[1]);
    }
    let total: u64 = ranges.iter().map(|(s, e)| e - s).sum();
    assert_eq!(total, reserved);
    assert!(written.iter().filter(|(_, p)| p.is_empty()).all(|(o, _)| *o == 0));
}

fn assert_read_back(store: &dyn BlobStore, written: &[(u64, Vec<u8>)]) {
    for (offset, payload) in written {
        let mut buf = vec![0u8; payload.len()];
        store.read_chunk(*offset, &mut buf).unwrap();
        assert_eq!(&buf, payload);
    }
}

#[test]
fn test_concurrent_file_writes_are_disjoint() {
    let dir = temp_dir();
    let path = dir.path().join("concurrent.blobs");
    let writer = Arc::new(UncompressedBlobWriter::create(&path).unwrap());

    let written = write_concurrently(writer.clone(), 100);
    let reserved = writer.finish().unwrap();
    assert_disjoint(&written, reserved);

    let reader = BlobFileReader::open(&path, &BlobFileConfig::default()).unwrap();
    assert_eq!(reader.len() as u64, reserved);
    assert_read_back(&reader, &written);
}

#[test]
fn test_concurrent_memory_writes_are_disjoint() {
    let collection = BlobCollection::shared();
    let written = write_concurrently(collection.clone(), 200);
    assert_disjoint(&written, collection.bytes_reserved());
    assert_eq!(
        collection.part_count(),
        written.iter().filter(|(_, p)| !p.is_empty()).count()
    );
    assert_read_back(collection.as_ref(), &written);
}

#[test]
fn test_concurrent_compressed_writes_are_serialized() {
    let dir = temp_dir();
    let config = BlobFileConfig::for_testing();
    let path = dir.path().join("serial.blobs");
    let writer = Arc::new(CompressedBlobWriter::create(config.compressed_path(&path), 1).unwrap());

    let written = write_concurrently(writer.clone(), 300);
    let reserved = writer.finish().unwrap();
    assert_disjoint(&written, reserved);

    let reader = BlobFileReader::open(&path, &config).unwrap();
    assert_read_back(&reader, &written);
}
