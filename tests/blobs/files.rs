//! File-backed stores and value files.

use crate::common::*;
use blobjson::{
    json_struct, load_value, save_value, write_collection, BlobCollection, BlobFileConfig,
    BlobFileReader, BlobStore, UncompressedBlobWriter, ValueFile, ValueFileError,
};
use std::fs;

#[derive(Debug, Default, PartialEq)]
struct Checkpoint {
    step: u64,
    name: String,
    weights: Vec<f32>,
    bias: Vec<f64>,
    tags: Vec<String>,
}

json_struct!(Checkpoint { step, name, weights, bias, tags });

fn checkpoint() -> Checkpoint {
    Checkpoint {
        step: 42,
        name: "layer \"one\"".to_string(),
        weights: (0..4096).map(|i| (i as f32).sin()).collect(),
        bias: vec![0.5; 17],
        tags: vec!["a".to_string(), String::new()],
    }
}

#[test]
fn test_collection_matches_file_writer() {
    let payloads = random_payloads(7, 40, 100);
    let collection = BlobCollection::new();
    let dir = temp_dir();
    let direct = dir.path().join("direct.blobs");
    let writer = UncompressedBlobWriter::create(&direct).unwrap();
    for p in &payloads {
        assert_eq!(collection.write_chunk(p).unwrap(), writer.write_chunk(p).unwrap());
    }
    writer.finish().unwrap();

    let saved = dir.path().join("nested/saved.blobs");
    write_collection(&collection, &saved).unwrap();
    assert_eq!(fs::read(&saved).unwrap(), fs::read(&direct).unwrap());
    assert_eq!(fs::read(&saved).unwrap(), collection.to_bytes());
}

#[test]
fn test_value_file_round_trip() {
    let dir = temp_dir();
    let path = dir.path().join("ckpt.json");
    let config = BlobFileConfig::default();

    save_value(&path, &checkpoint(), &config).unwrap();
    let text = fs::read(&path).unwrap();
    let parsed = parse_json(&text);
    assert_eq!(parsed["step"], 42);
    assert_eq!(parsed["weights"]["dtype"], "float32");
    assert_eq!(parsed["weights"]["byteLength"], 4096 * 4);

    let back: Checkpoint = load_value(&path, &config).unwrap();
    assert_eq!(back, checkpoint());
}

#[test]
fn test_compressed_value_file_round_trip() {
    let dir = temp_dir();
    let path = dir.path().join("ckpt.json");
    let config = BlobFileConfig::for_testing();

    let written = save_value(&path, &checkpoint(), &config).unwrap();
    assert_eq!(written, config.compressed_path(&path));
    let plain_blobs = config.blobs_path(&path);
    assert!(!plain_blobs.exists());
    assert!(config.compressed_path(&plain_blobs).exists());

    let back: Checkpoint = load_value(&path, &config).unwrap();
    assert_eq!(back, checkpoint());
}

#[test]
fn test_value_file_explicit_steps() {
    let dir = temp_dir();
    let path = dir.path().join("explicit");
    let config = BlobFileConfig::default();

    let file = ValueFile::create(&path, config.clone()).unwrap();
    let encoded = file.encode(&vec![1.0f64, 2.0]).unwrap();
    assert!(file.blobs().bytes_reserved() > 0);
    file.save(&encoded).unwrap();

    let loaded = ValueFile::load(&path, &config).unwrap();
    assert_eq!(loaded, encoded);
    assert_eq!(loaded.decode::<Vec<f64>>().unwrap(), vec![1.0, 2.0]);
}

#[test]
fn test_truncated_blob_file_rejected() {
    let dir = temp_dir();
    let path = dir.path().join("short.json");
    let config = BlobFileConfig::default();
    save_value(&path, &vec![9u64; 100], &config).unwrap();

    let blobs = config.blobs_path(&path);
    let data = fs::read(&blobs).unwrap();
    fs::write(&blobs, &data[..data.len() / 2]).unwrap();

    let result = load_value::<Vec<u64>>(&path, &config);
    assert!(matches!(result, Err(ValueFileError::Decode(_))));
}

#[test]
fn test_reader_serves_collection_bytes() {
    let collection = BlobCollection::new();
    let offset = collection.write_chunk(b"shared layout").unwrap();
    let reader = BlobFileReader::from_bytes(collection.to_bytes());
    let mut buf = [0u8; 13];
    reader.read_chunk(offset, &mut buf).unwrap();
    assert_eq!(&buf, b"shared layout");
}
