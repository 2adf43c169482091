//! Numeric arrays through the descriptor path.

use crate::common::*;
use blobjson::{
    decode_bytes, load_value, save_value, BlobFileConfig, BlobStore, Complex64, DType, Value,
};
use std::collections::BTreeMap;

#[test]
fn test_large_array_leaves_text() {
    let (collection, store) = memory_store();
    let data: Vec<f64> = (0..1000).map(|i| i as f64 * 0.5).collect();
    assert_eq!(data[7], 3.5);

    let v = Value::encode_with_blobs(&data, store).unwrap();
    let text = v.as_str().unwrap();
    assert!(!text.contains("3.5"), "{}", text);
    assert_eq!(
        text,
        r#"{"dtype":"float64","shape":[1000],"offset":8,"byteLength":8000,"range":{"min":0,"max":499.5}}"#
    );
    assert_eq!(collection.part_count(), 1);
    assert_eq!(v.decode::<Vec<f64>>().unwrap(), data);
}

#[test]
fn test_descriptor_is_plain_json() {
    let (_, store) = memory_store();
    let mut m = BTreeMap::new();
    m.insert("ids".to_string(), vec![3u32, 1, 2]);
    m.insert("mask".to_string(), vec![1u32]);
    let v = Value::encode_with_blobs(&m, store).unwrap();

    let parsed = parse_json(v.as_bytes());
    assert_eq!(parsed["ids"]["dtype"], DType::Uint32.tag());
    assert_eq!(parsed["ids"]["shape"][0], 3);
    assert_eq!(parsed["ids"]["range"]["max"], 3);
    assert_eq!(parsed["mask"]["offset"], 8 + 16 + 8);
    assert_eq!(v.decode::<BTreeMap<String, Vec<u32>>>().unwrap(), m);
}

#[test]
fn test_every_element_type_round_trips() {
    let (collection, store) = memory_store();
    let v = Value::encode_with_blobs(
        &(
            (vec![1.5f32, -2.0], vec![true, false, true]),
            (
                (vec![u8::MAX, 0], vec![u16::MAX]),
                ((vec![i8::MIN], vec![i16::MIN, 7]), (vec![i64::MIN, i64::MAX], vec![u64::MAX])),
            ),
        ),
        store,
    )
    .unwrap();
    assert_eq!(collection.part_count(), 8);

    let back: (
        (Vec<f32>, Vec<bool>),
        ((Vec<u8>, Vec<u16>), ((Vec<i8>, Vec<i16>), (Vec<i64>, Vec<u64>))),
    ) = v.decode().unwrap();
    assert_eq!(back.0, (vec![1.5, -2.0], vec![true, false, true]));
    assert_eq!((back.1).0, (vec![u8::MAX, 0], vec![u16::MAX]));
    assert_eq!(((back.1).1).0, (vec![i8::MIN], vec![i16::MIN, 7]));
    assert_eq!(((back.1).1).1, (vec![i64::MIN, i64::MAX], vec![u64::MAX]));
}

#[test]
fn test_byte_length_mismatch_rejected() {
    let (_, store) = memory_store();
    let v = Value::encode_with_blobs(&vec![1.0f64, 2.0, 3.0], store.clone()).unwrap();
    let tampered = v.as_str().unwrap().replace("\"byteLength\":24", "\"byteLength\":16");
    assert_ne!(tampered, v.as_str().unwrap());

    let err = decode_bytes::<Vec<f64>>(tampered.as_bytes(), Some(store)).unwrap_err();
    assert_eq!(err.offset, 0);
    assert!(err.reason.contains("byteLength 16 does not match"), "{}", err);
}

#[test]
fn test_dtype_mismatch_rejected() {
    let (_, store) = memory_store();
    let v = Value::encode_with_blobs(&vec![1i32, 2], store).unwrap();
    let err = v.decode::<Vec<i64>>().unwrap_err();
    assert!(err.reason.contains("dtype int32 does not match int64"), "{}", err);
}

#[test]
fn test_range_outside_store_rejected() {
    let (_, store) = memory_store();
    let text = r#"{"dtype":"uint8","shape":[4],"offset":8,"byteLength":4}"#;
    let err = decode_bytes::<Vec<u8>>(text.as_bytes(), Some(store)).unwrap_err();
    assert!(err.reason.contains("outside the blob store"), "{}", err);
}

#[test]
fn test_descriptor_without_store_rejected() {
    let (_, store) = memory_store();
    let v = Value::encode_with_blobs(&vec![1u16, 2], store).unwrap();
    let err = decode_bytes::<Vec<u16>>(v.as_bytes(), None).unwrap_err();
    assert!(err.reason.contains("without a blob store"), "{}", err);
}

#[test]
fn test_nested_value_keeps_store() {
    let (_, store) = memory_store();
    let mut m = BTreeMap::new();
    m.insert("w".to_string(), vec![0.25f64; 64]);
    let v = Value::encode_with_blobs(&m, store.clone()).unwrap();

    let outer: BTreeMap<String, Value> = v.decode().unwrap();
    let inner = &outer["w"];
    assert!(inner.blobs().is_some());
    assert_eq!(inner.decode::<Vec<f64>>().unwrap(), vec![0.25; 64]);
    assert_eq!(store.bytes_reserved(), 8 + 64 * 8);
}

#[test]
fn test_complex_array_through_value_file() {
    let dir = temp_dir();
    let path = dir.path().join("spectrum.json");
    let config = BlobFileConfig::default();
    let spectrum: Vec<Complex64> = (0..256)
        .map(|i| Complex64::new(i as f64, -(i as f64) / 2.0))
        .collect();

    save_value(&path, &spectrum, &config).unwrap();
    let parsed = parse_json(&std::fs::read(&path).unwrap());
    assert_eq!(parsed["dtype"], DType::Complex64.tag());
    assert_eq!(parsed["byteLength"], 256 * 16);
    assert_eq!(parsed["range"]["min"], 0);
    assert_eq!(parsed["range"]["max"], 0);

    let back: Vec<Complex64> = load_value(&path, &config).unwrap();
    assert_eq!(back, spectrum);
}

#[cfg(feature = "ndarray")]
mod ndarray_values {
    use crate::common::*;
    use blobjson::{decode_bytes, load_value, save_value, BlobFileConfig};
    use ndarray::{Array1, Array2};
    use std::fs;

    #[test]
    fn test_array2_through_value_file() {
        let dir = temp_dir();
        let path = dir.path().join("matrix.json");
        let config = BlobFileConfig::default();
        let matrix = Array2::from_shape_fn((16, 8), |(r, c)| r as f32 * 10.0 + c as f32);

        save_value(&path, &matrix, &config).unwrap();
        let parsed = parse_json(&fs::read(&path).unwrap());
        assert_eq!(parsed["dtype"], "float32");
        assert_eq!(parsed["shape"][0], 16);
        assert_eq!(parsed["shape"][1], 8);
        assert_eq!(parsed["byteLength"], 16 * 8 * 4);

        let back: Array2<f32> = load_value(&path, &config).unwrap();
        assert_eq!(back, matrix);
    }

    #[test]
    fn test_packed_rows_through_value_file() {
        let dir = temp_dir();
        let path = dir.path().join("rows.json");
        let config = BlobFileConfig::for_testing();
        let rows: Vec<Array1<f64>> = (0..5)
            .map(|r| Array1::from_shape_fn(3, |c| (r * 3 + c) as f64 * 0.5))
            .collect();

        save_value(&path, &rows, &config).unwrap();
        let back: Vec<Array1<f64>> = load_value(&path, &config).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_zero_width_packed_rows_rejected() {
        let (_, store) = memory_store();
        let text = r#"{"dtype":"float64","shape":[1000000000000,0],"offset":0,"byteLength":0}"#;
        let err = decode_bytes::<Vec<Array1<f64>>>(text.as_bytes(), Some(store)).unwrap_err();
        assert_eq!(err.offset, 0);
        assert!(err.reason.contains("non-zero width"), "{}", err);
    }
}
