//! Literal text for well-known inputs and decode failure reporting.

use crate::common::*;
use blobjson::{decode_str, Value};

#[test]
fn test_doubles_with_nan() {
    let v = Value::encode(&vec![0.0, 1.0, 3.5, f64::NAN]);
    assert_eq!(v.as_str(), Some("[0,1,3.5,null]"));

    let back: Vec<f64> = v.decode().unwrap();
    assert_eq!(&back[..3], &[0.0, 1.0, 3.5]);
    assert!(back[3].is_nan());
}

#[test]
fn test_infinity_becomes_sentinel() {
    let v = Value::encode(&vec![f64::INFINITY, f64::NEG_INFINITY]);
    assert_eq!(v.as_str(), Some("[1e308,-1e308]"));
    let back: Vec<f64> = v.decode().unwrap();
    assert_eq!(back, vec![1e308, -1e308]);
}

#[test]
fn test_float_layout() {
    assert_eq!(Value::encode(&0.1f64).as_str(), Some("0.10000000000000001"));
    assert_eq!(Value::encode(&0.5f32).as_str(), Some("0.5"));
    assert_eq!(Value::encode(&1e-7f64).as_str(), Some("9.9999999999999995e-08"));
    assert_eq!(Value::encode(&-0.0f64).as_str(), Some("0"));
}

#[test]
fn test_output_is_plain_json() {
    let v = Value::encode(&vec![(u64::MAX, "a\u{1}".to_string()), (0, String::new())]);
    let parsed = parse_json(v.as_bytes());
    assert_eq!(parsed[0][0], u64::MAX);
    assert_eq!(parsed[0][1], "a\u{1}");
}

#[test]
fn test_out_of_range_integer_reported_at_token() {
    let err = decode_str::<Vec<u8>>("[1,300]").unwrap_err();
    assert_eq!(err.offset, 3);
    assert!(err.reason.contains("300 is not a valid u8"), "{}", err);
}

#[test]
fn test_trailing_text_rejected() {
    let err = decode_str::<u32>("7 8").unwrap_err();
    assert_eq!(err.offset, 2);
    assert!(err.reason.contains("trailing text"));
}

#[test]
fn test_bad_element_reported_at_its_start() {
    let err = decode_str::<Vec<bool>>("[true,maybe,nope").unwrap_err();
    assert_eq!(err.offset, 6);
}

#[test]
fn test_value_passthrough_preserves_text() {
    let raw: Vec<Value> = decode_str(r#"[{"a": [1, 2]}, "s", null]"#).unwrap();
    assert_eq!(raw[0].as_str(), Some(r#"{"a": [1, 2]}"#));
    assert!(raw[2].is_null());
    assert_eq!(Value::encode(&raw).as_str(), Some(r#"[{"a": [1, 2]},"s",null]"#));
}
