//! String escaping round-trips for arbitrary byte content.

use blobjson::{decode_str, ByteString, Value};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_byte_strings_round_trip(raw in prop::collection::vec(any::<u8>(), 0..256)) {
        let s = ByteString(raw);
        let back: ByteString = Value::encode(&s).decode().unwrap();
        prop_assert_eq!(back, s);
    }

    #[test]
    fn prop_utf8_strings_round_trip(s in "\\PC*|[\\x00-\\x1f\"\\\\]*") {
        let back: String = Value::encode(&s).decode().unwrap();
        prop_assert_eq!(back, s);
    }
}

#[test]
fn test_control_bytes_are_escaped() {
    let v = Value::encode(&ByteString(b"a\0b\nc\"d\\e\x1f".to_vec()));
    assert_eq!(v.as_bytes(), br#""a\u0000b\nc\"d\\e\u001f""#);
}

#[test]
fn test_high_bytes_pass_through() {
    let raw = vec![b'x', 0x80, 0xff, 0xc3];
    let v = Value::encode(&ByteString(raw.clone()));
    assert_eq!(&v.as_bytes()[1..5], raw.as_slice());
    assert_eq!(v.decode::<ByteString>().unwrap(), ByteString(raw));
}

#[test]
fn test_escapes_from_other_writers() {
    let s: String = decode_str(r#""tab\thereA\x42\/""#).unwrap();
    assert_eq!(s, "tab\thereAB/");
}

#[test]
fn test_invalid_utf8_needs_byte_string() {
    let text = b"\"\xff\"";
    assert!(blobjson::decode_bytes::<String>(text, None).is_err());
    let raw: ByteString = blobjson::decode_bytes(text, None).unwrap();
    assert_eq!(raw.as_bytes(), &[0xff]);
}
