//! Map ordering and container shapes.

use crate::common::*;
use blobjson::{decode_str, Value};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

proptest! {
    #[test]
    fn prop_map_order_is_insertion_independent(
        entries in prop::collection::vec(("[a-z]{1,6}", any::<i32>()), 0..20)
    ) {
        let forward: HashMap<String, i32> = entries.iter().cloned().collect();
        let backward: HashMap<String, i32> = entries.iter().rev().cloned().collect();
        // duplicate keys resolve differently in each direction
        let forward_sorted: BTreeMap<String, i32> = forward.clone().into_iter().collect();
        let backward_sorted: BTreeMap<String, i32> = backward.clone().into_iter().collect();

        prop_assert_eq!(Value::encode(&forward), Value::encode(&forward_sorted));
        prop_assert_eq!(Value::encode(&backward), Value::encode(&backward_sorted));

        let parsed = parse_json(Value::encode(&forward).as_bytes());
        let keys: Vec<&String> = parsed.as_object().unwrap().keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }
}

#[test]
fn test_map_keys_sorted() {
    let mut m = HashMap::new();
    m.insert("zeta".to_string(), 1u8);
    m.insert("alpha".to_string(), 2);
    m.insert("mid".to_string(), 3);
    assert_eq!(
        Value::encode(&m).as_str(),
        Some(r#"{"alpha":2,"mid":3,"zeta":1}"#)
    );
}

#[test]
fn test_optional_values() {
    let mut m: BTreeMap<String, Option<Vec<u8>>> = BTreeMap::new();
    m.insert("a".to_string(), None);
    m.insert("b".to_string(), Some(vec![1, 2]));
    let v = Value::encode(&m);
    assert_eq!(v.as_str(), Some(r#"{"a":null,"b":[1,2]}"#));
    assert_eq!(v.decode::<BTreeMap<String, Option<Vec<u8>>>>().unwrap(), m);
}

#[test]
fn test_nested_containers_parse_as_json() {
    let nested: Vec<(String, BTreeMap<String, Vec<f64>>)> = vec![
        ("first".to_string(), [("x".to_string(), vec![0.25, -1.0])].into_iter().collect()),
        ("second".to_string(), BTreeMap::new()),
    ];
    let v = Value::encode(&nested);
    let parsed = parse_json(v.as_bytes());
    assert_eq!(parsed[0][0], "first");
    assert_eq!(parsed[0][1]["x"][0], 0.25);
    assert_eq!(v.decode::<Vec<(String, BTreeMap<String, Vec<f64>>)>>().unwrap(), nested);
}

#[test]
fn test_whitespace_and_trailing_comma_accepted() {
    let v: Vec<u16> = decode_str(" [ 1 ,\n 2 , 3 , ] ").unwrap();
    assert_eq!(v, vec![1, 2, 3]);
}

#[test]
fn test_unknown_struct_members_skipped() {
    let m: BTreeMap<String, blobjson::Complex64> =
        decode_str(r#"{"c":{"imag":2,"extra":[{"deep":[1,2]},"s"],"real":1}}"#).unwrap();
    assert_eq!(m["c"], blobjson::Complex64::new(1.0, 2.0));
}
