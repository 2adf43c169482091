//! Size hints must cover what the writer actually appends.

use crate::common::*;
use blobjson::{json_struct, ByteString, Complex64};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, PartialEq)]
struct Record {
    id: u64,
    label: String,
    scores: Vec<f32>,
    parent: Option<Box<Record>>,
}

json_struct!(Record { id, label, scores, parent });

fn check<T: blobjson::JsonCodec>(value: &T) -> Result<(), TestCaseError> {
    let (hint, len) = hint_and_len(value, None);
    prop_assert!(len <= hint, "wrote {} bytes, hint was {}", len, hint);
    let (_, store) = memory_store();
    let (hint, len) = hint_and_len(value, Some(store));
    prop_assert!(len <= hint, "wrote {} bytes with blobs, hint was {}", len, hint);
    Ok(())
}

proptest! {
    #[test]
    fn prop_integers_fit_hint(a in any::<u8>(), b in any::<i16>(), c in any::<u32>(),
                              d in any::<i64>(), e in any::<u64>(), f in any::<usize>()) {
        check(&a)?;
        check(&b)?;
        check(&c)?;
        check(&d)?;
        check(&e)?;
        check(&f)?;
    }

    #[test]
    fn prop_floats_fit_hint(x in any::<f64>(), y in any::<f32>()) {
        check(&x)?;
        check(&y)?;
    }

    #[test]
    fn prop_strings_fit_hint(s in ".*", raw in prop::collection::vec(any::<u8>(), 0..64)) {
        check(&s)?;
        check(&ByteString(raw))?;
    }

    #[test]
    fn prop_numeric_vecs_fit_hint(
        doubles in prop::collection::vec(any::<f64>(), 0..100),
        ints in prop::collection::vec(any::<i32>(), 0..100),
        flags in prop::collection::vec(any::<bool>(), 0..20),
    ) {
        check(&doubles)?;
        check(&ints)?;
        check(&flags)?;
    }

    #[test]
    fn prop_containers_fit_hint(
        map in prop::collection::btree_map("[a-z\"\\\\]{0,8}", prop::collection::vec(any::<u16>(), 0..10), 0..8),
        pairs in prop::collection::vec((any::<i64>(), ".{0,6}"), 0..10),
        maybe in prop::option::of(prop::collection::vec(any::<i8>(), 0..10)),
    ) {
        let hashed: HashMap<String, Vec<u16>> = map.clone().into_iter().collect();
        check(&map)?;
        check(&hashed)?;
        check(&pairs)?;
        check(&maybe)?;
    }

    #[test]
    fn prop_structs_fit_hint(id in any::<u64>(), label in ".{0,12}",
                             scores in prop::collection::vec(any::<f32>(), 0..20),
                             re in any::<f64>(), im in any::<f64>()) {
        let record = Record {
            id,
            label: label.clone(),
            scores: scores.clone(),
            parent: Some(Box::new(Record { id: id / 2, label, scores, parent: None })),
        };
        check(&record)?;
        check(&Complex64::new(re, im))?;
        let by_name: BTreeMap<String, Complex64> =
            [("z".to_string(), Complex64::new(re, im))].into_iter().collect();
        check(&by_name)?;
    }
}
