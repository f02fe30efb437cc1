use crate::{
    composite_key,
    key::CompositeKey,
    types::RecordId,
    value::Value,
};
use proptest::prelude::*;
use std::{cmp::Ordering, collections::HashSet};

#[test]
fn append_flattens_nested_composites() {
    let inner = composite_key![1, "a"];
    let mut key = composite_key![0];
    key.append(inner);
    key.append(Value::Null);

    assert_eq!(
        key.components(),
        &[
            Value::Integer(0),
            Value::Integer(1),
            Value::from("a"),
            Value::Null
        ]
    );
}

#[test]
fn equal_keys_hash_together() {
    let mut keys = HashSet::new();
    keys.insert(composite_key![12, "test"]);

    assert!(keys.contains(&composite_key![12, "test"]));
    assert!(!keys.contains(&composite_key![12, "test", 1]));
}

#[test]
fn prefix_comparison_ignores_length() {
    let short = composite_key![1, "a"];
    let long = composite_key![1, "a", 5];

    assert_eq!(short.compare_to(&long), Ordering::Equal);
    assert_eq!(long.compare_to(&short), Ordering::Equal);
    assert_ne!(short, long);
}

#[test]
fn first_differing_component_decides() {
    let a = composite_key![1, "b"];
    let b = composite_key![1, "c", 0];

    assert_eq!(a.compare_to(&b), Ordering::Less);
    assert_eq!(b.compare_to(&a), Ordering::Greater);
}

#[test]
fn null_component_sorts_first() {
    let with_null = composite_key![Value::Null, 5];
    let with_value = composite_key![0, 5];

    assert_eq!(with_null.compare_to(&with_value), Ordering::Less);
}

#[test]
fn display_lists_components() {
    let key = composite_key![RecordId::new(1, 2), "x", Value::Null];
    assert_eq!(key.to_string(), "[#1:2, x, null]");
}

#[test]
fn deserialized_keys_are_flat() {
    let nested = vec![Value::Integer(1), Value::Composite(composite_key![2, 3])];
    let encoded = serde_json::to_string(&nested).expect("encode");
    let key: CompositeKey = serde_json::from_str(&encoded).expect("decode");

    assert_eq!(key, composite_key![1, 2, 3]);
}

fn arb_component() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i32>().prop_map(Value::Integer),
        any::<i64>().prop_map(Value::Long),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn compare_to_is_antisymmetric(
        left in prop::collection::vec(arb_component(), 0..5),
        right in prop::collection::vec(arb_component(), 0..5),
    ) {
        let left = CompositeKey::from_values(left);
        let right = CompositeKey::from_values(right);

        prop_assert_eq!(left.compare_to(&right), right.compare_to(&left).reverse());
    }

    #[test]
    fn every_key_equals_its_prefixes(values in prop::collection::vec(arb_component(), 1..6)) {
        let full = CompositeKey::from_values(values.clone());
        for len in 0..values.len() {
            let prefix = CompositeKey::from_values(values[..len].to_vec());
            prop_assert_eq!(full.compare_to(&prefix), Ordering::Equal);
        }
    }
}
