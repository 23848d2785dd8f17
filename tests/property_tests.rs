//! Property-based tests for the comparator and the JSON reference adapter.
//!
//! Generated values stay within what JSON can carry untyped (no enums, timestamps or
//! big integers) so a decode under `Shape::Any` is expected to reproduce them exactly.

#![cfg(feature = "json")]

use proptest::prelude::*;
use serde_conformance::{
    diff, equal, run_case, ConformanceCase, FormatAdapter, JsonAdapter, Number, Shape,
    Value, ValueMap,
};

fn finite_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::String),
    ]
}

fn finite_value() -> impl Strategy<Value = Value> {
    finite_scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z_]{1,8}", inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<ValueMap>())),
        ]
    })
}

fn any_value() -> impl Strategy<Value = Value> {
    let special = prop_oneof![
        Just(Value::Number(Number::NaN)),
        Just(Value::Number(Number::Infinity)),
        Just(Value::Number(Number::NegativeInfinity)),
        Just(Value::Enum("Green".to_string())),
    ];
    prop_oneof![4 => finite_value(), 1 => special]
}

fn json_round_trip(value: &Value) -> Value {
    let adapter = JsonAdapter::new();
    let bytes = adapter.serialize(value).unwrap();
    let mut decoder = adapter.decoder(&bytes);
    let decoded = decoder.deserialize(&Shape::Any).unwrap();
    decoder.dispose().unwrap();
    decoded
}

proptest! {
    #[test]
    fn prop_equal_is_reflexive(v in any_value()) {
        prop_assert!(equal(&v, &v));
        prop_assert!(diff(&v, &v).is_none());
    }

    #[test]
    fn prop_equal_is_symmetric(a in any_value(), b in any_value()) {
        prop_assert_eq!(equal(&a, &b), equal(&b, &a));
    }

    #[test]
    fn prop_equal_agrees_with_diff(a in any_value(), b in any_value()) {
        prop_assert_eq!(equal(&a, &b), diff(&a, &b).is_none());
    }

    #[test]
    fn prop_nan_self_equal(bits in any::<u64>()) {
        // Every NaN payload normalizes to the same value.
        let f = f64::from_bits(bits | 0x7ff8_0000_0000_0000);
        prop_assert!(f.is_nan());
        prop_assert!(equal(&Value::from(f), &Value::Number(Number::NaN)));
    }

    #[test]
    fn prop_null_never_equals_zero(v in finite_value()) {
        if v.is_zero_value() {
            prop_assert!(!equal(&Value::Null, &v));
            prop_assert!(!equal(&v, &Value::Null));
        }
    }

    #[test]
    fn prop_json_round_trip_untyped(v in finite_value()) {
        let back = json_round_trip(&v);
        prop_assert!(equal(&v, &back), "{} came back as {}", v, back);
    }

    #[test]
    fn prop_json_round_trip_typed_case(items in prop::collection::vec(any::<i64>(), 0..16)) {
        let case = ConformanceCase::round_trip("ints", Shape::seq(Shape::I64), move || {
            Value::Array(items.iter().copied().map(Value::from).collect())
        });
        let result = run_case(&case, &JsonAdapter::new());
        prop_assert!(result.outcome().is_pass(), "{:?}", result.outcome());
    }
}

#[test]
fn test_zero_values_are_distinct_from_null() {
    let zeros = [
        Value::from(0),
        Value::from(0.0),
        Value::from(""),
        Value::Bool(false),
        Value::Array(vec![]),
        Value::Object(ValueMap::new()),
    ];
    for zero in &zeros {
        assert!(zero.is_zero_value(), "{}", zero);
        assert!(!equal(&Value::Null, zero), "{}", zero);
    }
}
