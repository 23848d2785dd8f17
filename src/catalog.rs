//! The built-in battery of conformance cases.
//!
//! Case ids are grouped by prefix so a run can be narrowed with
//! [`RunOptions::with_filter`](crate::RunOptions::with_filter):
//!
//! | Prefix | Checks |
//! |--------|--------|
//! | `round_trip.` | structs, nesting, unicode, timestamps, big integers, mappings |
//! | `null.` | null stays null and zero stays zero |
//! | `boundary.` | integer and float extremes, non-finite floats, overflow |
//! | `empty.` | empty sequences, mappings and strings stay empty |
//! | `nesting.` | deeply nested sequences and structs |
//! | `enum.` | symbolic names on the wire, unknown names rejected |
//! | `missing_field.` / `unknown_field.` | field presence policies |
//! | `exception_priority.` | a malformed value followed by unconsumed input |
//!
//! Tampered cases rewrite the adapter's own output by plain byte substitution, so they
//! assume a text format that writes scalars literally.

use crate::{replace_first, value, ConformanceCase, ErrorKind, Field, IntType, Shape, Value};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::time::{Duration, UNIX_EPOCH};

const DEEP_SEQUENCE_LEVELS: usize = 64;
const DEEP_STRUCT_LEVELS: usize = 32;

/// Returns every built-in case, in registration order.
#[must_use]
pub fn standard_cases() -> Vec<ConformanceCase> {
    let mut cases = Vec::new();
    cases.extend(round_trip_cases());
    cases.extend(null_cases());
    cases.extend(boundary_cases());
    cases.extend(empty_cases());
    cases.extend(nesting_cases());
    cases.extend(enum_cases());
    cases.extend(field_policy_cases());
    cases.extend(exception_priority_cases());
    cases
}

fn round_trip_cases() -> Vec<ConformanceCase> {
    let customer = || {
        Shape::record(vec![
            Field::required("id", Shape::Int(IntType::U32)),
            Field::required("name", Shape::String),
            Field::required("active", Shape::Bool),
            Field::required("tags", Shape::seq(Shape::String)),
        ])
    };
    let order = Shape::record(vec![
        Field::required("order_id", Shape::U64),
        Field::required("customer", customer()),
        Field::required(
            "items",
            Shape::seq(Shape::record(vec![
                Field::required("sku", Shape::String),
                Field::required("price", Shape::Float),
                Field::required("quantity", Shape::Int(IntType::U32)),
            ])),
        ),
        Field::required("total", Shape::Float),
    ]);

    vec![
        ConformanceCase::round_trip("round_trip.flat_struct", customer(), || {
            value!({
                "id": 123,
                "name": "Alice",
                "active": true,
                "tags": ["admin", "developer"]
            })
        }),
        ConformanceCase::round_trip("round_trip.nested_struct", order, || {
            value!({
                "order_id": 12345,
                "customer": {
                    "id": 123,
                    "name": "Alice",
                    "active": true,
                    "tags": ["vip"]
                },
                "items": [
                    { "sku": "WIDGET-001", "price": 29.99, "quantity": 2 },
                    { "sku": "GADGET-002", "price": 49.99, "quantity": 1 }
                ],
                "total": 109.97
            })
        }),
        ConformanceCase::round_trip("round_trip.unicode_string", Shape::seq(Shape::String), || {
            value!([
                "héllo wörld",
                "👋 ✓ 日本語",
                "quote \" backslash \\ slash /",
                "line\nbreak\ttab\r",
                "\u{0}\u{1f}"
            ])
        })
        .with_description("escapes and non-ASCII text survive"),
        ConformanceCase::round_trip("round_trip.timestamp", Shape::Timestamp, || {
            let at = UNIX_EPOCH + Duration::new(1_705_314_600, 250_000_000);
            Value::Date(DateTime::<Utc>::from(at))
        }),
        ConformanceCase::round_trip("round_trip.bigint", Shape::BigInt, || {
            Value::BigInt(-(BigInt::from(u64::MAX) * BigInt::from(1_000_000_007u64)))
        })
        .with_description("integers wider than 64 bits"),
        ConformanceCase::round_trip("round_trip.mapping", Shape::map(Shape::I64), || {
            value!({ "one": 1, "two": 2, "with space": 3 })
        }),
    ]
}

fn null_cases() -> Vec<ConformanceCase> {
    let counter = || Shape::record(vec![Field::required("count", Shape::nullable(Shape::I64))]);

    vec![
        ConformanceCase::null_distinction("null.optional_absent", counter(), || {
            value!({ "count": null })
        }),
        ConformanceCase::round_trip("null.optional_zero", counter(), || value!({ "count": 0 }))
            .with_description("zero must not turn into null"),
        ConformanceCase::null_distinction(
            "null.optional_vs_empty_string",
            Shape::record(vec![
                Field::required("note", Shape::nullable(Shape::String)),
                Field::required("label", Shape::nullable(Shape::String)),
            ]),
            || value!({ "note": null, "label": "" }),
        ),
        ConformanceCase::null_distinction(
            "null.sequence_elements",
            Shape::seq(Shape::nullable(Shape::I64)),
            || value!([1, null, 0, null]),
        ),
    ]
}

fn boundary_cases() -> Vec<ConformanceCase> {
    vec![
        ConformanceCase::round_trip("boundary.i64_min", Shape::I64, || Value::from(i64::MIN)),
        ConformanceCase::round_trip("boundary.i64_max", Shape::I64, || Value::from(i64::MAX)),
        ConformanceCase::round_trip("boundary.u64_max", Shape::U64, || Value::from(u64::MAX)),
        ConformanceCase::round_trip(
            "boundary.i32_extremes",
            Shape::seq(Shape::Int(IntType::I32)),
            || Value::Array(vec![Value::from(i32::MIN), Value::from(i32::MAX)]),
        ),
        ConformanceCase::round_trip("boundary.f64_extremes", Shape::seq(Shape::Float), || {
            Value::Array(
                [f64::MAX, f64::MIN, f64::MIN_POSITIVE, f64::EPSILON, -0.0]
                    .into_iter()
                    .map(Value::from)
                    .collect(),
            )
        }),
        ConformanceCase::round_trip("boundary.f64_nan", Shape::Float, || Value::from(f64::NAN)),
        ConformanceCase::round_trip("boundary.f64_infinity", Shape::Float, || {
            Value::from(f64::INFINITY)
        }),
        ConformanceCase::round_trip("boundary.f64_neg_infinity", Shape::Float, || {
            Value::from(f64::NEG_INFINITY)
        }),
        ConformanceCase::must_fail(
            "boundary.u8_overflow",
            Shape::record(vec![Field::required("level", Shape::Int(IntType::U8))]),
            ErrorKind::OutOfRange,
            || value!({ "level": 255 }),
        )
        .with_tampered_input(|bytes| replace_first(bytes, b"255", b"256"))
        .with_description("a value one past u8::MAX is rejected, not wrapped"),
    ]
}

fn empty_cases() -> Vec<ConformanceCase> {
    vec![
        ConformanceCase::round_trip("empty.sequence", Shape::seq(Shape::I64), || value!([])),
        ConformanceCase::round_trip("empty.mapping", Shape::map(Shape::String), || value!({})),
        ConformanceCase::round_trip("empty.string", Shape::String, || value!("")),
        ConformanceCase::round_trip(
            "empty.nested",
            Shape::record(vec![
                Field::required("items", Shape::seq(Shape::String)),
                Field::required("attributes", Shape::map(Shape::String)),
            ]),
            || value!({ "items": [], "attributes": {} }),
        ),
    ]
}

fn nesting_cases() -> Vec<ConformanceCase> {
    let mut seq_shape = Shape::I64;
    for _ in 0..DEEP_SEQUENCE_LEVELS {
        seq_shape = Shape::seq(seq_shape);
    }

    let mut struct_shape = Shape::record(vec![Field::required("leaf", Shape::Bool)]);
    for _ in 0..DEEP_STRUCT_LEVELS {
        struct_shape = Shape::record(vec![Field::required("child", struct_shape)]);
    }

    vec![
        ConformanceCase::round_trip("nesting.deep_sequence", seq_shape, || {
            let mut value = Value::from(1);
            for _ in 0..DEEP_SEQUENCE_LEVELS {
                value = Value::Array(vec![value]);
            }
            value
        }),
        ConformanceCase::round_trip("nesting.deep_struct", struct_shape, || {
            let mut value = value!({ "leaf": true });
            for _ in 0..DEEP_STRUCT_LEVELS {
                let mut parent = crate::ValueMap::new();
                parent.insert("child".to_string(), value);
                value = Value::Object(parent);
            }
            value
        }),
    ]
}

fn enum_cases() -> Vec<ConformanceCase> {
    let palette = || {
        Shape::record(vec![Field::required(
            "color",
            Shape::enumeration(&["Red", "Green", "Blue"]),
        )])
    };
    let green = || value!({ "color": (Value::Enum("Green".to_string())) });

    vec![
        ConformanceCase::round_trip("enum.symbolic_name", palette(), green).with_raw_check(
            "variant written by name",
            |bytes| crate::contains_bytes(bytes, b"Green"),
        ),
        ConformanceCase::must_fail(
            "enum.unknown_name",
            palette(),
            ErrorKind::UnknownVariant,
            green,
        )
        .with_tampered_input(|bytes| replace_first(bytes, b"Green", b"Purple"))
        .with_description("an unknown name is an error, never a default"),
    ]
}

fn field_policy_cases() -> Vec<ConformanceCase> {
    vec![
        ConformanceCase::must_fail(
            "missing_field.required",
            Shape::record(vec![
                Field::required("id", Shape::I64),
                Field::required("name", Shape::String),
            ]),
            ErrorKind::MissingField,
            || value!({ "id": 1 }),
        ),
        ConformanceCase::round_trip(
            "missing_field.defaulted",
            Shape::record(vec![
                Field::required("id", Shape::I64),
                Field::with_default("name", Shape::String, value!("anonymous")),
            ]),
            || value!({ "id": 1 }),
        )
        .with_expected(|| value!({ "id": 1, "name": "anonymous" })),
        ConformanceCase::must_fail(
            "unknown_field.strict",
            Shape::strict_record(vec![Field::required("id", Shape::I64)]),
            ErrorKind::UnknownField,
            || value!({ "id": 1, "extra": true }),
        ),
    ]
}

fn exception_priority_cases() -> Vec<ConformanceCase> {
    vec![ConformanceCase::must_fail(
        "exception_priority.malformed_boolean",
        Shape::record(vec![Field::required("flag", Shape::Bool)]),
        ErrorKind::Syntax,
        || value!({ "flag": true }),
    )
    .with_tampered_input(|bytes| {
        let mut bytes = replace_first(bytes, b"true", b"notaboolean");
        bytes.extend_from_slice(b" trailing");
        bytes
    })
    .with_description(
        "the boolean parse failure is reported even though unconsumed input also fails dispose",
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Expectation;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique() {
        let cases = standard_cases();
        let ids: HashSet<_> = cases.iter().map(ConformanceCase::id).collect();
        assert_eq!(ids.len(), cases.len());
    }

    #[test]
    fn test_null_cases_contain_nulls() {
        for case in standard_cases() {
            if *case.expectation() == Expectation::MustPreserveNullDistinction {
                assert!(case.original().contains_null(), "{}", case.id());
            }
        }
    }

    #[test]
    fn test_every_group_present() {
        let cases = standard_cases();
        for prefix in [
            "round_trip.",
            "null.",
            "boundary.",
            "empty.",
            "nesting.",
            "enum.",
            "missing_field.",
            "unknown_field.",
            "exception_priority.",
        ] {
            assert!(
                cases.iter().any(|c| c.id().starts_with(prefix)),
                "no case with prefix {}",
                prefix
            );
        }
    }

    #[test]
    fn test_deep_sequence_depth() {
        let case = standard_cases()
            .into_iter()
            .find(|c| c.id() == "nesting.deep_sequence")
            .unwrap();
        let mut depth = 0;
        let mut current = case.original();
        while let Value::Array(mut items) = current {
            depth += 1;
            current = items.pop().unwrap();
        }
        assert_eq!(depth, DEEP_SEQUENCE_LEVELS);
    }
}
