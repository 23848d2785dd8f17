//! Structural comparison of original and round-tripped values.
//!
//! Equality here is about round-trip fidelity, not arithmetic, so it deliberately differs
//! from `PartialEq` on floats and nulls:
//!
//! - NaN equals NaN; each infinity equals only itself
//! - `0.0` and `-0.0` are different values
//! - null never equals a zero value (`0`, `""`, `false`, `[]`, `{}`)
//! - integers compare by value across signed, unsigned and big-integer representations,
//!   but an integer never equals a float
//! - mappings compare by key set, ignoring order
//!
//! ```rust
//! use serde_conformance::{compare, value, DiffKind, Value};
//!
//! assert!(compare::equal(&Value::from(f64::NAN), &Value::from(f64::NAN)));
//!
//! let diff = compare::diff(&value!({ "n": null }), &value!({ "n": 0 })).unwrap();
//! assert_eq!(diff.path, "$.n");
//! assert_eq!(diff.kind, DiffKind::NullCollapsed);
//! ```

use crate::{Number, Value};
use num_bigint::BigInt;
use std::fmt;

/// Category of the first mismatch found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffKind {
    ValueMismatch,
    TypeMismatch,
    LengthMismatch,
    MissingKey,
    UnexpectedKey,
    /// Null on one side, a zero value on the other.
    NullCollapsed,
}

impl DiffKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiffKind::ValueMismatch => "value mismatch",
            DiffKind::TypeMismatch => "type mismatch",
            DiffKind::LengthMismatch => "length mismatch",
            DiffKind::MissingKey => "missing key",
            DiffKind::UnexpectedKey => "unexpected key",
            DiffKind::NullCollapsed => "null collapsed",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first structural difference between two values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diff {
    /// Location of the mismatch, rooted at `$`.
    pub path: String,
    pub kind: DiffKind,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}: expected {}, found {}",
            self.kind, self.path, self.expected, self.actual
        )
    }
}

/// Returns `true` if `round_tripped` is structurally equal to `original`.
#[must_use]
pub fn equal(original: &Value, round_tripped: &Value) -> bool {
    diff(original, round_tripped).is_none()
}

/// Returns the first difference between `original` and `round_tripped`, in depth-first
/// order.
#[must_use]
pub fn diff(original: &Value, round_tripped: &Value) -> Option<Diff> {
    let mut path = String::from("$");
    walk(&mut path, original, round_tripped)
}

fn walk(path: &mut String, expected: &Value, actual: &Value) -> Option<Diff> {
    match (expected, actual) {
        (Value::Null, Value::Null) => None,
        (Value::Null, other) | (other, Value::Null) => {
            let kind = if other.is_zero_value() {
                DiffKind::NullCollapsed
            } else {
                DiffKind::TypeMismatch
            };
            Some(mismatch(path, kind, expected, actual))
        }
        (Value::Bool(a), Value::Bool(b)) => {
            (a != b).then(|| mismatch(path, DiffKind::ValueMismatch, expected, actual))
        }
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b)
            .map(|kind| mismatch(path, kind, expected, actual)),
        (Value::BigInt(a), Value::BigInt(b)) => {
            (a != b).then(|| mismatch(path, DiffKind::ValueMismatch, expected, actual))
        }
        (Value::BigInt(big), Value::Number(n)) | (Value::Number(n), Value::BigInt(big)) => {
            match n.as_i128() {
                Some(i) if BigInt::from(i) == *big => None,
                Some(_) => Some(mismatch(path, DiffKind::ValueMismatch, expected, actual)),
                None => Some(mismatch(path, DiffKind::TypeMismatch, expected, actual)),
            }
        }
        (Value::String(a), Value::String(b)) | (Value::Enum(a), Value::Enum(b)) => {
            (a != b).then(|| mismatch(path, DiffKind::ValueMismatch, expected, actual))
        }
        (Value::Date(a), Value::Date(b)) => {
            (a != b).then(|| mismatch(path, DiffKind::ValueMismatch, expected, actual))
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Some(Diff {
                    path: path.clone(),
                    kind: DiffKind::LengthMismatch,
                    expected: format!("{} elements", a.len()),
                    actual: format!("{} elements", b.len()),
                });
            }
            a.iter().zip(b).enumerate().find_map(|(i, (x, y))| {
                let mark = path.len();
                path.push_str(&format!("[{}]", i));
                let found = walk(path, x, y);
                path.truncate(mark);
                found
            })
        }
        (Value::Object(a), Value::Object(b)) => {
            for (key, x) in a.iter() {
                let mark = path.len();
                push_key(path, key);
                let found = match b.get(key) {
                    Some(y) => walk(path, x, y),
                    None => Some(Diff {
                        path: path.clone(),
                        kind: DiffKind::MissingKey,
                        expected: x.to_string(),
                        actual: "nothing".to_string(),
                    }),
                };
                path.truncate(mark);
                if found.is_some() {
                    return found;
                }
            }
            b.iter().find(|(key, _)| !a.contains_key(key)).map(|(key, y)| {
                push_key(path, key);
                Diff {
                    path: path.clone(),
                    kind: DiffKind::UnexpectedKey,
                    expected: "nothing".to_string(),
                    actual: y.to_string(),
                }
            })
        }
        _ => Some(Diff {
            path: path.clone(),
            kind: DiffKind::TypeMismatch,
            expected: format!("{} {}", expected.type_name(), expected),
            actual: format!("{} {}", actual.type_name(), actual),
        }),
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Option<DiffKind> {
    if let (Some(x), Some(y)) = (a.as_i128(), b.as_i128()) {
        return (x != y).then_some(DiffKind::ValueMismatch);
    }
    if a.is_integer() != b.is_integer() {
        return Some(DiffKind::TypeMismatch);
    }
    // Going through f64 also covers a NaN or infinity stored unnormalized in `Float`.
    let (x, y) = (a.as_f64(), b.as_f64());
    let same =
        (x.is_nan() && y.is_nan()) || (x == y && x.is_sign_negative() == y.is_sign_negative());
    (!same).then_some(DiffKind::ValueMismatch)
}

fn push_key(path: &mut String, key: &str) {
    let plain = !key.is_empty()
        && !key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        path.push('.');
        path.push_str(key);
    } else {
        path.push_str(&format!("[{:?}]", key));
    }
}

fn mismatch(path: &str, kind: DiffKind, expected: &Value, actual: &Value) -> Diff {
    Diff {
        path: path.to_string(),
        kind,
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
