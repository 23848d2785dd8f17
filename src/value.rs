//! Dynamic, format-neutral representation of the values cases generate.
//!
//! Every conformance case produces a [`Value`]; adapters serialize it and hand back a
//! [`Value`] decoded under the case's declared [`Shape`](crate::Shape). Keeping both
//! sides in one model lets the comparator work without knowing any format.
//!
//! ## Numbers
//!
//! [`Number`] separates signed, unsigned and floating representations so boundary cases
//! (`i64::MIN`, `u64::MAX`) survive without loss, and gives the non-finite floats their
//! own variants. Constructing a number from an `f64` normalizes NaN and the infinities:
//!
//! ```rust
//! use serde_conformance::{Number, Value};
//!
//! assert_eq!(Number::from(f64::NAN), Number::NaN);
//! assert_eq!(Value::from(f64::NEG_INFINITY), Value::Number(Number::NegativeInfinity));
//! assert_eq!(Value::from(1.5), Value::Number(Number::Float(1.5)));
//! ```

use crate::ValueMap;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Any value a conformance case can produce or an adapter can decode.
///
/// # Examples
///
/// ```rust
/// use serde_conformance::{value, Value};
///
/// let user = value!({
///     "id": 7,
///     "nickname": null,
///     "tags": ["a", "b"]
/// });
///
/// assert!(user.is_object());
/// assert!(user.contains_null());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(ValueMap),
    /// A unit enum variant, carried by its symbolic name.
    Enum(String),
    Date(DateTime<Utc>),
    BigInt(BigInt),
}

/// A numeric value with explicit non-finite variants.
///
/// `Float` never holds NaN or an infinity when built through `From<f64>`.
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Infinity,
    NegativeInfinity,
    NaN,
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::Unsigned(_))
    }

    /// Returns `true` for NaN and the infinities.
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self,
            Number::Infinity | Number::NegativeInfinity | Number::NaN
        )
    }

    /// Returns the value as an `i128` if it is an integer.
    ///
    /// Both integer representations fit, so signed and unsigned values can be compared
    /// without loss.
    #[inline]
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Number::Integer(i) => Some(i128::from(*i)),
            Number::Unsigned(u) => Some(i128::from(*u)),
            _ => None,
        }
    }

    /// Converts this number to an `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Unsigned(u) => *u as f64,
            Number::Float(f) => *f,
            Number::Infinity => f64::INFINITY,
            Number::NegativeInfinity => f64::NEG_INFINITY,
            Number::NaN => f64::NAN,
        }
    }

    /// Returns `true` if the number is zero in its own representation.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => *i == 0,
            Number::Unsigned(u) => *u == 0,
            Number::Float(f) => *f == 0.0,
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Unsigned(u) => write!(f, "{}", u),
            Number::Float(fl) => write!(f, "{:?}", fl),
            Number::Infinity => write!(f, "Infinity"),
            Number::NegativeInfinity => write!(f, "-Infinity"),
            Number::NaN => write!(f, "NaN"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::Unsigned(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Number::NaN
        } else if value == f64::INFINITY {
            Number::Infinity
        } else if value == f64::NEG_INFINITY {
            Number::NegativeInfinity
        } else {
            Number::Float(value)
        }
    }
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short name of the value's semantic type, used in diffs.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(Number::Integer(_)) | Value::Number(Number::Unsigned(_)) => "integer",
            Value::Number(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "sequence",
            Value::Object(_) => "mapping",
            Value::Enum(_) => "enum",
            Value::Date(_) => "timestamp",
            Value::BigInt(_) => "bigint",
        }
    }

    /// Returns `true` for the zero value of a type: `false`, `0`, `0.0`, `""`, and empty
    /// sequences or mappings. `Null` is not a zero value.
    #[must_use]
    pub fn is_zero_value(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::Number(n) => n.is_zero(),
            Value::String(s) => s.is_empty(),
            Value::Array(arr) => arr.is_empty(),
            Value::Object(obj) => obj.is_empty(),
            Value::BigInt(bi) => bi == &BigInt::from(0),
            _ => false,
        }
    }

    /// Returns `true` if this value or any nested value is `Null`.
    #[must_use]
    pub fn contains_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Array(arr) => arr.iter().any(Value::contains_null),
            Value::Object(obj) => obj.values().any(Value::contains_null),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(arr) => {
                write!(
                    f,
                    "[{}]",
                    arr.iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Object(obj) => {
                write!(
                    f,
                    "{{{}}}",
                    obj.iter()
                        .map(|(k, v)| format!("{:?}: {}", k, v))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Enum(name) => write!(f, "{}", name),
            Value::Date(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::BigInt(bi) => write!(f, "{}", bi),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Unsigned(u)) => serializer.serialize_u64(*u),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::Number(Number::Infinity) => serializer.serialize_f64(f64::INFINITY),
            Value::Number(Number::NegativeInfinity) => serializer.serialize_f64(f64::NEG_INFINITY),
            Value::Number(Number::NaN) => serializer.serialize_f64(f64::NAN),
            Value::String(s) | Value::Enum(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Object(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Date(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Value::BigInt(bi) => serializer.serialize_str(&bi.to_string()),
        }
    }
}

/// Untyped decoding, used for [`Shape::Any`](crate::Shape::Any).
///
/// Strings stay strings here; enums, timestamps and big integers are only recovered when
/// a shape asks for them.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                if let Ok(signed) = i64::try_from(value) {
                    Ok(Value::Number(Number::Integer(signed)))
                } else {
                    Ok(Value::Number(Number::Unsigned(value)))
                }
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = ValueMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Integer(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(Number::Unsigned(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(Number::from(f64::from(value)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Object(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
