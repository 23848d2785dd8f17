//! Declared semantic types that guide deserialization.
//!
//! An adapter is asked to decode bytes *as* a particular type, the way
//! `serde_json::from_slice::<T>` decodes as `T`. Cases are built at runtime, so the type
//! is described by a [`Shape`] value and decoding goes through [`ShapeSeed`], a
//! [`DeserializeSeed`] that works with any self-describing Serde format.
//!
//! Shapes are strict where conformance matters:
//!
//! - enums accept only their declared symbolic names, never numeric discriminants
//! - integers are range-checked against their declared width
//! - struct fields are required unless the case supplies a default
//!
//! ```rust
//! use serde::de::DeserializeSeed;
//! use serde_conformance::{Field, Shape, ShapeSeed, Value};
//!
//! let shape = Shape::record(vec![
//!     Field::required("id", Shape::I64),
//!     Field::with_default("label", Shape::String, Value::from("none")),
//! ]);
//!
//! let mut de = serde_json::Deserializer::from_str(r#"{"id": 3}"#);
//! let value = ShapeSeed::new(&shape).deserialize(&mut de).unwrap();
//! let obj = value.as_object().unwrap();
//! assert_eq!(obj.get("label").and_then(Value::as_str), Some("none"));
//! ```

use crate::{Number, Value, ValueMap};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, Unexpected, Visitor};
use std::fmt;

/// Integer widths a shape can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntType {
    /// Inclusive bounds of this width.
    #[must_use]
    pub fn bounds(&self) -> (i128, i128) {
        match self {
            IntType::I8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
            IntType::I16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
            IntType::I32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            IntType::I64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            IntType::U8 => (0, i128::from(u8::MAX)),
            IntType::U16 => (0, i128::from(u16::MAX)),
            IntType::U32 => (0, i128::from(u32::MAX)),
            IntType::U64 => (0, i128::from(u64::MAX)),
        }
    }

    #[must_use]
    pub const fn is_unsigned(&self) -> bool {
        matches!(
            self,
            IntType::U8 | IntType::U16 | IntType::U32 | IntType::U64
        )
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IntType::I8 => "i8",
            IntType::I16 => "i16",
            IntType::I32 => "i32",
            IntType::I64 => "i64",
            IntType::U8 => "u8",
            IntType::U16 => "u16",
            IntType::U32 => "u32",
            IntType::U64 => "u64",
        }
    }

    fn check<E: de::Error>(self, value: i128) -> Result<Value, E> {
        let (min, max) = self.bounds();
        if value < min || value > max {
            return Err(E::custom(format_args!(
                "out of range: integer {} does not fit {}",
                value,
                self.as_str()
            )));
        }
        Ok(match i64::try_from(value) {
            Ok(signed) => Value::Number(Number::Integer(signed)),
            // Only u64 values above i64::MAX land here; the bounds check guarantees it.
            Err(_) => Value::Number(Number::Unsigned(value as u64)),
        })
    }
}

/// One field of a [`Shape::Struct`].
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
    /// Value filled in when the field is absent. `None` makes the field required.
    pub default: Option<Value>,
}

impl Field {
    pub fn required(name: impl Into<String>, shape: Shape) -> Self {
        Field {
            name: name.into(),
            shape,
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, shape: Shape, default: Value) -> Self {
        Field {
            name: name.into(),
            shape,
            default: Some(default),
        }
    }
}

/// A declared semantic type.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Whatever the format reports, decoded untyped.
    Any,
    Bool,
    Int(IntType),
    Float,
    String,
    /// An RFC 3339 timestamp carried as a string.
    Timestamp,
    /// An arbitrary-precision integer carried as a decimal string or an integer.
    BigInt,
    Nullable(Box<Shape>),
    Seq(Box<Shape>),
    /// A mapping with string keys and uniform values.
    Map(Box<Shape>),
    Struct {
        fields: Vec<Field>,
        deny_unknown_fields: bool,
    },
    /// A unit-only enum identified by symbolic name.
    Enum(Vec<String>),
}

impl Shape {
    pub const I64: Shape = Shape::Int(IntType::I64);
    pub const U64: Shape = Shape::Int(IntType::U64);

    pub fn nullable(inner: Shape) -> Self {
        Shape::Nullable(Box::new(inner))
    }

    pub fn seq(inner: Shape) -> Self {
        Shape::Seq(Box::new(inner))
    }

    pub fn map(inner: Shape) -> Self {
        Shape::Map(Box::new(inner))
    }

    /// A struct that ignores unknown fields.
    pub fn record(fields: Vec<Field>) -> Self {
        Shape::Struct {
            fields,
            deny_unknown_fields: false,
        }
    }

    /// A struct that rejects unknown fields.
    pub fn strict_record(fields: Vec<Field>) -> Self {
        Shape::Struct {
            fields,
            deny_unknown_fields: true,
        }
    }

    pub fn enumeration<S: AsRef<str>>(variants: &[S]) -> Self {
        Shape::Enum(variants.iter().map(|v| v.as_ref().to_string()).collect())
    }

    /// Decodes one value of this shape from `deserializer`.
    pub fn decode<'de, D>(&self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        ShapeSeed::new(self).deserialize(deserializer)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Any => write!(f, "any"),
            Shape::Bool => write!(f, "bool"),
            Shape::Int(ty) => write!(f, "{}", ty.as_str()),
            Shape::Float => write!(f, "f64"),
            Shape::String => write!(f, "string"),
            Shape::Timestamp => write!(f, "timestamp"),
            Shape::BigInt => write!(f, "bigint"),
            Shape::Nullable(inner) => write!(f, "nullable<{}>", inner),
            Shape::Seq(inner) => write!(f, "seq<{}>", inner),
            Shape::Map(inner) => write!(f, "map<{}>", inner),
            Shape::Struct { fields, .. } => write!(
                f,
                "struct {{{}}}",
                fields
                    .iter()
                    .map(|field| field.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Shape::Enum(variants) => write!(f, "enum {{{}}}", variants.join(", ")),
        }
    }
}

/// A [`DeserializeSeed`] producing a [`Value`] of the given shape.
#[derive(Clone, Copy, Debug)]
pub struct ShapeSeed<'s> {
    shape: &'s Shape,
}

impl<'s> ShapeSeed<'s> {
    #[must_use]
    pub fn new(shape: &'s Shape) -> Self {
        ShapeSeed { shape }
    }
}

impl<'de, 's> DeserializeSeed<'de> for ShapeSeed<'s> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        match self.shape {
            Shape::Any => de::Deserialize::deserialize(deserializer),
            Shape::Bool => deserializer.deserialize_bool(BoolVisitor),
            Shape::Int(ty) if ty.is_unsigned() => deserializer.deserialize_u64(IntVisitor(*ty)),
            Shape::Int(ty) => deserializer.deserialize_i64(IntVisitor(*ty)),
            Shape::Float => deserializer.deserialize_f64(FloatVisitor),
            Shape::String => deserializer.deserialize_string(StringVisitor),
            Shape::Timestamp => deserializer.deserialize_str(TimestampVisitor),
            Shape::BigInt => deserializer.deserialize_any(BigIntVisitor),
            Shape::Nullable(inner) => deserializer.deserialize_option(NullableVisitor { inner }),
            Shape::Seq(inner) => deserializer.deserialize_seq(SeqVisitor { inner }),
            Shape::Map(inner) => deserializer.deserialize_map(MapVisitor { inner }),
            Shape::Struct {
                fields,
                deny_unknown_fields,
            } => deserializer.deserialize_map(StructVisitor {
                fields,
                deny_unknown_fields: *deny_unknown_fields,
            }),
            Shape::Enum(variants) => deserializer.deserialize_str(EnumVisitor { variants }),
        }
    }
}

struct BoolVisitor;

impl<'de> Visitor<'de> for BoolVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean")
    }

    fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }
}

struct IntVisitor(IntType);

impl<'de> Visitor<'de> for IntVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an integer of type {}", self.0.as_str())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        self.0.check(i128::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        self.0.check(i128::from(value))
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> Result<Value, E> {
        self.0.check(value)
    }
}

struct FloatVisitor;

impl<'de> Visitor<'de> for FloatVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a floating point number")
    }

    fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
        Ok(Value::Number(Number::from(value)))
    }

    // Integral encodings of whole floats are accepted, as Serde's own f64 visitor does.
    fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
        Ok(Value::Number(Number::Float(value as f64)))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
        Ok(Value::Number(Number::Float(value as f64)))
    }
}

struct StringVisitor;

impl<'de> Visitor<'de> for StringVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Value, E> {
        Ok(Value::String(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<Value, E> {
        Ok(Value::String(value))
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an RFC 3339 timestamp")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| Value::Date(dt.with_timezone(&Utc)))
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }
}

struct BigIntVisitor;

impl<'de> Visitor<'de> for BigIntVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or a decimal integer string")
    }

    fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
        Ok(Value::BigInt(BigInt::from(value)))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
        Ok(Value::BigInt(BigInt::from(value)))
    }

    fn visit_i128<E>(self, value: i128) -> Result<Value, E> {
        Ok(Value::BigInt(BigInt::from(value)))
    }

    fn visit_u128<E>(self, value: u128) -> Result<Value, E> {
        Ok(Value::BigInt(BigInt::from(value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        value
            .parse::<BigInt>()
            .map(Value::BigInt)
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }
}

struct NullableVisitor<'s> {
    inner: &'s Shape,
}

impl<'de, 's> Visitor<'de> for NullableVisitor<'s> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "null or {}", self.inner)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        ShapeSeed::new(self.inner).deserialize(deserializer)
    }
}

struct SeqVisitor<'s> {
    inner: &'s Shape,
}

impl<'de, 's> Visitor<'de> for SeqVisitor<'s> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a sequence of {}", self.inner)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(ShapeSeed::new(self.inner))? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }
}

struct MapVisitor<'s> {
    inner: &'s Shape,
}

impl<'de, 's> Visitor<'de> for MapVisitor<'s> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a mapping of string to {}", self.inner)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut entries = ValueMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            if entries.contains_key(&key) {
                return Err(de::Error::custom(format_args!(
                    "duplicate field `{}`",
                    key
                )));
            }
            let value = map.next_value_seed(ShapeSeed::new(self.inner))?;
            entries.insert(key, value);
        }
        Ok(Value::Object(entries))
    }
}

struct StructVisitor<'s> {
    fields: &'s [Field],
    deny_unknown_fields: bool,
}

impl<'de, 's> Visitor<'de> for StructVisitor<'s> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a struct")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut found = ValueMap::with_capacity(self.fields.len());
        while let Some(key) = map.next_key::<String>()? {
            let Some(field) = self.fields.iter().find(|f| f.name == key) else {
                if self.deny_unknown_fields {
                    return Err(de::Error::custom(format_args!(
                        "unknown field `{}`, expected one of {}",
                        key,
                        quoted_list(self.fields.iter().map(|f| f.name.as_str()))
                    )));
                }
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            if found.contains_key(&key) {
                return Err(de::Error::custom(format_args!(
                    "duplicate field `{}`",
                    key
                )));
            }
            let value = map.next_value_seed(ShapeSeed::new(&field.shape))?;
            found.insert(key, value);
        }

        // Rebuild in declaration order, filling defaults.
        let mut object = ValueMap::with_capacity(self.fields.len());
        for field in self.fields {
            let value = match (found.remove(&field.name), &field.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(de::Error::custom(format_args!(
                        "missing field `{}`",
                        field.name
                    )))
                }
            };
            object.insert(field.name.clone(), value);
        }
        Ok(Value::Object(object))
    }
}

struct EnumVisitor<'s> {
    variants: &'s [String],
}

impl<'de, 's> Visitor<'de> for EnumVisitor<'s> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "one of {}",
            quoted_list(self.variants.iter().map(String::as_str))
        )
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        if self.variants.iter().any(|v| v == value) {
            Ok(Value::Enum(value.to_string()))
        } else {
            Err(E::custom(format_args!(
                "unknown variant `{}`, expected one of {}",
                value,
                quoted_list(self.variants.iter().map(String::as_str))
            )))
        }
    }
}

fn quoted_list<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names
        .map(|name| format!("`{}`", name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeserializeError, ErrorKind};

    fn decode(shape: &Shape, json: &str) -> Result<Value, DeserializeError> {
        let mut de = serde_json::Deserializer::from_str(json);
        shape
            .decode(&mut de)
            .map_err(|e| DeserializeError::classified(e))
    }

    fn colors() -> Shape {
        Shape::enumeration(&["Red", "Green", "Blue"])
    }

    #[test]
    fn test_enum_accepts_symbolic_names_only() {
        assert_eq!(
            decode(&colors(), r#""Green""#).unwrap(),
            Value::Enum("Green".to_string())
        );

        let err = decode(&colors(), r#""Purple""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownVariant);

        let err = decode(&colors(), "1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidType);
    }

    #[test]
    fn test_int_range_checks() {
        let shape = Shape::Int(IntType::U8);
        assert_eq!(decode(&shape, "255").unwrap(), Value::from(255u8));
        assert_eq!(
            decode(&shape, "256").unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            decode(&shape, "-1").unwrap_err().kind(),
            ErrorKind::OutOfRange
        );

        assert_eq!(
            decode(&Shape::U64, "18446744073709551615").unwrap(),
            Value::from(u64::MAX)
        );
        assert_eq!(
            decode(&Shape::I64, "-9223372036854775808").unwrap(),
            Value::from(i64::MIN)
        );
        assert_eq!(
            decode(&Shape::I64, "1.5").unwrap_err().kind(),
            ErrorKind::InvalidType
        );
    }

    #[test]
    fn test_bool_rejects_strings() {
        let err = decode(&Shape::Bool, r#""true""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidType);
    }

    #[test]
    fn test_nullable_keeps_null_distinct() {
        let shape = Shape::nullable(Shape::I64);
        assert_eq!(decode(&shape, "null").unwrap(), Value::Null);
        assert_eq!(decode(&shape, "0").unwrap(), Value::from(0));
    }

    #[test]
    fn test_struct_missing_field_policy() {
        let required = Shape::record(vec![
            Field::required("id", Shape::I64),
            Field::required("name", Shape::String),
        ]);
        let err = decode(&required, r#"{"id": 1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert!(err.message().contains("`name`"));

        let defaulted = Shape::record(vec![
            Field::required("id", Shape::I64),
            Field::with_default("name", Shape::String, Value::from("")),
        ]);
        let value = decode(&defaulted, r#"{"id": 1}"#).unwrap();
        assert_eq!(
            value.as_object().and_then(|o| o.get("name")),
            Some(&Value::from(""))
        );
    }

    #[test]
    fn test_struct_unknown_and_duplicate_fields() {
        let fields = vec![Field::required("id", Shape::I64)];

        let lenient = Shape::record(fields.clone());
        let value = decode(&lenient, r#"{"id": 1, "extra": [1, 2]}"#).unwrap();
        assert_eq!(value.as_object().map(ValueMap::len), Some(1));

        let strict = Shape::strict_record(fields);
        let err = decode(&strict, r#"{"id": 1, "extra": 2}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);

        let err = decode(&lenient, r#"{"id": 1, "id": 2}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateField);
    }

    #[test]
    fn test_struct_output_follows_declaration_order() {
        let shape = Shape::record(vec![
            Field::required("a", Shape::I64),
            Field::required("b", Shape::I64),
        ]);
        let value = decode(&shape, r#"{"b": 2, "a": 1}"#).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_timestamp_and_bigint() {
        let value = decode(&Shape::Timestamp, r#""2024-01-15T10:30:00+02:00""#).unwrap();
        match value {
            Value::Date(dt) => assert_eq!(dt.to_rfc3339(), "2024-01-15T08:30:00+00:00"),
            other => panic!("Expected timestamp, got {}", other),
        }
        assert_eq!(
            decode(&Shape::Timestamp, r#""yesterday""#).unwrap_err().kind(),
            ErrorKind::InvalidValue
        );

        let big = decode(&Shape::BigInt, r#""-123456789012345678901234567890""#).unwrap();
        assert_eq!(big.to_string(), "-123456789012345678901234567890");
        assert_eq!(decode(&Shape::BigInt, "42").unwrap(), Value::BigInt(BigInt::from(42)));
    }

    #[test]
    fn test_float_accepts_integral_encoding() {
        assert_eq!(decode(&Shape::Float, "2").unwrap(), Value::from(2.0));
        assert_eq!(decode(&Shape::Float, "-0.5").unwrap(), Value::from(-0.5));
    }

    #[test]
    fn test_empty_collections_stay_empty() {
        assert_eq!(
            decode(&Shape::seq(Shape::I64), "[]").unwrap(),
            Value::Array(vec![])
        );
        assert_eq!(
            decode(&Shape::map(Shape::String), "{}").unwrap(),
            Value::Object(ValueMap::new())
        );
        assert_eq!(
            decode(&Shape::seq(Shape::I64), "null").unwrap_err().kind(),
            ErrorKind::InvalidType
        );
    }

    #[test]
    fn test_display() {
        let shape = Shape::record(vec![
            Field::required("id", Shape::I64),
            Field::required("tags", Shape::seq(Shape::nullable(Shape::String))),
        ]);
        assert_eq!(shape.to_string(), "struct {id, tags}");
        assert_eq!(
            Shape::seq(Shape::nullable(Shape::String)).to_string(),
            "seq<nullable<string>>"
        );
    }
}
