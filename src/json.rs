//! Reference adapter backed by `serde_json`.
//!
//! Decoding drives a [`serde_json::Deserializer`] with a [`ShapeSeed`](crate::ShapeSeed);
//! disposing calls [`Deserializer::end`](serde_json::Deserializer::end), which fails when
//! unconsumed content follows the decoded value. JSON has no encoding for NaN or the
//! infinities (`serde_json` writes them as `null`), so this adapter fails the non-finite
//! boundary cases of the standard catalog.
//!
//! ```rust
//! use serde_conformance::{run_case, ConformanceCase, JsonAdapter, Outcome, Shape, value};
//!
//! let case = ConformanceCase::round_trip("ints", Shape::seq(Shape::I64), || value!([1, 2, 3]));
//! let result = run_case(&case, &JsonAdapter::new());
//! assert!(matches!(result.outcome(), Outcome::Pass));
//! ```

use crate::{
    Decoder, DeserializeError, DisposeError, ErrorKind, FormatAdapter, SerializeError, Shape,
    Value,
};
use serde_json::de::SliceRead;
use serde_json::error::Category;

/// Adapter for JSON via `serde_json`.
#[derive(Clone, Debug, Default)]
pub struct JsonAdapter {
    pretty: bool,
}

impl JsonAdapter {
    /// Compact output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output.
    #[must_use]
    pub fn pretty() -> Self {
        JsonAdapter { pretty: true }
    }
}

impl FormatAdapter for JsonAdapter {
    fn name(&self) -> &str {
        if self.pretty {
            "json-pretty"
        } else {
            "json"
        }
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        encoded.map_err(SerializeError::new)
    }

    fn decoder<'a>(&'a self, bytes: &'a [u8]) -> Box<dyn Decoder + 'a> {
        Box::new(JsonDecoder {
            de: serde_json::Deserializer::from_slice(bytes),
        })
    }
}

struct JsonDecoder<'a> {
    de: serde_json::Deserializer<SliceRead<'a>>,
}

impl Decoder for JsonDecoder<'_> {
    fn deserialize(&mut self, shape: &Shape) -> Result<Value, DeserializeError> {
        shape.decode(&mut self.de).map_err(classify)
    }

    fn dispose(&mut self) -> Result<(), DisposeError> {
        self.de.end().map_err(DisposeError::new)
    }
}

fn classify(err: serde_json::Error) -> DeserializeError {
    let kind = match err.classify() {
        Category::Syntax => ErrorKind::Syntax,
        Category::Eof => ErrorKind::UnexpectedEof,
        Category::Data => ErrorKind::classify(&err.to_string()),
        Category::Io => ErrorKind::Other,
    };
    DeserializeError::new(kind, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{value, Field};

    fn attempt(
        bytes: &[u8],
        shape: &Shape,
    ) -> (Result<Value, DeserializeError>, Result<(), DisposeError>) {
        let adapter = JsonAdapter::new();
        let mut decoder = adapter.decoder(bytes);
        let decoded = decoder.deserialize(shape);
        let disposed = decoder.dispose();
        (decoded, disposed)
    }

    #[test]
    fn test_serialize_compact_and_pretty() {
        let v = value!({ "a": 1 });
        assert_eq!(JsonAdapter::new().serialize(&v).unwrap(), br#"{"a":1}"#.to_vec());

        let pretty = JsonAdapter::pretty().serialize(&v).unwrap();
        assert!(String::from_utf8(pretty).unwrap().contains('\n'));
        assert_eq!(JsonAdapter::pretty().name(), "json-pretty");
    }

    #[test]
    fn test_clean_decode_disposes_cleanly() {
        let (decoded, disposed) = attempt(b"  [1, 2]  ", &Shape::seq(Shape::I64));
        assert_eq!(decoded.unwrap(), value!([1, 2]));
        assert!(disposed.is_ok());
    }

    #[test]
    fn test_trailing_content_fails_dispose() {
        let (decoded, disposed) = attempt(b"true false", &Shape::Bool);
        assert_eq!(decoded.unwrap(), Value::Bool(true));
        assert!(disposed.unwrap_err().message().contains("trailing characters"));
    }

    #[test]
    fn test_error_kinds() {
        let (decoded, _) = attempt(b"[1, 2", &Shape::seq(Shape::I64));
        assert_eq!(decoded.unwrap_err().kind(), ErrorKind::UnexpectedEof);

        let flag = Shape::record(vec![Field::required("flag", Shape::Bool)]);
        let (decoded, _) = attempt(b"{\"flag\": notaboolean}", &flag);
        assert_eq!(decoded.unwrap_err().kind(), ErrorKind::Syntax);

        let id = Shape::record(vec![Field::required("id", Shape::I64)]);
        let (decoded, _) = attempt(b"{}", &id);
        assert_eq!(decoded.unwrap_err().kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_non_finite_floats_are_not_representable() {
        let bytes = JsonAdapter::new().serialize(&Value::from(f64::NAN)).unwrap();
        assert_eq!(bytes, b"null".to_vec());

        let (decoded, disposed) = attempt(&bytes, &Shape::Float);
        assert_eq!(decoded.unwrap_err().kind(), ErrorKind::InvalidType);
        assert!(disposed.is_ok());
    }
}
