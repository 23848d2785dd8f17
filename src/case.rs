//! Declarative conformance cases.
//!
//! A [`ConformanceCase`] names one scenario: how to produce the original value, the
//! [`Shape`] the adapter must decode it as, and the [`Expectation`] the outcome is judged
//! against. Cases are immutable once built; the factories are shared closures so a case
//! can be cloned into several registries or run on several threads.
//!
//! ```rust
//! use serde_conformance::{value, ConformanceCase, ErrorKind, Expectation, Shape};
//!
//! let case = ConformanceCase::round_trip("color", Shape::enumeration(&["Red", "Green"]), || {
//!     serde_conformance::Value::Enum("Green".to_string())
//! })
//! .with_description("enums serialize by symbolic name")
//! .with_raw_check("contains `Green`", |bytes| {
//!     bytes.windows(5).any(|w| w == b"Green")
//! });
//!
//! assert_eq!(case.id(), "color");
//! assert_eq!(case.expectation(), &Expectation::MustRoundTrip);
//! assert!(case.raw_check().is_some());
//! ```

use crate::{ErrorKind, Shape, Value};
use std::fmt;
use std::sync::Arc;

/// Produces a fresh value each time a case runs.
pub type ValueFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Rewrites serialized bytes before they are decoded.
pub type Tamper = Arc<dyn Fn(Vec<u8>) -> Vec<u8> + Send + Sync>;

/// What a case considers success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// The decoded value must equal the original.
    MustRoundTrip,
    /// Decoding must fail with exactly this kind.
    MustFailWith(ErrorKind),
    /// Like `MustRoundTrip`, for originals that contain nulls: a null must come back as
    /// null, not as its type's zero value.
    MustPreserveNullDistinction,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::MustRoundTrip => write!(f, "must-round-trip"),
            Expectation::MustFailWith(kind) => write!(f, "must-fail-with({})", kind),
            Expectation::MustPreserveNullDistinction => {
                write!(f, "must-preserve-null-distinction")
            }
        }
    }
}

/// Where the bytes handed to the decoder come from.
#[derive(Clone)]
pub enum CaseInput {
    /// The adapter's serialization of the original.
    Generated,
    /// The adapter's serialization of the original, rewritten.
    Tampered(Tamper),
    /// Fixed bytes, bypassing serialization. Only meaningful for one format.
    Encoded(Vec<u8>),
}

impl fmt::Debug for CaseInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseInput::Generated => f.write_str("Generated"),
            CaseInput::Tampered(_) => f.write_str("Tampered(..)"),
            CaseInput::Encoded(bytes) => write!(f, "Encoded({} bytes)", bytes.len()),
        }
    }
}

/// A predicate over the adapter's serialized bytes, with a label for reports.
#[derive(Clone)]
pub struct RawCheck {
    label: String,
    predicate: Arc<dyn Fn(&[u8]) -> bool + Send + Sync>,
}

impl RawCheck {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn matches(&self, bytes: &[u8]) -> bool {
        (self.predicate)(bytes)
    }
}

impl fmt::Debug for RawCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCheck").field("label", &self.label).finish()
    }
}

/// One named conformance scenario.
#[derive(Clone)]
pub struct ConformanceCase {
    id: String,
    description: String,
    shape: Shape,
    factory: ValueFactory,
    expectation: Expectation,
    input: CaseInput,
    expected: Option<ValueFactory>,
    raw_check: Option<RawCheck>,
}

impl ConformanceCase {
    pub fn new<F>(id: impl Into<String>, shape: Shape, expectation: Expectation, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        ConformanceCase {
            id: id.into(),
            description: String::new(),
            shape,
            factory: Arc::new(factory),
            expectation,
            input: CaseInput::Generated,
            expected: None,
            raw_check: None,
        }
    }

    pub fn round_trip<F>(id: impl Into<String>, shape: Shape, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::new(id, shape, Expectation::MustRoundTrip, factory)
    }

    pub fn must_fail<F>(id: impl Into<String>, shape: Shape, kind: ErrorKind, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::new(id, shape, Expectation::MustFailWith(kind), factory)
    }

    pub fn null_distinction<F>(id: impl Into<String>, shape: Shape, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::new(id, shape, Expectation::MustPreserveNullDistinction, factory)
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Rewrites the serialized bytes before decoding, e.g. to inject a malformed token.
    #[must_use]
    pub fn with_tampered_input<F>(mut self, tamper: F) -> Self
    where
        F: Fn(Vec<u8>) -> Vec<u8> + Send + Sync + 'static,
    {
        self.input = CaseInput::Tampered(Arc::new(tamper));
        self
    }

    /// Decodes `bytes` instead of serializing the original.
    #[must_use]
    pub fn with_encoded_input(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.input = CaseInput::Encoded(bytes.into());
        self
    }

    /// Compares the decoded value against this instead of the original.
    ///
    /// Used when the shape fills in a default for a field the original lacks.
    #[must_use]
    pub fn with_expected<F>(mut self, expected: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.expected = Some(Arc::new(expected));
        self
    }

    /// Requires the serialized bytes to satisfy `predicate` before decoding.
    #[must_use]
    pub fn with_raw_check<F>(mut self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&[u8]) -> bool + Send + Sync + 'static,
    {
        self.raw_check = Some(RawCheck {
            label: label.into(),
            predicate: Arc::new(predicate),
        });
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    #[must_use]
    pub fn input(&self) -> &CaseInput {
        &self.input
    }

    #[must_use]
    pub fn raw_check(&self) -> Option<&RawCheck> {
        self.raw_check.as_ref()
    }

    /// Produces the original value.
    #[must_use]
    pub fn original(&self) -> Value {
        (self.factory)()
    }

    /// Produces the value a successful decode is compared against.
    #[must_use]
    pub fn expected_value(&self) -> Value {
        match &self.expected {
            Some(expected) => expected(),
            None => self.original(),
        }
    }
}

impl fmt::Debug for ConformanceCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConformanceCase")
            .field("id", &self.id)
            .field("shape", &self.shape.to_string())
            .field("expectation", &self.expectation)
            .field("input", &self.input)
            .field("raw_check", &self.raw_check)
            .finish()
    }
}

/// Replaces the first occurrence of `from` in `bytes` with `to`.
///
/// Returns the bytes unchanged when `from` does not occur.
///
/// ```rust
/// use serde_conformance::replace_first;
///
/// assert_eq!(replace_first(b"{\"a\":true}".to_vec(), b"true", b"1"), b"{\"a\":1}".to_vec());
/// ```
#[must_use]
pub fn replace_first(bytes: Vec<u8>, from: &[u8], to: &[u8]) -> Vec<u8> {
    match find(&bytes, from) {
        Some(at) => {
            let mut out = Vec::with_capacity(bytes.len() + to.len());
            out.extend_from_slice(&bytes[..at]);
            out.extend_from_slice(to);
            out.extend_from_slice(&bytes[at + from.len()..]);
            out
        }
        None => bytes,
    }
}

/// Returns `true` if `needle` occurs in `bytes`.
#[must_use]
pub fn contains_bytes(bytes: &[u8], needle: &[u8]) -> bool {
    find(bytes, needle).is_some()
}

fn find(bytes: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    bytes.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn test_expected_value_defaults_to_original() {
        let case = ConformanceCase::round_trip("n", Shape::I64, || value!(5));
        assert_eq!(case.expected_value(), value!(5));

        let case = case.with_expected(|| value!(6));
        assert_eq!(case.original(), value!(5));
        assert_eq!(case.expected_value(), value!(6));
    }

    #[test]
    fn test_expectation_display() {
        assert_eq!(Expectation::MustRoundTrip.to_string(), "must-round-trip");
        assert_eq!(
            Expectation::MustFailWith(ErrorKind::UnknownVariant).to_string(),
            "must-fail-with(unknown_variant)"
        );
        assert_eq!(
            Expectation::MustPreserveNullDistinction.to_string(),
            "must-preserve-null-distinction"
        );
    }

    #[test]
    fn test_replace_first_only_touches_first_match() {
        let out = replace_first(b"aXbXc".to_vec(), b"X", b"--");
        assert_eq!(out, b"a--bXc".to_vec());
        assert_eq!(replace_first(b"abc".to_vec(), b"z", b"y"), b"abc".to_vec());
    }

    #[test]
    fn test_contains_bytes() {
        assert!(contains_bytes(br#"{"color":"Green"}"#, b"Green"));
        assert!(!contains_bytes(br#"{"color":1}"#, b"Green"));
        assert!(contains_bytes(b"", b""));
    }

    #[test]
    fn test_debug_omits_closures() {
        let case = ConformanceCase::round_trip("dbg", Shape::Bool, || value!(true))
            .with_tampered_input(|bytes| bytes);
        let shown = format!("{:?}", case);
        assert!(shown.contains("\"dbg\""));
        assert!(shown.contains("Tampered(..)"));
    }
}
