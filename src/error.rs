//! Error types for conformance runs.
//!
//! The harness distinguishes failures by the phase that produced them:
//!
//! - **[`SerializeError`]**: the adapter could not encode a generated value. Always fatal
//!   for the case.
//! - **[`DeserializeError`]**: the adapter rejected its input. Carries an [`ErrorKind`] so
//!   negative cases can assert *why* decoding failed.
//! - **[`DisposeError`]**: releasing decoder resources failed. When it happens after a
//!   deserialize failure it is kept only as secondary context.
//!
//! [`Fault`] is the payload of an errored case, and [`Error`] covers misuse of the
//! harness itself (duplicate case ids, duplicate results, I/O when writing reports).
//!
//! ## Examples
//!
//! ```rust
//! use serde_conformance::{DeserializeError, DisposeError, ErrorKind, Fault};
//!
//! let fault = Fault::deserialize(
//!     DeserializeError::new(ErrorKind::InvalidType, "expected a boolean"),
//!     Some(DisposeError::new("trailing characters")),
//! );
//!
//! // The primary message never mentions the dispose failure.
//! assert!(fault.to_string().contains("expected a boolean"));
//! assert!(!fault.to_string().contains("trailing"));
//! assert!(fault.suppressed().is_some());
//! ```

use std::fmt;
use thiserror::Error;

/// Classification of a deserialization failure.
///
/// Kinds mirror the failure categories Serde itself distinguishes, plus the syntax and
/// end-of-input categories most text formats report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    UnexpectedEof,
    InvalidType,
    InvalidValue,
    InvalidLength,
    /// A symbolic enum name the declared shape does not know.
    UnknownVariant,
    MissingField,
    UnknownField,
    DuplicateField,
    /// A number outside the declared type's range.
    OutOfRange,
    Other,
}

impl ErrorKind {
    /// Returns a stable snake_case name for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::UnexpectedEof => "unexpected_eof",
            ErrorKind::InvalidType => "invalid_type",
            ErrorKind::InvalidValue => "invalid_value",
            ErrorKind::InvalidLength => "invalid_length",
            ErrorKind::UnknownVariant => "unknown_variant",
            ErrorKind::MissingField => "missing_field",
            ErrorKind::UnknownField => "unknown_field",
            ErrorKind::DuplicateField => "duplicate_field",
            ErrorKind::OutOfRange => "out_of_range",
            ErrorKind::Other => "other",
        }
    }

    /// Classifies an error message produced through `serde::de::Error`.
    ///
    /// Serde's provided methods (`unknown_variant`, `missing_field`, `invalid_type`, ...)
    /// format their messages with fixed prefixes, and formats that only override
    /// `custom` keep them. Anything unrecognized is [`ErrorKind::Other`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_conformance::ErrorKind;
    ///
    /// assert_eq!(
    ///     ErrorKind::classify("unknown variant `Purple`, expected one of `Red`, `Green`"),
    ///     ErrorKind::UnknownVariant
    /// );
    /// assert_eq!(ErrorKind::classify("missing field `id`"), ErrorKind::MissingField);
    /// assert_eq!(ErrorKind::classify("something odd"), ErrorKind::Other);
    /// ```
    #[must_use]
    pub fn classify(message: &str) -> Self {
        const PREFIXES: [(&str, ErrorKind); 8] = [
            ("unknown variant", ErrorKind::UnknownVariant),
            ("missing field", ErrorKind::MissingField),
            ("unknown field", ErrorKind::UnknownField),
            ("duplicate field", ErrorKind::DuplicateField),
            ("invalid type", ErrorKind::InvalidType),
            ("invalid value", ErrorKind::InvalidValue),
            ("invalid length", ErrorKind::InvalidLength),
            ("out of range", ErrorKind::OutOfRange),
        ];

        let message = message.trim_start();
        for (prefix, kind) in PREFIXES {
            if message.starts_with(prefix) {
                return kind;
            }
        }

        if message.contains("out of range") {
            ErrorKind::OutOfRange
        } else if message.contains("EOF while parsing") || message.contains("end of input") {
            ErrorKind::UnexpectedEof
        } else {
            ErrorKind::Other
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The adapter failed to encode a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("serialization failed: {message}")]
pub struct SerializeError {
    message: String,
}

impl SerializeError {
    pub fn new<T: fmt::Display>(message: T) -> Self {
        SerializeError {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl serde::ser::Error for SerializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerializeError::new(msg)
    }
}

/// The adapter rejected its input.
///
/// # Examples
///
/// ```rust
/// use serde_conformance::{DeserializeError, ErrorKind};
///
/// let err = DeserializeError::new(ErrorKind::MissingField, "missing field `id`");
/// assert_eq!(err.kind(), ErrorKind::MissingField);
/// assert_eq!(err.to_string(), "missing_field: missing field `id`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct DeserializeError {
    kind: ErrorKind,
    message: String,
}

impl DeserializeError {
    pub fn new<T: fmt::Display>(kind: ErrorKind, message: T) -> Self {
        DeserializeError {
            kind,
            message: message.to_string(),
        }
    }

    /// Creates an error whose kind is inferred with [`ErrorKind::classify`].
    pub fn classified<T: fmt::Display>(message: T) -> Self {
        let message = message.to_string();
        DeserializeError {
            kind: ErrorKind::classify(&message),
            message,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl serde::de::Error for DeserializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DeserializeError::classified(msg)
    }
}

/// Releasing decoder resources failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dispose failed: {message}")]
pub struct DisposeError {
    message: String,
}

impl DisposeError {
    pub fn new<T: fmt::Display>(message: T) -> Self {
        DisposeError {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why a case ended in the `Error` outcome.
///
/// The `Display` output of [`Fault::Deserialize`] shows only the deserialize cause; a
/// dispose failure from the same attempt is reachable through [`Fault::suppressed`] and
/// nowhere else.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    #[error(transparent)]
    Serialize(SerializeError),

    #[error("deserialization failed: {cause}")]
    Deserialize {
        #[source]
        cause: DeserializeError,
        suppressed: Option<DisposeError>,
    },

    #[error(transparent)]
    Dispose(DisposeError),

    /// The adapter panicked while opening a decoder, serializing or decoding.
    #[error("adapter panicked: {0}")]
    Panic(String),

    /// The case definition cannot be executed as declared.
    #[error("invalid case: {0}")]
    InvalidCase(String),
}

impl Fault {
    pub fn deserialize(cause: DeserializeError, suppressed: Option<DisposeError>) -> Self {
        Fault::Deserialize { cause, suppressed }
    }

    /// The dispose failure recorded alongside a deserialize failure, if any.
    #[must_use]
    pub fn suppressed(&self) -> Option<&DisposeError> {
        match self {
            Fault::Deserialize { suppressed, .. } => suppressed.as_ref(),
            _ => None,
        }
    }

    /// The kind of the primary deserialize failure, if this fault has one.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Fault::Deserialize { cause, .. } => Some(cause.kind()),
            _ => None,
        }
    }
}

/// Misuse of the harness itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("duplicate case identifier: {0}")]
    DuplicateCase(String),

    #[error("result already recorded for case: {0}")]
    DuplicateResult(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates an I/O error for report writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
