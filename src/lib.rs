//! # serde_conformance
//!
//! A format-agnostic round-trip conformance harness for serde formats.
//!
//! ## What does it check?
//!
//! Given a [`FormatAdapter`], the harness serializes a battery of semantic values, decodes
//! them back under a declared [`Shape`], and reports whether each value survived. The
//! built-in catalog covers:
//!
//! - **Round-trip fidelity**: flat and nested structs, unicode, timestamps, big integers
//! - **Null handling**: a null must never come back as `0`, `""`, `false` or an empty
//!   collection
//! - **Numeric boundaries**: integer extremes, float extremes, NaN and the infinities
//! - **Enum strictness**: symbolic names on the wire, unknown names rejected
//! - **Missing and unknown fields**, empty collections and deep nesting
//! - **Exception priority**: when decoding fails and releasing the decoder fails too, the
//!   decoding failure is what gets reported
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_conformance::{CaseRegistry, Harness, JsonAdapter};
//!
//! let registry = CaseRegistry::standard();
//! let report = Harness::new(&registry).run(&JsonAdapter::new());
//! let summary = report.summarize();
//!
//! assert_eq!(summary.total, registry.len());
//! // JSON has no encoding for NaN or the infinities.
//! assert_eq!(summary.errors, 3);
//! println!("{}", summary);
//! ```
//!
//! ### Writing your own cases
//!
//! ```rust
//! use serde_conformance::{
//!     run_case, value, ConformanceCase, ErrorKind, Field, IntType, JsonAdapter, Outcome,
//!     Shape,
//! };
//!
//! let shape = Shape::record(vec![
//!     Field::required("id", Shape::I64),
//!     Field::required("note", Shape::nullable(Shape::String)),
//! ]);
//! let case = ConformanceCase::null_distinction("note.absent", shape, || {
//!     value!({ "id": 1, "note": null })
//! });
//!
//! assert_eq!(run_case(&case, &JsonAdapter::new()).outcome(), &Outcome::Pass);
//!
//! let strict = ConformanceCase::must_fail(
//!     "too.big",
//!     Shape::Int(IntType::U8),
//!     ErrorKind::OutOfRange,
//!     || value!(300),
//! );
//! assert!(run_case(&strict, &JsonAdapter::new()).outcome().is_pass());
//! ```
//!
//! ### Plugging in a format
//!
//! Implement [`FormatAdapter`] and [`Decoder`]. The decoder is created per attempt and
//! disposed exactly once, even when decoding fails or panics. See the [`adapter`] module.
//!
//! ## Logging
//!
//! The harness emits [`tracing`] events: `debug` per case, `warn` when a dispose failure is
//! suppressed behind a decoding failure and `info` with the counts at the end of a run.
//! No subscriber is installed by the library.

pub mod adapter;
pub mod case;
pub mod catalog;
pub mod compare;
pub mod error;
pub mod harness;
#[cfg(feature = "json")]
pub mod json;
pub mod macros;
pub mod map;
pub mod options;
pub mod registry;
pub mod report;
pub mod runner;
pub mod shape;
pub mod value;

pub use adapter::{Decoder, FormatAdapter};
pub use case::{
    contains_bytes, replace_first, CaseInput, ConformanceCase, Expectation, RawCheck, Tamper,
    ValueFactory,
};
pub use compare::{diff, equal, Diff, DiffKind};
pub use error::{
    DeserializeError, DisposeError, Error, ErrorKind, Fault, Result, SerializeError,
};
pub use harness::Harness;
#[cfg(feature = "json")]
pub use json::JsonAdapter;
pub use map::ValueMap;
pub use options::RunOptions;
pub use registry::CaseRegistry;
pub use report::{CaseResult, Mismatch, NonPassing, Outcome, Report, ReportAggregator, Summary};
pub use runner::{attempt, run_case, AdapterResult, DisposeScope};
pub use shape::{Field, IntType, Shape, ShapeSeed};
pub use value::{Number, Value};

/// Runs the built-in catalog against `adapter` with default options.
///
/// # Examples
///
/// ```rust
/// use serde_conformance::{run_standard_suite, JsonAdapter};
///
/// let report = run_standard_suite(&JsonAdapter::pretty());
/// assert_eq!(report.adapter(), "json-pretty");
/// assert!(report.get("boundary.i64_min").map_or(false, |r| r.outcome().is_pass()));
/// ```
#[must_use]
pub fn run_standard_suite<A>(adapter: &A) -> Report
where
    A: FormatAdapter + Sync + ?Sized,
{
    Harness::new(&CaseRegistry::standard()).run(adapter)
}

/// Runs the built-in catalog against `adapter` with custom options.
#[must_use]
pub fn run_standard_suite_with_options<A>(adapter: &A, options: RunOptions) -> Report
where
    A: FormatAdapter + Sync + ?Sized,
{
    Harness::new(&CaseRegistry::standard())
        .with_options(options)
        .run(adapter)
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn test_standard_suite_against_json() {
        let report = run_standard_suite(&JsonAdapter::new());
        let summary = report.summarize();

        assert_eq!(summary.total, catalog::standard_cases().len());
        assert_eq!(summary.failed, 0);
        let errors: Vec<_> = summary.non_passing.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            errors,
            vec![
                "boundary.f64_nan",
                "boundary.f64_infinity",
                "boundary.f64_neg_infinity"
            ]
        );
    }

    #[test]
    fn test_pretty_and_compact_agree() {
        let compact = run_standard_suite(&JsonAdapter::new()).summarize();
        let pretty = run_standard_suite(&JsonAdapter::pretty()).summarize();
        assert_eq!(compact.passed, pretty.passed);
        assert_eq!(compact.errors, pretty.errors);
    }

    #[test]
    fn test_options_apply_to_standard_suite() {
        let report = run_standard_suite_with_options(
            &JsonAdapter::new(),
            RunOptions::new().with_filter("null.").with_workers(2),
        );
        assert_eq!(report.len(), 4);
        assert!(report.is_success());
    }
}
