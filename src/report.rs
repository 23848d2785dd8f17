//! Per-case results and their aggregation into a report.
//!
//! The runner produces one [`CaseResult`] per (case, adapter) pair. A
//! [`ReportAggregator`] records them in registration order and finishes into a read-only
//! [`Report`]; [`Summary`] condenses a report into counts plus every non-passing case
//! with enough detail to diagnose it without rerunning.

use crate::compare::Diff;
use crate::{DeserializeError, DisposeError, Error, ErrorKind, Fault, Result};
use indexmap::IndexMap;
use std::fmt;
use std::io;

/// Why a case failed its expectation.
#[derive(Clone, Debug, PartialEq)]
pub enum Mismatch {
    /// The decoded value differs from the expected one.
    Structural(Diff),
    /// A negative case decoded successfully.
    UnexpectedSuccess { expected: ErrorKind, decoded: String },
    /// A negative case failed, but with a different kind.
    WrongErrorKind {
        expected: ErrorKind,
        actual: DeserializeError,
    },
    /// The serialized bytes did not satisfy the case's raw check.
    RawBytes { check: String, excerpt: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Structural(diff) => write!(f, "{}", diff),
            Mismatch::UnexpectedSuccess { expected, decoded } => write!(
                f,
                "expected a {} failure, but decoding produced {}",
                expected, decoded
            ),
            Mismatch::WrongErrorKind { expected, actual } => {
                write!(f, "expected a {} failure, got {}", expected, actual)
            }
            Mismatch::RawBytes { check, excerpt } => {
                write!(f, "serialized bytes fail check `{}`: {}", check, excerpt)
            }
        }
    }
}

/// The verdict for one case.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Pass,
    Fail(Mismatch),
    Error(Fault),
}

impl Outcome {
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Fail(_) => "FAIL",
            Outcome::Error(_) => "ERROR",
        }
    }
}

/// The result of running one case against one adapter.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseResult {
    id: String,
    outcome: Outcome,
    secondary: Option<DisposeError>,
}

impl CaseResult {
    pub fn new(id: impl Into<String>, outcome: Outcome) -> Self {
        CaseResult {
            id: id.into(),
            outcome,
            secondary: None,
        }
    }

    /// Attaches a dispose failure that did not decide the outcome.
    #[must_use]
    pub fn with_secondary(mut self, secondary: Option<DisposeError>) -> Self {
        self.secondary = secondary;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// A dispose failure recorded alongside the primary outcome.
    #[must_use]
    pub fn secondary(&self) -> Option<&DisposeError> {
        self.secondary.as_ref()
    }
}

/// Finished results of one run, keyed by case id in registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    adapter: String,
    results: IndexMap<String, CaseResult>,
}

impl Report {
    #[must_use]
    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CaseResult> {
        self.results.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaseResult> + Clone + '_ {
        self.results.values()
    }

    /// Returns `true` if every recorded case passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.iter().all(|r| r.outcome().is_pass())
    }

    #[must_use]
    pub fn summarize(&self) -> Summary {
        let mut summary = Summary {
            adapter: self.adapter.clone(),
            total: self.results.len(),
            ..Summary::default()
        };
        for result in self.results.values() {
            match result.outcome() {
                Outcome::Pass => summary.passed += 1,
                Outcome::Fail(_) => summary.failed += 1,
                Outcome::Error(_) => summary.errors += 1,
            }
            if !result.outcome().is_pass() {
                summary.non_passing.push(NonPassing {
                    id: result.id().to_string(),
                    outcome: result.outcome().clone(),
                });
            }
        }
        summary
    }

    /// Writes the summary to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing fails.
    pub fn write_summary<W: io::Write>(&self, mut writer: W) -> Result<()> {
        write!(writer, "{}", self.summarize()).map_err(|e| Error::io(&e.to_string()))
    }
}

/// Builds a [`Report`] one result at a time.
///
/// ```rust
/// use serde_conformance::{CaseResult, Outcome, ReportAggregator};
///
/// let mut aggregator = ReportAggregator::new("json");
/// aggregator.record(CaseResult::new("a", Outcome::Pass)).unwrap();
/// assert!(aggregator.record(CaseResult::new("a", Outcome::Pass)).is_err());
///
/// let summary = aggregator.summarize();
/// assert_eq!((summary.total, summary.passed), (1, 1));
/// ```
#[derive(Debug, Default)]
pub struct ReportAggregator {
    report: Report,
}

impl ReportAggregator {
    pub fn new(adapter: impl Into<String>) -> Self {
        ReportAggregator {
            report: Report {
                adapter: adapter.into(),
                results: IndexMap::new(),
            },
        }
    }

    /// Appends a result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateResult`] if a result for the same case id was already
    /// recorded.
    pub fn record(&mut self, result: CaseResult) -> Result<()> {
        if self.report.results.contains_key(result.id()) {
            return Err(Error::DuplicateResult(result.id().to_string()));
        }
        self.report.results.insert(result.id().to_string(), result);
        Ok(())
    }

    #[must_use]
    pub fn summarize(&self) -> Summary {
        self.report.summarize()
    }

    #[must_use]
    pub fn finish(self) -> Report {
        self.report
    }
}

/// A case that did not pass, with its outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct NonPassing {
    pub id: String,
    pub outcome: Outcome,
}

/// Counts and non-passing details for a report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub adapter: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub non_passing: Vec<NonPassing>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} cases, {} passed, {} failed, {} errors",
            self.adapter, self.total, self.passed, self.failed, self.errors
        )?;
        for entry in &self.non_passing {
            match &entry.outcome {
                Outcome::Fail(mismatch) => writeln!(f, "  FAIL  {}: {}", entry.id, mismatch)?,
                Outcome::Error(fault) => writeln!(f, "  ERROR {}: {}", entry.id, fault)?,
                Outcome::Pass => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::DiffKind;

    fn diff() -> Diff {
        Diff {
            path: "$.n".to_string(),
            kind: DiffKind::NullCollapsed,
            expected: "null".to_string(),
            actual: "0".to_string(),
        }
    }

    fn sample() -> ReportAggregator {
        let mut aggregator = ReportAggregator::new("json");
        aggregator.record(CaseResult::new("one", Outcome::Pass)).unwrap();
        aggregator
            .record(CaseResult::new(
                "two",
                Outcome::Fail(Mismatch::Structural(diff())),
            ))
            .unwrap();
        aggregator
            .record(
                CaseResult::new(
                    "three",
                    Outcome::Error(Fault::deserialize(
                        DeserializeError::new(ErrorKind::Syntax, "expected ident"),
                        Some(DisposeError::new("trailing characters")),
                    )),
                )
                .with_secondary(Some(DisposeError::new("trailing characters"))),
            )
            .unwrap();
        aggregator
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample().summarize();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors, 1);
        let ids: Vec<_> = summary.non_passing.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["two", "three"]);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let aggregator = sample();
        assert_eq!(aggregator.summarize(), aggregator.summarize());
        let report = aggregator.finish();
        assert_eq!(report.summarize(), report.summarize());
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_report_keeps_insertion_order() {
        let report = sample().finish();
        let ids: Vec<_> = report.iter().map(CaseResult::id).collect();
        assert_eq!(ids, vec!["one", "two", "three"]);
        assert!(!report.is_success());
        assert_eq!(
            report.get("three").and_then(CaseResult::secondary).map(DisposeError::message),
            Some("trailing characters")
        );
    }

    #[test]
    fn test_summary_display_hides_suppressed_dispose() {
        let mut out = Vec::new();
        sample().finish().write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("json: 3 cases, 1 passed, 1 failed, 1 errors"));
        assert!(text.contains("FAIL  two: null collapsed at $.n"));
        assert!(text.contains("ERROR three: deserialization failed: syntax: expected ident"));
        assert!(!text.contains("trailing characters"));
    }

    #[test]
    fn test_duplicate_result_rejected() {
        let mut aggregator = sample();
        let err = aggregator
            .record(CaseResult::new("one", Outcome::Pass))
            .unwrap_err();
        assert_eq!(err, Error::DuplicateResult("one".to_string()));
    }
}
