//! Runs a whole registry against one adapter.
//!
//! ```rust
//! use serde_conformance::{CaseRegistry, Harness, JsonAdapter, RunOptions};
//!
//! let registry = CaseRegistry::standard();
//! let report = Harness::new(&registry)
//!     .with_options(RunOptions::new().with_filter("enum."))
//!     .run(&JsonAdapter::new());
//!
//! assert_eq!(report.len(), 2);
//! assert!(report.is_success());
//! ```

use crate::{run_case, CaseRegistry, CaseResult, ConformanceCase, FormatAdapter, Report};
use crate::{ReportAggregator, RunOptions};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use tracing::{info, warn};

/// Binds a registry to run options.
#[derive(Clone, Debug)]
pub struct Harness<'r> {
    registry: &'r CaseRegistry,
    options: RunOptions,
}

impl<'r> Harness<'r> {
    #[must_use]
    pub fn new(registry: &'r CaseRegistry) -> Self {
        Harness {
            registry,
            options: RunOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs every selected case and returns the finished report.
    ///
    /// Results are recorded in registration order regardless of the worker count.
    pub fn run<A>(&self, adapter: &A) -> Report
    where
        A: FormatAdapter + Sync + ?Sized,
    {
        let selected: Vec<&ConformanceCase> = self
            .registry
            .all_cases()
            .filter(|case| self.options.selects(case.id()))
            .collect();

        let results = if self.options.workers > 1 && selected.len() > 1 {
            self.run_parallel(&selected, adapter)
        } else {
            self.run_sequential(&selected, adapter)
        };

        let mut aggregator = ReportAggregator::new(adapter.name());
        for result in results {
            // Ids are unique in the registry, so this cannot collide.
            if let Err(err) = aggregator.record(result) {
                warn!(error = %err, "dropping result");
            }
        }

        let report = aggregator.finish();
        let summary = report.summarize();
        info!(
            adapter = adapter.name(),
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            errors = summary.errors,
            "conformance run finished"
        );
        report
    }

    fn run_sequential<A>(&self, cases: &[&ConformanceCase], adapter: &A) -> Vec<CaseResult>
    where
        A: FormatAdapter + ?Sized,
    {
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            let result = run_case(case, adapter);
            let stop = self.options.fail_fast && !result.outcome().is_pass();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    }

    fn run_parallel<A>(&self, cases: &[&ConformanceCase], adapter: &A) -> Vec<CaseResult>
    where
        A: FormatAdapter + Sync + ?Sized,
    {
        let next = AtomicUsize::new(0);
        let stop = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel();
        let workers = self.options.workers.min(cases.len());

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let (next, stop) = (&next, &stop);
                scope.spawn(move || loop {
                    if stop.load(Ordering::Acquire) {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::AcqRel);
                    let Some(case) = cases.get(index) else {
                        break;
                    };
                    let result = run_case(case, adapter);
                    if self.options.fail_fast && !result.outcome().is_pass() {
                        stop.store(true, Ordering::Release);
                    }
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);

        let mut slots: Vec<Option<CaseResult>> = vec![None; cases.len()];
        for (index, result) in rx {
            slots[index] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{value, JsonAdapter, Outcome, Shape};

    fn registry() -> CaseRegistry {
        let mut registry = CaseRegistry::new();
        for i in 0..20 {
            registry
                .register(ConformanceCase::round_trip(
                    format!("ints.{:02}", i),
                    Shape::seq(Shape::I64),
                    move || value!([(i), (i + 1)]),
                ))
                .unwrap();
        }
        registry
            .register(
                ConformanceCase::round_trip("broken.wrong_shape", Shape::Bool, || value!(1)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let registry = registry();
        let adapter = JsonAdapter::new();

        let sequential = Harness::new(&registry).run(&adapter);
        let parallel = Harness::new(&registry)
            .with_options(RunOptions::new().with_workers(4))
            .run(&adapter);

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 21);
        let ids: Vec<_> = parallel.iter().map(CaseResult::id).collect();
        let expected: Vec<_> = registry.all_cases().map(ConformanceCase::id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_filter_selects_prefix() {
        let registry = registry();
        let report = Harness::new(&registry)
            .with_options(RunOptions::new().with_filter("broken."))
            .run(&JsonAdapter::new());
        assert_eq!(report.len(), 1);
        assert!(matches!(
            report.get("broken.wrong_shape").map(CaseResult::outcome),
            Some(Outcome::Error(_))
        ));
    }

    #[test]
    fn test_fail_fast_stops_after_first_failure() {
        let mut registry = CaseRegistry::new();
        registry
            .register(ConformanceCase::round_trip("a", Shape::I64, || value!(1)))
            .unwrap();
        registry
            .register(ConformanceCase::round_trip("b", Shape::Bool, || value!(1)))
            .unwrap();
        registry
            .register(ConformanceCase::round_trip("c", Shape::I64, || value!(3)))
            .unwrap();

        let report = Harness::new(&registry)
            .with_options(RunOptions::new().with_fail_fast(true))
            .run(&JsonAdapter::new());
        let ids: Vec<_> = report.iter().map(CaseResult::id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_panicking_factory_ends_only_its_case() {
        let mut registry = CaseRegistry::new();
        registry
            .register(ConformanceCase::round_trip("ok", Shape::I64, || value!(1)))
            .unwrap();
        registry
            .register(ConformanceCase::round_trip("boom", Shape::I64, || -> crate::Value {
                panic!("factory bug")
            }))
            .unwrap();
        registry
            .register(ConformanceCase::round_trip("ok2", Shape::I64, || value!(2)))
            .unwrap();

        for workers in [1, 2] {
            let report = Harness::new(&registry)
                .with_options(RunOptions::new().with_workers(workers))
                .run(&JsonAdapter::new());

            let ids: Vec<_> = report.iter().map(CaseResult::id).collect();
            assert_eq!(ids, vec!["ok", "boom", "ok2"]);
            assert!(report.get("ok").map_or(false, |r| r.outcome().is_pass()));
            assert!(report.get("ok2").map_or(false, |r| r.outcome().is_pass()));
            match report.get("boom").map(CaseResult::outcome) {
                Some(Outcome::Error(crate::Fault::InvalidCase(msg))) => {
                    assert!(msg.contains("factory bug"));
                }
                other => panic!("Expected invalid case, got {:?}", other),
            }
        }
    }
}
