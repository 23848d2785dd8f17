//! Configuration for a harness run.
//!
//! ```rust
//! use serde_conformance::RunOptions;
//!
//! // Every case, one at a time, never stopping early
//! let options = RunOptions::new();
//! assert_eq!(options.workers, 1);
//!
//! // Only the enum cases, on four threads
//! let options = RunOptions::new().with_filter("enum.").with_workers(4);
//! assert!(options.selects("enum.unknown_name"));
//! assert!(!options.selects("boundary.i64_min"));
//! ```

/// Options controlling which cases run and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Only cases whose id starts with this prefix run.
    pub filter: Option<String>,
    /// Stop scheduling cases after the first non-passing result.
    pub fail_fast: bool,
    /// Number of worker threads. `1` runs on the calling thread.
    pub workers: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            filter: None,
            fail_fast: false,
            workers: 1,
        }
    }
}

impl RunOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, prefix: impl Into<String>) -> Self {
        self.filter = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Sets the worker count. Zero is treated as one.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Returns `true` if the case with this id is selected by the filter.
    #[must_use]
    pub fn selects(&self, id: &str) -> bool {
        self.filter
            .as_deref()
            .map_or(true, |prefix| id.starts_with(prefix))
    }
}
