//! Append-only catalog of cases.
//!
//! ```rust
//! use serde_conformance::{value, CaseRegistry, ConformanceCase, Error, Shape};
//!
//! let mut registry = CaseRegistry::new();
//! registry
//!     .register(ConformanceCase::round_trip("a", Shape::I64, || value!(1)))
//!     .unwrap();
//!
//! let err = registry
//!     .register(ConformanceCase::round_trip("a", Shape::I64, || value!(2)))
//!     .unwrap_err();
//! assert_eq!(err, Error::DuplicateCase("a".to_string()));
//! ```

use crate::catalog;
use crate::{ConformanceCase, Error, Result};
use indexmap::IndexMap;

/// Cases keyed by id, in registration order.
#[derive(Clone, Debug, Default)]
pub struct CaseRegistry {
    cases: IndexMap<String, ConformanceCase>,
}

impl CaseRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in catalog from [`catalog::standard_cases`].
    ///
    /// # Panics
    ///
    /// Panics if the built-in catalog repeats a case id.
    #[must_use]
    pub fn standard() -> Self {
        match Self::from_cases(catalog::standard_cases()) {
            Ok(registry) => registry,
            Err(err) => panic!("built-in catalog is inconsistent: {}", err),
        }
    }

    /// Registers `cases` in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCase`] for the first repeated id.
    pub fn from_cases<I>(cases: I) -> Result<Self>
    where
        I: IntoIterator<Item = ConformanceCase>,
    {
        let mut registry = Self::new();
        for case in cases {
            registry.register(case)?;
        }
        Ok(registry)
    }

    /// Appends a case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCase`] if a case with the same id is registered.
    pub fn register(&mut self, case: ConformanceCase) -> Result<()> {
        if self.cases.contains_key(case.id()) {
            return Err(Error::DuplicateCase(case.id().to_string()));
        }
        self.cases.insert(case.id().to_string(), case);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConformanceCase> {
        self.cases.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Iterates cases in registration order. The iterator is lazy and can be cloned to
    /// restart from the same position.
    pub fn all_cases(&self) -> impl Iterator<Item = &ConformanceCase> + Clone + '_ {
        self.cases.values()
    }
}
