//! Ordered map type for mapping and struct values.
//!
//! [`ValueMap`] wraps [`IndexMap`] so generated values serialize their fields in the
//! order the case author wrote them. Equality used by the comparator is
//! order-insensitive; see [`crate::compare`].

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to values.
///
/// # Examples
///
/// ```rust
/// use serde_conformance::{Value, ValueMap};
///
/// let mut map = ValueMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap(IndexMap<String, Value>);

impl ValueMap {
    #[must_use]
    pub fn new() -> Self {
        ValueMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, Value>> for ValueMap {
    fn from(map: HashMap<String, Value>) -> Self {
        ValueMap(map.into_iter().collect())
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ValueMap(IndexMap::from_iter(iter))
    }
}
