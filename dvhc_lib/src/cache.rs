//! Session cache of parsed documents backed by `DashMap` for concurrent access.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Thread-safe memo of parsed JSON documents keyed by file name.
///
/// Misses are cached too: a document that could not be read is reported
/// once and stays absent for the rest of the session.
#[derive(Default)]
pub struct DocumentCache {
    store: DashMap<String, Option<Arc<Value>>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached document for `name`, or runs `load` once and
    /// caches its result.
    pub fn get_or_load<F>(&self, name: &str, load: F) -> Option<Arc<Value>>
    where
        F: FnOnce() -> Option<Value>,
    {
        if let Some(entry) = self.store.get(name) {
            return entry.clone();
        }
        let loaded = load().map(Arc::new);
        self.store
            .entry(name.to_string())
            .or_insert(loaded)
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }

    /// Forgets every document.
    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn cache_loads_once() {
        let cache = DocumentCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Some(json!({"a": 1}))
        };
        assert_eq!(cache.get_or_load("mapping-01.json", load).as_deref(), Some(&json!({"a": 1})));
        assert_eq!(cache.get_or_load("mapping-01.json", load).as_deref(), Some(&json!({"a": 1})));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn cache_remembers_misses() {
        let cache = DocumentCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            None
        };
        assert!(cache.get_or_load("rev-99.json", load).is_none());
        assert!(cache.get_or_load("rev-99.json", load).is_none());
        assert_eq!(calls.get(), 1);
        assert!(cache.contains("rev-99.json"));
    }

    #[test]
    fn cache_clear() {
        let cache = DocumentCache::new();
        cache.get_or_load("a.json", || Some(json!(1)));
        cache.get_or_load("b.json", || None);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
