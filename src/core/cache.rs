//! Path-keyed view cache and its invalidation capability
//!
//! Mutations only see the [`PathInvalidator`] trait. The server wires in a
//! [`ViewCache`] that holds rendered list pages keyed by path and query
//! string; invalidating a path drops every cached page under it so the next
//! read goes back to storage.
//!
//! Each path also carries a generation that every invalidation bumps. Readers
//! take the generation before going to storage and hand it back to
//! [`ViewCache::put_if_current`], which refuses views built from data an
//! invalidation has since superseded.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

/// Marks a cached view as stale
pub trait PathInvalidator: Send + Sync {
    fn invalidate(&self, path: &str);
}

/// Cached pages under one path
#[derive(Debug, Default)]
struct PathViews {
    generation: u64,
    pages: HashMap<String, Value>,
}

/// Cached JSON views, keyed by path then by query string
#[derive(Debug, Default)]
pub struct ViewCache {
    entries: RwLock<HashMap<String, PathViews>>,
    invalidations: AtomicUsize,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str, query: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(path)
            .and_then(|views| views.pages.get(query))
            .cloned()
    }

    /// Current generation of `path`; take it before reading storage
    pub fn generation(&self, path: &str) -> u64 {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path).map_or(0, |views| views.generation)
    }

    /// Store `view` only if `path` has not been invalidated since `generation`
    /// was read. Returns whether the view was cached.
    pub fn put_if_current(&self, path: &str, query: &str, view: Value, generation: u64) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let views = entries.entry(path.to_string()).or_default();
        if views.generation != generation {
            return false;
        }
        views.pages.insert(query.to_string(), view);
        true
    }

    /// Number of invalidations received since creation
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

impl PathInvalidator for ViewCache {
    fn invalidate(&self, path: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let views = entries.entry(path.to_string()).or_default();
        views.pages.clear();
        views.generation += 1;
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = %path, "view invalidated");
    }
}

/// Records invalidated paths in order, without caching anything
#[derive(Debug, Default)]
pub struct InvalidationLog {
    paths: Mutex<Vec<String>>,
}

impl InvalidationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PathInvalidator for InvalidationLog {
    fn invalidate(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_string());
    }
}
