//! Read-through cache in front of the storage engine
//!
//! Interactive consumers read through this facade instead of holding the
//! engine directly. The cache owns no storage: its subject is a shared
//! handle to the current project's engine, swapped on project load and
//! dropped when no project is open. Observers are notified whenever the
//! cached view is invalidated so UI layers can repaint.

use std::sync::{Arc, Mutex};

use crate::storage::{
    ErrorCountInfo, Id, ParseLocation, SqliteStorage, StorageEdge, StorageError, StorageFile,
    StorageNode, StorageSourceLocation, StorageStats,
};

/// Shared handle to the engine; the mutex serializes access
pub type StorageHandle = Arc<Mutex<SqliteStorage>>;

/// Invalidation callback; runs on whichever thread invalidates the cache
pub type CacheObserver = Box<dyn Fn() + Send + Sync>;

/// Write-through, read-through facade over the storage engine
pub struct StorageCache {
    subject: Mutex<Option<StorageHandle>>,
    observers: Mutex<Vec<CacheObserver>>,
    cached_stats: Mutex<Option<StorageStats>>,
}

impl StorageCache {
    pub fn new() -> StorageCache {
        StorageCache {
            subject: Mutex::new(None),
            observers: Mutex::new(Vec::new()),
            cached_stats: Mutex::new(None),
        }
    }

    /// Swap the engine the cache reads through
    ///
    /// Passing `None` disconnects the cache while no project is open.
    pub fn set_subject(&self, subject: Option<StorageHandle>) {
        *self.subject.lock().unwrap() = subject;
        self.invalidate();
    }

    pub fn has_subject(&self) -> bool {
        self.subject.lock().unwrap().is_some()
    }

    /// Drop cached state and notify observers
    ///
    /// The backing store is untouched; clearing persisted data is the
    /// engine's job.
    pub fn clear(&self) {
        self.invalidate();
    }

    /// Register an invalidation observer
    pub fn add_observer(&self, observer: CacheObserver) {
        self.observers.lock().unwrap().push(observer);
    }

    /// Run a closure against the current engine, if any
    pub fn with_storage<T>(&self, f: impl FnOnce(&SqliteStorage) -> T) -> Option<T> {
        let subject = self.subject.lock().unwrap().clone();
        subject.map(|handle| {
            let storage = handle.lock().unwrap();
            f(&storage)
        })
    }

    /// Run a mutating closure against the current engine, if any
    ///
    /// Every write invalidates the cached aggregates.
    pub fn with_storage_mut<T>(&self, f: impl FnOnce(&mut SqliteStorage) -> T) -> Option<T> {
        let subject = self.subject.lock().unwrap().clone();
        let result = subject.map(|handle| {
            let mut storage = handle.lock().unwrap();
            f(&mut storage)
        });
        if result.is_some() {
            *self.cached_stats.lock().unwrap() = None;
        }
        result
    }

    // ----- typed readers -----

    pub fn get_node_by_id(&self, id: Id) -> Option<StorageNode> {
        self.with_storage(|s| s.get_node_by_id(id)).flatten()
    }

    pub fn get_node_by_serialized_name(&self, serialized_name: &str) -> Option<StorageNode> {
        self.with_storage(|s| s.get_node_by_serialized_name(serialized_name))
            .flatten()
    }

    pub fn get_edges_by_source_id(&self, source_node_id: Id) -> Vec<StorageEdge> {
        self.with_storage(|s| s.get_edges_by_source_id(source_node_id))
            .unwrap_or_default()
    }

    pub fn get_file_by_path(&self, path: &str) -> Option<StorageFile> {
        self.with_storage(|s| s.get_file_by_path(path)).flatten()
    }

    pub fn get_source_locations_for_element_id(&self, element_id: Id) -> Vec<StorageSourceLocation> {
        self.with_storage(|s| s.get_source_locations_for_element_id(element_id))
            .unwrap_or_default()
    }

    pub fn get_all_errors(&self) -> Vec<StorageError> {
        self.with_storage(|s| s.get_all_errors()).unwrap_or_default()
    }

    pub fn get_full_text_search_locations(&self, term: &str) -> Vec<ParseLocation> {
        self.with_storage(|s| s.get_full_text_search_locations(term))
            .unwrap_or_default()
    }

    // ----- aggregates for the logging hook -----

    /// Aggregate counts, cached until the next invalidation
    pub fn get_storage_stats(&self) -> StorageStats {
        if let Some(stats) = *self.cached_stats.lock().unwrap() {
            return stats;
        }
        let stats = self
            .with_storage(|s| s.get_storage_stats())
            .unwrap_or_default();
        *self.cached_stats.lock().unwrap() = Some(stats);
        stats
    }

    pub fn get_error_count(&self) -> ErrorCountInfo {
        self.with_storage(|s| s.get_error_count()).unwrap_or_default()
    }

    fn invalidate(&self) {
        *self.cached_stats.lock().unwrap() = None;
        let observers = self.observers.lock().unwrap();
        for observer in observers.iter() {
            observer();
        }
    }
}

impl Default for StorageCache {
    fn default() -> Self {
        StorageCache::new()
    }
}
