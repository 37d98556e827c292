//! Storage cache tests: read-through behavior, invalidation, observers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use astrolabe::storage::{DefinitionType, EdgeType, LocationType, NodeType, SqliteStorage};
use astrolabe::StorageCache;
use tempfile::TempDir;

fn storage_handle(dir: &TempDir) -> Arc<Mutex<SqliteStorage>> {
    let mut storage = SqliteStorage::open(&dir.path().join("test.adb")).unwrap();
    storage.init().unwrap();
    Arc::new(Mutex::new(storage))
}

#[test]
fn test_reads_without_subject_return_defaults() {
    let cache = StorageCache::new();

    assert!(!cache.has_subject());
    assert!(cache.get_node_by_serialized_name("anything").is_none());
    assert!(cache.get_all_errors().is_empty());
    assert_eq!(cache.get_storage_stats().node_count, 0);
    assert_eq!(cache.get_error_count().total, 0);
}

#[test]
fn test_reads_forward_to_subject() {
    let dir = TempDir::new().unwrap();
    let handle = storage_handle(&dir);
    handle
        .lock()
        .unwrap()
        .add_node(NodeType::Class, "app::Widget", DefinitionType::Explicit);

    let cache = StorageCache::new();
    cache.set_subject(Some(Arc::clone(&handle)));

    let node = cache.get_node_by_serialized_name("app::Widget").unwrap();
    assert_eq!(node.node_type, NodeType::Class);
    assert_eq!(cache.get_storage_stats().node_count, 1);
}

#[test]
fn test_every_typed_reader_forwards() {
    let dir = TempDir::new().unwrap();
    let cache = StorageCache::new();
    cache.set_subject(Some(storage_handle(&dir)));

    let (file, class, edge) = cache
        .with_storage_mut(|s| {
            let source_path = dir.path().join("w.c");
            std::fs::write(&source_path, "class Widget // widget\n").unwrap();
            let file = s.add_file("w.c", &source_path.to_string_lossy(), "0");
            let class = s.add_node(NodeType::Class, "Widget", DefinitionType::Explicit);
            let field = s.add_node(NodeType::Field, "Widget::x", DefinitionType::Explicit);
            let edge = s.add_edge(EdgeType::Member, class, field);
            s.add_source_location(class, file, 1, 7, 1, 12, LocationType::Token);
            s.add_error("oops", false, "w.c", 1, 1);
            (file, class, edge)
        })
        .unwrap();

    assert_eq!(cache.get_node_by_id(class).unwrap().serialized_name, "Widget");
    assert_eq!(cache.get_edges_by_source_id(class)[0].id, edge);
    assert_eq!(cache.get_file_by_path(
        &dir.path().join("w.c").to_string_lossy()).unwrap().id, file);
    assert_eq!(cache.get_source_locations_for_element_id(class).len(), 1);
    assert_eq!(cache.get_all_errors().len(), 1);
    assert_eq!(cache.get_full_text_search_locations("widget").len(), 2);
    assert_eq!(cache.get_error_count().total, 1);
}

#[test]
fn test_writes_through_cache_invalidate_stats() {
    let dir = TempDir::new().unwrap();
    let cache = StorageCache::new();
    cache.set_subject(Some(storage_handle(&dir)));

    assert_eq!(cache.get_storage_stats().node_count, 0);

    cache.with_storage_mut(|s| {
        s.add_node(NodeType::Function, "f", DefinitionType::Explicit);
    });

    assert_eq!(cache.get_storage_stats().node_count, 1);
}

#[test]
fn test_clear_notifies_observers_but_keeps_backing_store() {
    let dir = TempDir::new().unwrap();
    let handle = storage_handle(&dir);
    handle
        .lock()
        .unwrap()
        .add_node(NodeType::Class, "kept", DefinitionType::Explicit);

    let cache = StorageCache::new();
    cache.set_subject(Some(Arc::clone(&handle)));

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    cache.add_observer(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    cache.clear();
    assert_eq!(notified.load(Ordering::SeqCst), 1);

    // The persisted row is untouched and still readable.
    assert!(cache.get_node_by_serialized_name("kept").is_some());
}

#[test]
fn test_set_subject_none_disconnects() {
    let dir = TempDir::new().unwrap();
    let handle = storage_handle(&dir);
    handle
        .lock()
        .unwrap()
        .add_node(NodeType::Class, "gone", DefinitionType::Explicit);

    let cache = StorageCache::new();
    cache.set_subject(Some(handle));
    assert!(cache.get_node_by_serialized_name("gone").is_some());

    cache.set_subject(None);
    assert!(cache.get_node_by_serialized_name("gone").is_none());
    assert_eq!(cache.get_storage_stats().node_count, 0);
}
