//! Project lifecycle tests: load, version-gate states, refresh cycle.

use std::fs;
use std::path::PathBuf;

use astrolabe::project::file_modification_time;
use astrolabe::storage::indices::StorageMode;
use astrolabe::storage::{DefinitionType, NodeType, SqliteStorage};
use astrolabe::{Project, ProjectSettings, ProjectState, StorageCache};
use tempfile::TempDir;

fn make_project_file(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, "{}").unwrap();
    path
}

#[test]
fn test_database_path_derived_from_settings_path() {
    let dir = TempDir::new().unwrap();
    let settings = ProjectSettings::load(&make_project_file(&dir, "demo.prj")).unwrap();

    assert_eq!(settings.database_path(), dir.path().join("demo.adb"));
}

#[test]
fn test_missing_settings_file_fails_to_load() {
    assert!(ProjectSettings::load(&PathBuf::from("/nonexistent/x.prj")).is_err());
}

#[test]
fn test_load_hands_storage_to_the_cache() {
    let dir = TempDir::new().unwrap();
    let settings = ProjectSettings::load(&make_project_file(&dir, "demo.prj")).unwrap();
    let cache = StorageCache::new();

    let mut project = Project::new(settings);
    project.load(&cache).unwrap();

    assert_eq!(project.state(), ProjectState::Empty);
    assert!(cache.has_subject());
    assert_eq!(cache.get_storage_stats().node_count, 0);

    let storage = project.storage().unwrap();
    assert_eq!(
        storage.lock().unwrap().database_path(),
        dir.path().join("demo.adb")
    );
}

#[test]
fn test_refresh_cycle_drives_storage_mode() {
    let dir = TempDir::new().unwrap();
    let settings = ProjectSettings::load(&make_project_file(&dir, "demo.prj")).unwrap();
    let cache = StorageCache::new();

    let mut project = Project::new(settings);
    project.load(&cache).unwrap();

    // A fresh database wants indexing.
    assert!(project.refresh(false).unwrap());
    assert_eq!(project.state(), ProjectState::Loaded);
    {
        let storage = project.storage().unwrap().lock().unwrap();
        assert_eq!(storage.mode(), StorageMode::Write);
    }

    project.finish_indexing();
    {
        let storage = project.storage().unwrap().lock().unwrap();
        assert_eq!(storage.mode(), StorageMode::Read);
    }

    // Nothing changed; an unforced refresh is a no-op.
    assert!(!project.refresh(false).unwrap());
    // A settings change makes the next refresh index again.
    project.set_state_settings_updated();
    assert!(project.refresh(false).unwrap());
    // Force always wins.
    project.finish_indexing();
    assert!(project.refresh(true).unwrap());
}

#[test]
fn test_refresh_before_load_is_an_error() {
    let dir = TempDir::new().unwrap();
    let settings = ProjectSettings::load(&make_project_file(&dir, "demo.prj")).unwrap();

    let mut project = Project::new(settings);
    assert!(project.refresh(true).is_err());
}

#[test]
fn test_reload_of_unchanged_files_stays_loaded() {
    let dir = TempDir::new().unwrap();
    let settings_path = make_project_file(&dir, "demo.prj");
    let source_path = dir.path().join("lib.c");
    fs::write(&source_path, "int x;\n").unwrap();

    let cache = StorageCache::new();
    let mut project = Project::new(ProjectSettings::load(&settings_path).unwrap());
    project.load(&cache).unwrap();
    project.storage().unwrap().lock().unwrap().add_file(
        "lib.c",
        &source_path.to_string_lossy(),
        &file_modification_time(&source_path),
    );

    let mut reloaded = Project::new(ProjectSettings::load(&settings_path).unwrap());
    reloaded.load(&cache).unwrap();

    assert_eq!(reloaded.state(), ProjectState::Loaded);
    assert!(!reloaded.refresh(false).unwrap());
}

#[test]
fn test_changed_file_marks_project_outdated() {
    let dir = TempDir::new().unwrap();
    let settings_path = make_project_file(&dir, "demo.prj");
    let source_path = dir.path().join("lib.c");
    fs::write(&source_path, "int x;\n").unwrap();

    let cache = StorageCache::new();
    let mut project = Project::new(ProjectSettings::load(&settings_path).unwrap());
    project.load(&cache).unwrap();
    // Stored with a modification time that cannot match the filesystem,
    // as if the file had been rewritten after indexing.
    project.storage().unwrap().lock().unwrap().add_file(
        "lib.c",
        &source_path.to_string_lossy(),
        "123",
    );

    let mut reloaded = Project::new(ProjectSettings::load(&settings_path).unwrap());
    reloaded.load(&cache).unwrap();

    assert_eq!(reloaded.state(), ProjectState::Outdated);
    assert!(reloaded.refresh(false).unwrap());
}

#[test]
fn test_deleted_file_marks_project_outdated() {
    let dir = TempDir::new().unwrap();
    let settings_path = make_project_file(&dir, "demo.prj");
    let source_path = dir.path().join("gone.c");
    fs::write(&source_path, "int x;\n").unwrap();

    let cache = StorageCache::new();
    let mut project = Project::new(ProjectSettings::load(&settings_path).unwrap());
    project.load(&cache).unwrap();
    project.storage().unwrap().lock().unwrap().add_file(
        "gone.c",
        &source_path.to_string_lossy(),
        &file_modification_time(&source_path),
    );

    fs::remove_file(&source_path).unwrap();

    let mut reloaded = Project::new(ProjectSettings::load(&settings_path).unwrap());
    reloaded.load(&cache).unwrap();

    assert_eq!(reloaded.state(), ProjectState::Outdated);
}

#[test]
fn test_outversioned_database_is_detected_and_cleared() {
    let dir = TempDir::new().unwrap();
    let settings_path = make_project_file(&dir, "demo.prj");
    let db_path = dir.path().join("demo.adb");

    // Populate a database, then stamp it with a foreign schema version.
    let mut storage = SqliteStorage::open(&db_path).unwrap();
    storage.init().unwrap();
    storage.add_node(NodeType::Class, "stale", DefinitionType::Explicit);
    storage.close();
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "UPDATE meta SET value = '7' WHERE key = 'storage_version';",
        [],
    )
    .unwrap();
    conn.close().unwrap();

    let cache = StorageCache::new();
    let mut project = Project::new(ProjectSettings::load(&settings_path).unwrap());
    project.load(&cache).unwrap();

    assert_eq!(project.state(), ProjectState::Outversioned);
    assert_eq!(cache.get_storage_stats().node_count, 0);
    // Outversioned data wants a re-index.
    assert!(project.refresh(false).unwrap());
}
