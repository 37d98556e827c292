//! The currently open project
//!
//! A project pairs a settings file (opaque to this crate, parsed by the
//! analyzer layer) with the storage engine for its database. The
//! coordinator owns at most one project at a time; during indexing the
//! project is the sole writer to its engine.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};

use crate::cache::{StorageCache, StorageHandle};
use crate::storage::indices::StorageMode;
use crate::storage::{SqliteStorage, STORAGE_VERSION};

/// Extension of the database file derived from the settings path
const DATABASE_EXTENSION: &str = "adb";

/// Handle to a project settings file
///
/// The file's content is owned by the analyzer layer; this crate only
/// derives the database location from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    settings_path: PathBuf,
}

impl ProjectSettings {
    /// Bind to a settings file, which must exist
    pub fn load(path: &Path) -> Result<ProjectSettings> {
        if !path.is_file() {
            anyhow::bail!("Project settings file not found: {}", path.display());
        }
        Ok(ProjectSettings {
            settings_path: path.to_path_buf(),
        })
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Database file next to the settings file, same stem
    pub fn database_path(&self) -> PathBuf {
        self.settings_path.with_extension(DATABASE_EXTENSION)
    }
}

/// Load/refresh state of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectState {
    /// Database exists but has never been indexed
    Empty,
    /// Database holds current data from a compatible engine
    Loaded,
    /// Indexed files changed on disk since the last index run
    Outdated,
    /// Persisted data predates the current schema; was cleared on load
    Outversioned,
    /// Settings changed since the last index run
    SettingsUpdated,
}

/// Filesystem mtime as seconds since the Unix epoch, "0" when unreadable
///
/// Ingesters pass this to `add_file` so that later loads can compare the
/// stored value against the filesystem.
pub fn file_modification_time(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs().to_string())
        .unwrap_or_else(|| "0".to_string())
}

/// Whether any stored file is missing on disk or changed since indexing
fn has_stale_files(storage: &SqliteStorage) -> bool {
    storage.get_all_files().iter().any(|file| {
        !file.path.is_empty()
            && file_modification_time(Path::new(&file.path)) != file.modification_time
    })
}

/// One open project: settings plus its storage engine
pub struct Project {
    settings: ProjectSettings,
    storage: Option<StorageHandle>,
    state: ProjectState,
}

impl Project {
    pub fn new(settings: ProjectSettings) -> Project {
        Project {
            settings,
            storage: None,
            state: ProjectState::Empty,
        }
    }

    pub fn settings_path(&self) -> &Path {
        self.settings.settings_path()
    }

    pub fn state(&self) -> ProjectState {
        self.state
    }

    pub fn storage(&self) -> Option<&StorageHandle> {
        self.storage.as_ref()
    }

    /// Open and version-gate the project database, then hand it to the cache
    ///
    /// A version mismatch clears the persisted data; stored files whose
    /// modification time no longer matches the filesystem mark the project
    /// outdated. Both states want re-indexing on the next refresh.
    pub fn load(&mut self, cache: &StorageCache) -> Result<()> {
        let database_path = self.settings.database_path();
        let mut storage = SqliteStorage::open(&database_path).with_context(|| {
            format!(
                "Failed to open project database {}",
                database_path.display()
            )
        })?;

        let persisted_version = storage.storage_version();
        storage.init().context("Failed to initialize project storage")?;

        self.state = if persisted_version == 0 {
            ProjectState::Empty
        } else if persisted_version != STORAGE_VERSION {
            ProjectState::Outversioned
        } else if has_stale_files(&storage) {
            ProjectState::Outdated
        } else {
            ProjectState::Loaded
        };

        let handle: StorageHandle = Arc::new(Mutex::new(storage));
        self.storage = Some(Arc::clone(&handle));
        cache.set_subject(Some(handle));
        Ok(())
    }

    /// Mark the project as needing a re-index after a settings change
    pub fn set_state_settings_updated(&mut self) {
        self.state = ProjectState::SettingsUpdated;
    }

    /// Start a refresh; returns whether indexing was started
    ///
    /// Indexing is warranted when forced or when the state says the
    /// persisted data is not current. Starting indexing switches the
    /// engine to write mode; the analyzer drives ingestion from there.
    pub fn refresh(&mut self, force: bool) -> Result<bool> {
        let needs_index = force || self.state != ProjectState::Loaded;
        if !needs_index {
            return Ok(false);
        }

        let storage = self
            .storage
            .as_ref()
            .context("Project refresh requested before load")?;
        storage.lock().unwrap().set_mode(StorageMode::Write);

        self.state = ProjectState::Loaded;
        Ok(true)
    }

    /// End an index run: merge FTS segments and return to read mode
    pub fn finish_indexing(&mut self) {
        if let Some(storage) = &self.storage {
            let mut storage = storage.lock().unwrap();
            storage.optimize_fts();
            storage.set_mode(StorageMode::Read);
        }
    }
}
