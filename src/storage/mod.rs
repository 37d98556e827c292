//! Persistent graph store over SQLite
//!
//! [`SqliteStorage`] owns the database handle for its lifetime and exposes
//! typed CRUD over the code graph: nodes, edges, files, source locations,
//! local symbols, component accesses, comments and analysis errors.
//!
//! The engine makes no implicit transactional guarantees; bulk writers
//! wrap their work in [`SqliteStorage::begin_transaction`] /
//! [`SqliteStorage::commit_transaction`]. Queries run outside of any
//! write transaction.

pub mod backend;
mod fts;
mod insert;
mod query;
pub mod records;
mod remove;
mod schema;

pub mod indices;

use std::path::Path;

use anyhow::{Context, Result};

use backend::SqliteDatabase;
use indices::{SqliteIndex, StorageMode};

pub use records::{
    AccessType, DefinitionType, EdgeType, ErrorCountInfo, Id, LocationType, NodeType,
    ParseLocation, StorageCommentLocation, StorageComponentAccess, StorageEdge, StorageError,
    StorageFile, StorageLocalSymbol, StorageNode, StorageSourceLocation, StorageStats,
};
pub use schema::STORAGE_VERSION;

/// The storage engine: exclusive owner of one database file
///
/// Not thread-safe; during normal operation all access happens on the
/// scheduler worker thread, and during indexing the project is the sole
/// writer.
pub struct SqliteStorage {
    db: SqliteDatabase,
    mode: StorageMode,
    indices: Vec<(u8, SqliteIndex)>,
}

impl SqliteStorage {
    /// Open (and lazily create) the database file at `path`
    ///
    /// Foreign-key enforcement is switched on; the schema is not touched
    /// until [`init`] runs.
    ///
    /// [`init`]: SqliteStorage::init
    pub fn open(path: &Path) -> Result<SqliteStorage> {
        let db = SqliteDatabase::open(path)
            .with_context(|| format!("Failed to open storage database at {}", path.display()))?;

        Ok(SqliteStorage {
            db,
            mode: StorageMode::Unknown,
            indices: indices::index_policy(),
        })
    }

    /// Version-gate the schema, then make it usable
    ///
    /// Reads `storage_version` from `meta`; any mismatch with the compiled
    /// [`STORAGE_VERSION`] clears the database before reuse. Afterwards the
    /// schema exists and carries the current version tags.
    pub fn init(&mut self) -> Result<()> {
        if schema::is_incompatible(&self.db) && !schema::is_empty(&self.db) {
            self.clear()?;
        } else {
            self.setup()?;
        }
        schema::set_versions(&self.db, env!("CARGO_PKG_VERSION"));
        Ok(())
    }

    /// Create all tables, the FTS virtual table, and the initial index set
    ///
    /// Schema creation failures are fatal and propagate.
    pub fn setup(&mut self) -> Result<()> {
        self.db.execute("PRAGMA foreign_keys=ON;");
        schema::setup_meta_table(&self.db).context("Failed to create meta table")?;
        schema::setup_tables(&self.db).context("Failed to create storage tables")?;

        for (_, index) in &self.indices {
            index.create_on_database(&self.db);
        }
        self.mode = StorageMode::Unknown;
        Ok(())
    }

    /// Drop everything and recreate an empty schema
    pub fn clear(&mut self) -> Result<()> {
        schema::drop_all_tables(&self.db);
        self.setup()
    }

    /// Reconcile the secondary index set with a new workload mode
    ///
    /// Idempotent on an unchanged mode. Callers must quiesce queries
    /// before switching.
    pub fn set_mode(&mut self, mode: StorageMode) {
        if mode == self.mode {
            return;
        }

        for (mask, index) in &self.indices {
            if mask & mode.mask() != 0 {
                index.create_on_database(&self.db);
            } else {
                index.remove_from_database(&self.db);
            }
        }

        self.mode = mode;
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn begin_transaction(&mut self) {
        self.db.execute("BEGIN TRANSACTION;");
    }

    pub fn commit_transaction(&mut self) {
        self.db.execute("COMMIT TRANSACTION;");
    }

    pub fn rollback_transaction(&mut self) {
        self.db.execute("ROLLBACK TRANSACTION;");
    }

    /// Compact the database file
    pub fn optimize_memory(&mut self) {
        self.db.execute("VACUUM;");
    }

    /// Merge the FTS index segments accumulated during ingestion
    pub fn optimize_fts(&mut self) {
        self.db.execute("INSERT INTO file(file) VALUES('optimize');");
    }

    /// Persisted schema tag, 0 when absent
    pub fn storage_version(&self) -> i64 {
        schema::storage_version(&self.db)
    }

    /// Persisted application version string, empty when absent
    pub fn application_version(&self) -> String {
        schema::application_version(&self.db)
    }

    /// Names of the currently materialized user indices, sorted
    pub fn index_names(&self) -> Vec<String> {
        self.db.index_names()
    }

    pub fn database_path(&self) -> &Path {
        self.db.path()
    }

    /// Close the handle explicitly; dropping the engine closes it too
    pub fn close(self) {
        self.db.close();
    }

    pub(crate) fn db(&self) -> &SqliteDatabase {
        &self.db
    }
}
