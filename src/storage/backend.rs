//! Thin facade over the embedded SQLite database
//!
//! All SQL in the crate funnels through this module. Failures carry the
//! SQLite numeric code and message; non-schema failures are logged and
//! reported as default values so the enclosing transaction can decide
//! whether to roll back.

use std::path::{Path, PathBuf};

use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};
use thiserror::Error;

/// A backend failure with SQLite's numeric code and message
#[derive(Debug, Error)]
#[error("sqlite error {code}: {message}")]
pub struct BackendError {
    pub code: i32,
    pub message: String,
}

impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        let code = match &err {
            rusqlite::Error::SqliteFailure(e, _) => e.extended_code,
            _ => -1,
        };
        BackendError {
            code,
            message: err.to_string(),
        }
    }
}

/// Owned handle to a single-file SQLite database
///
/// Foreign-key enforcement is switched on at open. The handle is not
/// thread-safe; callers serialize access (normally via the scheduler
/// worker thread).
pub struct SqliteDatabase {
    conn: Connection,
    path: PathBuf,
}

impl SqliteDatabase {
    /// Open (and lazily create) the database file at `path`
    pub fn open(path: &Path) -> Result<SqliteDatabase, BackendError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(SqliteDatabase {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute a DDL/DML statement, logging any failure
    ///
    /// Returns whether the statement succeeded. Use [`try_execute`] for
    /// statements whose failure must abort the caller (schema creation).
    ///
    /// [`try_execute`]: SqliteDatabase::try_execute
    pub fn execute(&self, sql: &str) -> bool {
        match self.conn.execute_batch(sql) {
            Ok(()) => true,
            Err(err) => {
                let err = BackendError::from(err);
                tracing::error!("{} -- while executing: {}", err, sql);
                false
            }
        }
    }

    /// Execute a statement, propagating failure to the caller
    pub fn try_execute(&self, sql: &str) -> Result<(), BackendError> {
        self.conn.execute_batch(sql).map_err(BackendError::from)
    }

    /// Execute a prepared statement with bound parameters, logging any failure
    ///
    /// String payloads must go through here rather than being interpolated
    /// into SQL text; only trusted integers may be inlined.
    pub fn execute_params(&self, sql: &str, params: &[&dyn ToSql]) -> bool {
        match self.conn.execute(sql, params) {
            Ok(_) => true,
            Err(err) => {
                let err = BackendError::from(err);
                tracing::error!("{} -- while executing: {}", err, sql);
                false
            }
        }
    }

    /// Return a scalar integer from a query, or 0 on failure
    pub fn scalar(&self, sql: &str) -> i64 {
        self.scalar_params(sql, &[])
    }

    /// Return a scalar integer from a prepared query, or 0 on failure
    pub fn scalar_params(&self, sql: &str, params: &[&dyn ToSql]) -> i64 {
        match self.conn.query_row(sql, params, |row| row.get::<_, i64>(0)) {
            Ok(value) => value,
            Err(rusqlite::Error::QueryReturnedNoRows) => 0,
            Err(err) => {
                let err = BackendError::from(err);
                tracing::error!("{} -- while querying: {}", err, sql);
                0
            }
        }
    }

    /// Run a query and map every row through `map`, forward-only
    ///
    /// A failing query yields an empty vector; the failure is logged.
    pub fn query_rows<T, F>(&self, sql: &str, params: &[&dyn ToSql], mut map: F) -> Vec<T>
    where
        F: FnMut(&Row<'_>) -> T,
    {
        let mut stmt = match self.conn.prepare(sql) {
            Ok(stmt) => stmt,
            Err(err) => {
                let err = BackendError::from(err);
                tracing::error!("{} -- while preparing: {}", err, sql);
                return Vec::new();
            }
        };

        let rows = stmt.query_map(params, |row| Ok(map(row)));
        match rows {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(err) => {
                let err = BackendError::from(err);
                tracing::error!("{} -- while querying: {}", err, sql);
                Vec::new()
            }
        }
    }

    /// Rowid assigned by the most recent successful INSERT
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Whether a table with the given name exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.scalar_params(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?;",
            &[&name],
        ) > 0
    }

    /// Names of all user-created indices, sorted
    pub fn index_names(&self) -> Vec<String> {
        let mut names = self.query_rows(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name NOT LIKE 'sqlite_%';",
            &[],
            |row| row_text(row, 0, ""),
        );
        names.sort();
        names
    }

    /// Close the handle, logging any failure to flush
    pub fn close(self) {
        if let Err((_, err)) = self.conn.close() {
            let err = BackendError::from(err);
            tracing::error!("{} -- while closing database", err);
        }
    }
}

/// Read a column as an integer with a default fallback
pub fn row_int(row: &Row<'_>, idx: usize, default: i64) -> i64 {
    row.get::<_, i64>(idx).unwrap_or(default)
}

/// Read a column as a string with a default fallback
pub fn row_text(row: &Row<'_>, idx: usize, default: &str) -> String {
    row.get::<_, String>(idx)
        .unwrap_or_else(|_| default.to_string())
}
