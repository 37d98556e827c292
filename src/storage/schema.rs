//! Table definitions, meta values and the version gate
//!
//! The schema ties the heterogeneous graph together through the `element`
//! table: every node and edge id is also an element id, so deleting an
//! element cascades through the whole graph in one statement. The `file`
//! table is an FTS4 virtual table so file content is full-text searchable;
//! FTS4 keeps column values (and their types) in its backing store, which
//! lets integer file ids join against `node.id`.

use super::backend::{BackendError, SqliteDatabase};

/// Compiled-in schema tag; any persisted mismatch triggers a full clear
pub const STORAGE_VERSION: i64 = 8;

/// Tables in reverse foreign-key order, safe to drop front to back
const TABLES_REVERSE_FK_ORDER: [&str; 10] = [
    "error",
    "comment_location",
    "component_access",
    "source_location",
    "local_symbol",
    "file",
    "node",
    "edge",
    "element",
    "meta",
];

/// Create the meta table if absent
///
/// Kept separate from the graph tables: the version gate reads meta
/// before deciding whether the rest of the schema survives.
pub fn setup_meta_table(db: &SqliteDatabase) -> Result<(), BackendError> {
    db.try_execute(
        "CREATE TABLE IF NOT EXISTS meta(\
            id INTEGER, \
            key TEXT, \
            value TEXT, \
            PRIMARY KEY(id)\
        );",
    )
}

/// Create all graph tables and the FTS virtual table if absent
pub fn setup_tables(db: &SqliteDatabase) -> Result<(), BackendError> {
    db.try_execute(
        "CREATE TABLE IF NOT EXISTS element(\
            id INTEGER, \
            PRIMARY KEY(id)\
        );",
    )?;

    db.try_execute(
        "CREATE TABLE IF NOT EXISTS node(\
            id INTEGER NOT NULL, \
            type INTEGER NOT NULL, \
            serialized_name TEXT, \
            definition_type INTEGER NOT NULL, \
            PRIMARY KEY(id), \
            FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE\
        );",
    )?;

    db.try_execute(
        "CREATE TABLE IF NOT EXISTS edge(\
            id INTEGER NOT NULL, \
            type INTEGER NOT NULL, \
            source_node_id INTEGER NOT NULL, \
            target_node_id INTEGER NOT NULL, \
            PRIMARY KEY(id), \
            FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE, \
            FOREIGN KEY(source_node_id) REFERENCES node(id) ON DELETE CASCADE, \
            FOREIGN KEY(target_node_id) REFERENCES node(id) ON DELETE CASCADE\
        );",
    )?;

    db.try_execute(
        "CREATE TABLE IF NOT EXISTS local_symbol(\
            id INTEGER NOT NULL, \
            name TEXT, \
            PRIMARY KEY(id), \
            FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE\
        );",
    )?;

    db.try_execute(
        "CREATE TABLE IF NOT EXISTS source_location(\
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            element_id INTEGER, \
            file_node_id INTEGER, \
            start_line INTEGER, \
            start_column INTEGER, \
            end_line INTEGER, \
            end_column INTEGER, \
            type INTEGER, \
            FOREIGN KEY(element_id) REFERENCES element(id) ON DELETE CASCADE, \
            FOREIGN KEY(file_node_id) REFERENCES node(id) ON DELETE CASCADE\
        );",
    )?;

    db.try_execute(
        "CREATE TABLE IF NOT EXISTS component_access(\
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            edge_id INTEGER, \
            type INTEGER, \
            FOREIGN KEY(edge_id) REFERENCES edge(id) ON DELETE CASCADE\
        );",
    )?;

    db.try_execute(
        "CREATE TABLE IF NOT EXISTS comment_location(\
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            file_node_id INTEGER, \
            start_line INTEGER, \
            start_column INTEGER, \
            end_line INTEGER, \
            end_column INTEGER, \
            FOREIGN KEY(file_node_id) REFERENCES node(id) ON DELETE CASCADE\
        );",
    )?;

    db.try_execute(
        "CREATE TABLE IF NOT EXISTS error(\
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            message TEXT, \
            fatal INTEGER, \
            file_path TEXT, \
            line_number INTEGER, \
            column_number INTEGER\
        );",
    )?;

    // FTS virtual table over file content; column order matters for the
    // offsets() decoding in the search path.
    db.try_execute(
        "CREATE VIRTUAL TABLE IF NOT EXISTS file USING fts4(\
            id INTEGER, \
            path TEXT, \
            modification_time TEXT, \
            content TEXT, \
            loc INTEGER\
        );",
    )?;

    Ok(())
}

/// Drop every table in reverse foreign-key order
///
/// Foreign keys are disabled for the duration of the drop and re-enabled
/// afterwards. Drop failures are logged but do not abort the clear.
pub fn drop_all_tables(db: &SqliteDatabase) {
    db.execute("PRAGMA foreign_keys=OFF;");
    for table in TABLES_REVERSE_FK_ORDER {
        db.execute(&format!("DROP TABLE IF EXISTS main.{};", table));
    }
    db.execute("PRAGMA foreign_keys=ON;");
}

/// Read a meta value by key, if the meta table exists
pub fn meta_value(db: &SqliteDatabase, key: &str) -> Option<String> {
    if !db.table_exists("meta") {
        return None;
    }
    db.query_rows(
        "SELECT value FROM meta WHERE key = ?;",
        &[&key],
        |row| super::backend::row_text(row, 0, ""),
    )
    .into_iter()
    .next()
}

/// Upsert a meta value keyed by `key`
pub fn set_meta_value(db: &SqliteDatabase, key: &str, value: &str) {
    db.execute_params(
        "INSERT OR REPLACE INTO meta(id, key, value) VALUES(\
            (SELECT id FROM meta WHERE key = ?), ?, ?\
        );",
        &[&key, &key, &value],
    );
}

/// Persisted schema tag, or 0 when absent/unreadable
pub fn storage_version(db: &SqliteDatabase) -> i64 {
    meta_value(db, "storage_version")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(0)
}

/// Persisted application version string, empty when absent
pub fn application_version(db: &SqliteDatabase) -> String {
    meta_value(db, "application_version").unwrap_or_default()
}

/// Write back the compiled storage version and the application version
pub fn set_versions(db: &SqliteDatabase, application_version: &str) {
    set_meta_value(db, "storage_version", &STORAGE_VERSION.to_string());
    set_meta_value(db, "application_version", application_version);
}

/// Whether the database carries no version information at all
pub fn is_empty(db: &SqliteDatabase) -> bool {
    storage_version(db) == 0 && application_version(db).is_empty()
}

/// Whether the persisted schema tag differs from the compiled one
pub fn is_incompatible(db: &SqliteDatabase) -> bool {
    let version = storage_version(db);
    version == 0 || version != STORAGE_VERSION
}
