//! Deletion operations
//!
//! Elements are the single deletion root: removing an element row cascades
//! to its node/edge row and transitively to every source location and
//! component access referencing it. The FTS `file` table cannot carry
//! foreign keys, so file rows are cleaned up explicitly alongside their
//! elements.

use rusqlite::types::ToSql;

use super::backend::row_int;
use super::records::Id;
use super::SqliteStorage;

/// Render an id list for interpolation into an IN clause
///
/// Only trusted integers may be inlined; strings go through prepared
/// statements.
fn id_list(ids: &[Id]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SqliteStorage {
    /// Delete one element; cascades through the graph
    pub fn remove_element(&mut self, id: Id) {
        self.remove_elements(&[id]);
    }

    /// Delete a set of elements; cascades through the graph
    pub fn remove_elements(&mut self, ids: &[Id]) {
        if ids.is_empty() {
            return;
        }
        let list = id_list(ids);
        self.db()
            .execute(&format!("DELETE FROM element WHERE id IN ({});", list));
        self.db()
            .execute(&format!("DELETE FROM file WHERE id IN ({});", list));
    }

    /// Delete all source locations inside the given files, then every
    /// element those locations referenced that no surviving location keeps
    /// reachable
    ///
    /// An element survives as long as any location in a file outside the
    /// set still references it.
    pub fn remove_elements_with_location_in_files(&mut self, file_node_ids: &[Id]) {
        if file_node_ids.is_empty() {
            return;
        }
        let files = id_list(file_node_ids);

        let referenced = self.db().query_rows(
            &format!(
                "SELECT DISTINCT element_id FROM source_location \
                    WHERE file_node_id IN ({}) AND element_id IS NOT NULL;",
                files
            ),
            &[],
            |row| row_int(row, 0, 0),
        );

        self.db().execute(&format!(
            "DELETE FROM source_location WHERE file_node_id IN ({});",
            files
        ));

        if referenced.is_empty() {
            return;
        }

        let orphaned: Vec<Id> = self.db().query_rows(
            &format!(
                "SELECT id FROM element WHERE id IN ({}) AND NOT EXISTS (\
                    SELECT 1 FROM source_location WHERE element_id = element.id\
                );",
                id_list(&referenced)
            ),
            &[],
            |row| row_int(row, 0, 0),
        );

        self.remove_elements(&orphaned);
    }

    /// Delete all diagnostics recorded against the given file paths
    pub fn remove_errors_in_files(&mut self, file_paths: &[String]) {
        if file_paths.is_empty() {
            return;
        }
        let placeholders = vec!["?"; file_paths.len()].join(", ");
        let params: Vec<&dyn ToSql> = file_paths.iter().map(|p| p as &dyn ToSql).collect();
        self.db().execute_params(
            &format!("DELETE FROM error WHERE file_path IN ({});", placeholders),
            &params,
        );
    }
}
