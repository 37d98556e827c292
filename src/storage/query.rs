//! Typed retrieval and aggregates
//!
//! Selectors return value records, never raw cursors. The SELECT list per
//! entity is fixed here; callers only supply the predicate. Rows carrying
//! sentinel values (missing id, missing type) are filtered out before they
//! reach callers.

use rusqlite::types::ToSql;
use rusqlite::Row;

use super::backend::{row_int, row_text};
use super::records::{
    AccessType, DefinitionType, EdgeType, ErrorCountInfo, Id, LocationType, NodeType,
    StorageCommentLocation, StorageComponentAccess, StorageEdge, StorageError, StorageFile,
    StorageLocalSymbol, StorageNode, StorageSourceLocation, StorageStats,
};
use super::SqliteStorage;

fn node_from_row(row: &Row<'_>) -> Option<StorageNode> {
    let id = row_int(row, 0, 0);
    let node_type = row_int(row, 1, -1);
    if id == 0 || node_type == -1 {
        return None;
    }
    Some(StorageNode {
        id,
        node_type: NodeType::from_i64(node_type),
        serialized_name: row_text(row, 2, ""),
        definition_type: DefinitionType::from_i64(row_int(row, 3, 0)),
    })
}

fn edge_from_row(row: &Row<'_>) -> Option<StorageEdge> {
    let id = row_int(row, 0, 0);
    let edge_type = row_int(row, 1, -1);
    if id == 0 || edge_type == -1 {
        return None;
    }
    Some(StorageEdge {
        id,
        edge_type: EdgeType::from_i64(edge_type),
        source_node_id: row_int(row, 2, 0),
        target_node_id: row_int(row, 3, 0),
    })
}

fn file_from_row(row: &Row<'_>) -> Option<StorageFile> {
    let id = row_int(row, 0, 0);
    if id == 0 {
        return None;
    }
    Some(StorageFile {
        id,
        path: row_text(row, 1, ""),
        modification_time: row_text(row, 2, ""),
        content: row_text(row, 3, ""),
        loc: row_int(row, 4, 0),
    })
}

fn local_symbol_from_row(row: &Row<'_>) -> Option<StorageLocalSymbol> {
    let id = row_int(row, 0, 0);
    if id == 0 {
        return None;
    }
    Some(StorageLocalSymbol {
        id,
        name: row_text(row, 1, ""),
    })
}

fn source_location_from_row(row: &Row<'_>) -> Option<StorageSourceLocation> {
    let id = row_int(row, 0, 0);
    let location_type = row_int(row, 7, -1);
    if id == 0 || location_type == -1 {
        return None;
    }
    Some(StorageSourceLocation {
        id,
        element_id: row_int(row, 1, 0),
        file_node_id: row_int(row, 2, 0),
        start_line: row_int(row, 3, 0),
        start_column: row_int(row, 4, 0),
        end_line: row_int(row, 5, 0),
        end_column: row_int(row, 6, 0),
        location_type: LocationType::from_i64(location_type),
    })
}

fn component_access_from_row(row: &Row<'_>) -> Option<StorageComponentAccess> {
    let id = row_int(row, 0, 0);
    let access_type = row_int(row, 2, -1);
    if id == 0 || access_type == -1 {
        return None;
    }
    Some(StorageComponentAccess {
        id,
        edge_id: row_int(row, 1, 0),
        access_type: AccessType::from_i64(access_type),
    })
}

fn comment_location_from_row(row: &Row<'_>) -> Option<StorageCommentLocation> {
    let id = row_int(row, 0, 0);
    if id == 0 {
        return None;
    }
    Some(StorageCommentLocation {
        id,
        file_node_id: row_int(row, 1, 0),
        start_line: row_int(row, 2, 0),
        start_column: row_int(row, 3, 0),
        end_line: row_int(row, 4, 0),
        end_column: row_int(row, 5, 0),
    })
}

fn error_from_row(row: &Row<'_>) -> Option<StorageError> {
    let id = row_int(row, 0, 0);
    if id == 0 {
        return None;
    }
    Some(StorageError {
        id,
        message: row_text(row, 1, ""),
        fatal: row_int(row, 2, 0) != 0,
        file_path: row_text(row, 3, ""),
        line_number: row_int(row, 4, 0),
        column_number: row_int(row, 5, 0),
    })
}

impl SqliteStorage {
    // ----- shared SELECT-and-cursor helpers, one per entity -----

    fn get_all_nodes_where(&self, filter: &str, params: &[&dyn ToSql]) -> Vec<StorageNode> {
        self.db()
            .query_rows(
                &format!(
                    "SELECT id, type, serialized_name, definition_type FROM node {};",
                    filter
                ),
                params,
                node_from_row,
            )
            .into_iter()
            .flatten()
            .collect()
    }

    fn get_all_edges_where(&self, filter: &str, params: &[&dyn ToSql]) -> Vec<StorageEdge> {
        self.db()
            .query_rows(
                &format!(
                    "SELECT id, type, source_node_id, target_node_id FROM edge {};",
                    filter
                ),
                params,
                edge_from_row,
            )
            .into_iter()
            .flatten()
            .collect()
    }

    fn get_all_files_where(&self, filter: &str, params: &[&dyn ToSql]) -> Vec<StorageFile> {
        self.db()
            .query_rows(
                &format!(
                    "SELECT id, path, modification_time, content, loc FROM file {};",
                    filter
                ),
                params,
                file_from_row,
            )
            .into_iter()
            .flatten()
            .collect()
    }

    fn get_all_source_locations_where(
        &self,
        filter: &str,
        params: &[&dyn ToSql],
    ) -> Vec<StorageSourceLocation> {
        self.db()
            .query_rows(
                &format!(
                    "SELECT id, element_id, file_node_id, start_line, start_column, \
                        end_line, end_column, type FROM source_location {};",
                    filter
                ),
                params,
                source_location_from_row,
            )
            .into_iter()
            .flatten()
            .collect()
    }

    fn get_all_errors_where(&self, filter: &str, params: &[&dyn ToSql]) -> Vec<StorageError> {
        self.db()
            .query_rows(
                &format!(
                    "SELECT id, message, fatal, file_path, line_number, column_number \
                        FROM error {};",
                    filter
                ),
                params,
                error_from_row,
            )
            .into_iter()
            .flatten()
            .collect()
    }

    // ----- nodes -----

    pub fn get_node_by_id(&self, id: Id) -> Option<StorageNode> {
        self.get_all_nodes_where("WHERE id = ?", &[&id]).into_iter().next()
    }

    /// Look up a node by its canonical name; the hot path of ingestion
    pub fn get_node_by_serialized_name(&self, serialized_name: &str) -> Option<StorageNode> {
        self.get_all_nodes_where("WHERE serialized_name = ?", &[&serialized_name])
            .into_iter()
            .next()
    }

    pub fn get_nodes_by_ids(&self, ids: &[Id]) -> Vec<StorageNode> {
        if ids.is_empty() {
            return Vec::new();
        }
        let list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.get_all_nodes_where(&format!("WHERE id IN ({})", list), &[])
    }

    pub fn get_all_nodes(&self) -> Vec<StorageNode> {
        self.get_all_nodes_where("", &[])
    }

    // ----- edges -----

    pub fn get_edge_by_id(&self, id: Id) -> Option<StorageEdge> {
        self.get_all_edges_where("WHERE id = ?", &[&id]).into_iter().next()
    }

    pub fn get_edges_by_source_id(&self, source_node_id: Id) -> Vec<StorageEdge> {
        self.get_all_edges_where("WHERE source_node_id = ?", &[&source_node_id])
    }

    pub fn get_edges_by_target_id(&self, target_node_id: Id) -> Vec<StorageEdge> {
        self.get_all_edges_where("WHERE target_node_id = ?", &[&target_node_id])
    }

    pub fn get_edge_by_source_target_type(
        &self,
        source_node_id: Id,
        target_node_id: Id,
        edge_type: EdgeType,
    ) -> Option<StorageEdge> {
        self.get_all_edges_where(
            "WHERE source_node_id = ? AND target_node_id = ? AND type = ?",
            &[&source_node_id, &target_node_id, &edge_type.to_i64()],
        )
        .into_iter()
        .next()
    }

    pub fn get_all_edges(&self) -> Vec<StorageEdge> {
        self.get_all_edges_where("", &[])
    }

    // ----- files -----

    pub fn get_file_by_id(&self, id: Id) -> Option<StorageFile> {
        self.get_all_files_where("WHERE id = ?", &[&id]).into_iter().next()
    }

    pub fn get_file_by_path(&self, path: &str) -> Option<StorageFile> {
        self.get_all_files_where("WHERE path = ?", &[&path])
            .into_iter()
            .next()
    }

    pub fn get_all_files(&self) -> Vec<StorageFile> {
        self.get_all_files_where("", &[])
    }

    // ----- local symbols -----

    pub fn get_local_symbol_by_name(&self, name: &str) -> Option<StorageLocalSymbol> {
        self.db()
            .query_rows(
                "SELECT id, name FROM local_symbol WHERE name = ?;",
                &[&name],
                local_symbol_from_row,
            )
            .into_iter()
            .flatten()
            .next()
    }

    // ----- source locations -----

    pub fn get_source_locations_for_element_id(&self, element_id: Id) -> Vec<StorageSourceLocation> {
        self.get_all_source_locations_where("WHERE element_id = ?", &[&element_id])
    }

    pub fn get_source_locations_in_file(&self, file_node_id: Id) -> Vec<StorageSourceLocation> {
        self.get_all_source_locations_where("WHERE file_node_id = ?", &[&file_node_id])
    }

    // ----- component accesses -----

    pub fn get_component_access_by_edge_id(&self, edge_id: Id) -> Option<StorageComponentAccess> {
        self.db()
            .query_rows(
                "SELECT id, edge_id, type FROM component_access WHERE edge_id = ?;",
                &[&edge_id],
                component_access_from_row,
            )
            .into_iter()
            .flatten()
            .next()
    }

    // ----- comment locations -----

    pub fn get_comment_locations_in_file(&self, file_node_id: Id) -> Vec<StorageCommentLocation> {
        self.db()
            .query_rows(
                "SELECT id, file_node_id, start_line, start_column, end_line, end_column \
                    FROM comment_location WHERE file_node_id = ?;",
                &[&file_node_id],
                comment_location_from_row,
            )
            .into_iter()
            .flatten()
            .collect()
    }

    // ----- errors -----

    pub fn get_all_errors(&self) -> Vec<StorageError> {
        self.get_all_errors_where("", &[])
    }

    pub fn get_fatal_errors(&self) -> Vec<StorageError> {
        self.get_all_errors_where("WHERE fatal = 1", &[])
    }

    // ----- aggregates -----

    pub fn get_node_count(&self) -> i64 {
        self.db().scalar("SELECT COUNT(*) FROM node;")
    }

    pub fn get_edge_count(&self) -> i64 {
        self.db().scalar("SELECT COUNT(*) FROM edge;")
    }

    pub fn get_file_count(&self) -> i64 {
        self.db().scalar("SELECT COUNT(*) FROM file;")
    }

    /// Sum of line counts over all stored files
    pub fn get_file_loc_count(&self) -> i64 {
        self.db().scalar("SELECT COALESCE(SUM(loc), 0) FROM file;")
    }

    pub fn get_source_location_count(&self) -> i64 {
        self.db().scalar("SELECT COUNT(*) FROM source_location;")
    }

    pub fn get_error_count(&self) -> ErrorCountInfo {
        ErrorCountInfo {
            total: self.db().scalar("SELECT COUNT(*) FROM error;"),
            fatal: self.db().scalar("SELECT COUNT(*) FROM error WHERE fatal = 1;"),
        }
    }

    pub fn get_storage_stats(&self) -> StorageStats {
        StorageStats {
            node_count: self.get_node_count(),
            edge_count: self.get_edge_count(),
            file_count: self.get_file_count(),
            file_loc_count: self.get_file_loc_count(),
            source_location_count: self.get_source_location_count(),
        }
    }
}
