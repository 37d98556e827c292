//! Insertion and mutation operations
//!
//! Every insertion allocates its id through the `element` table so nodes
//! and edges share one id space and deletion cascades uniformly. Callers
//! ingesting in bulk wrap these in a transaction.

use std::fs;
use std::path::Path;

use super::backend::row_int;
use super::records::{AccessType, DefinitionType, EdgeType, Id, LocationType, NodeType};
use super::SqliteStorage;

impl SqliteStorage {
    /// Insert a typed edge between two nodes, returning its id
    pub fn add_edge(&mut self, edge_type: EdgeType, source_node_id: Id, target_node_id: Id) -> Id {
        let id = self.allocate_element();
        self.db().execute_params(
            "INSERT INTO edge(id, type, source_node_id, target_node_id) VALUES(?, ?, ?, ?);",
            &[&id, &edge_type.to_i64(), &source_node_id, &target_node_id],
        );
        id
    }

    /// Insert a named node, returning its id
    pub fn add_node(
        &mut self,
        node_type: NodeType,
        serialized_name: &str,
        definition_type: DefinitionType,
    ) -> Id {
        let id = self.allocate_element();
        self.db().execute_params(
            "INSERT INTO node(id, type, serialized_name, definition_type) VALUES(?, ?, ?, ?);",
            &[
                &id,
                &node_type.to_i64(),
                &serialized_name,
                &definition_type.to_i64(),
            ],
        );
        id
    }

    /// Insert a file: a node of type file plus the full-text-search row
    ///
    /// Reads the file at `path` and counts its lines; an unreadable file
    /// is stored with empty content.
    pub fn add_file(&mut self, serialized_name: &str, path: &str, modification_time: &str) -> Id {
        let id = self.add_node(NodeType::File, serialized_name, DefinitionType::None);

        let content = match fs::read(Path::new(path)) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                tracing::warn!("Failed to read file content of {}: {}", path, err);
                String::new()
            }
        };
        let loc = content.lines().count() as i64;

        self.db().execute_params(
            "INSERT INTO file(id, path, modification_time, content, loc) VALUES(?, ?, ?, ?, ?);",
            &[&id, &path, &modification_time, &content, &loc],
        );
        id
    }

    /// Insert a function-local symbol, returning its id
    pub fn add_local_symbol(&mut self, name: &str) -> Id {
        let id = self.allocate_element();
        self.db().execute_params(
            "INSERT INTO local_symbol(id, name) VALUES(?, ?);",
            &[&id, &name],
        );
        id
    }

    /// Attach a source range to an element, located in a file node
    pub fn add_source_location(
        &mut self,
        element_id: Id,
        file_node_id: Id,
        start_line: i64,
        start_column: i64,
        end_line: i64,
        end_column: i64,
        location_type: LocationType,
    ) -> Id {
        self.db().execute_params(
            "INSERT INTO source_location(\
                element_id, file_node_id, start_line, start_column, end_line, end_column, type\
            ) VALUES(?, ?, ?, ?, ?, ?, ?);",
            &[
                &element_id,
                &file_node_id,
                &start_line,
                &start_column,
                &end_line,
                &end_column,
                &location_type.to_i64(),
            ],
        );
        self.db().last_insert_rowid()
    }

    /// Annotate a member edge with an access level
    pub fn add_component_access(&mut self, edge_id: Id, access_type: AccessType) -> Id {
        self.db().execute_params(
            "INSERT INTO component_access(edge_id, type) VALUES(?, ?);",
            &[&edge_id, &access_type.to_i64()],
        );
        self.db().last_insert_rowid()
    }

    /// Record a comment range in a file
    pub fn add_comment_location(
        &mut self,
        file_node_id: Id,
        start_line: i64,
        start_column: i64,
        end_line: i64,
        end_column: i64,
    ) -> Id {
        self.db().execute_params(
            "INSERT INTO comment_location(\
                file_node_id, start_line, start_column, end_line, end_column\
            ) VALUES(?, ?, ?, ?, ?);",
            &[
                &file_node_id,
                &start_line,
                &start_column,
                &end_line,
                &end_column,
            ],
        );
        self.db().last_insert_rowid()
    }

    /// Record an analysis diagnostic, coalescing duplicates
    ///
    /// An identical row on the full key returns the existing id instead of
    /// inserting a second copy.
    pub fn add_error(
        &mut self,
        message: &str,
        fatal: bool,
        file_path: &str,
        line_number: i64,
        column_number: i64,
    ) -> Id {
        let fatal = fatal as i64;
        let existing = self
            .db()
            .query_rows(
                "SELECT id FROM error WHERE \
                    message = ? AND fatal = ? AND file_path = ? AND \
                    line_number = ? AND column_number = ?;",
                &[&message, &fatal, &file_path, &line_number, &column_number],
                |row| row_int(row, 0, 0),
            )
            .into_iter()
            .next();

        if let Some(id) = existing {
            return id;
        }

        self.db().execute_params(
            "INSERT INTO error(message, fatal, file_path, line_number, column_number) \
                VALUES(?, ?, ?, ?, ?);",
            &[&message, &fatal, &file_path, &line_number, &column_number],
        );
        self.db().last_insert_rowid()
    }

    /// Retag an existing node
    pub fn set_node_type(&mut self, id: Id, node_type: NodeType) {
        self.db().execute_params(
            "UPDATE node SET type = ? WHERE id = ?;",
            &[&node_type.to_i64(), &id],
        );
    }

    /// Change how an existing node's definition was established
    pub fn set_node_definition_type(&mut self, id: Id, definition_type: DefinitionType) {
        self.db().execute_params(
            "UPDATE node SET definition_type = ? WHERE id = ?;",
            &[&definition_type.to_i64(), &id],
        );
    }

    fn allocate_element(&mut self) -> Id {
        self.db().execute("INSERT INTO element(id) VALUES(NULL);");
        self.db().last_insert_rowid()
    }
}
