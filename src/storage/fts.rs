//! Full-text search over stored file content
//!
//! The FTS engine reports hits as byte offsets into the indexed column;
//! consumers want 1-based (line, column) ranges. The reconstruction walks
//! the stored file content line by line while consuming offset groups in
//! order, so a single pass resolves every hit in a file.

use super::backend::{row_int, row_text};
use super::records::ParseLocation;
use super::SqliteStorage;

impl SqliteStorage {
    /// Find every occurrence of `term` in stored file content
    ///
    /// Results are 1-based, end-inclusive ranges; matches may span lines.
    pub fn get_full_text_search_locations(&self, term: &str) -> Vec<ParseLocation> {
        let match_expr = format!("\"*{}*\"", term);
        let hits: Vec<(i64, String)> = self.db().query_rows(
            "SELECT id, offsets(file) FROM file WHERE content MATCH ?;",
            &[&match_expr],
            |row| (row_int(row, 0, 0), row_text(row, 1, "")),
        );

        let mut locations = Vec::new();
        for (file_id, offsets) in hits {
            let file = match self.get_file_by_id(file_id) {
                Some(file) => file,
                None => continue,
            };
            locations.extend(decode_offsets(&file.path, &file.content, &offsets));
        }
        locations
    }
}

/// Resolve an `offsets()` stream against file content
///
/// The stream is a flat list of integers in groups of four:
/// `(column_id, term_index, byte_offset, length)`. A group with
/// `term_index == 0` starts a new match; later groups of the same match
/// only extend its end. The location is emitted when the next match starts
/// or the stream ends.
pub(crate) fn decode_offsets(file_path: &str, content: &str, offsets: &str) -> Vec<ParseLocation> {
    let values: Vec<usize> = offsets
        .split_whitespace()
        .filter_map(|v| v.parse::<usize>().ok())
        .collect();

    let lines: Vec<&str> = content.split('\n').collect();
    let mut locations = Vec::new();
    let mut pending: Option<ParseLocation> = None;

    // Bytes consumed by fully passed lines, newline included.
    let mut chars_in_previous_lines = 0usize;
    let mut line_idx = 0usize;

    for group in values.chunks_exact(4) {
        let term_index = group[1];
        let byte_offset = group[2];
        let length = group[3];

        while line_idx + 1 < lines.len()
            && byte_offset >= chars_in_previous_lines + lines[line_idx].len() + 1
        {
            chars_in_previous_lines += lines[line_idx].len() + 1;
            line_idx += 1;
        }

        if term_index == 0 {
            if let Some(location) = pending.take() {
                locations.push(location);
            }
            pending = Some(ParseLocation {
                file_path: file_path.to_string(),
                start_line: (line_idx + 1) as i64,
                start_column: (byte_offset - chars_in_previous_lines + 1) as i64,
                end_line: 0,
                end_column: 0,
            });
        }

        while line_idx + 1 < lines.len()
            && byte_offset + length > chars_in_previous_lines + lines[line_idx].len()
        {
            chars_in_previous_lines += lines[line_idx].len() + 1;
            line_idx += 1;
        }

        if let Some(location) = pending.as_mut() {
            location.end_line = (line_idx + 1) as i64;
            location.end_column = (byte_offset + length - chars_in_previous_lines) as i64;
        }
    }

    if let Some(location) = pending.take() {
        locations.push(location);
    }

    locations
}
