//! Search command: full-text search over stored file content

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use astrolabe::output::{output_json, OutputFormat};
use astrolabe::search::{log_matches, SearchMatch, SearchType};
use astrolabe::storage::{ParseLocation, SqliteStorage};

#[derive(Serialize)]
struct SearchResponse {
    term: String,
    matches: Vec<ParseLocation>,
}

pub fn run(db_path: &Path, term: &str, output_format: OutputFormat) -> Result<()> {
    if !db_path.is_file() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let storage = SqliteStorage::open(db_path)?;
    let matches = storage.get_full_text_search_locations(term);

    let entries: Vec<SearchMatch> = matches
        .iter()
        .map(|location| {
            let mut entry = SearchMatch::new(&format!(
                "{}:{}:{}",
                location.file_path, location.start_line, location.start_column
            ));
            entry.search_type = SearchType::Fulltext;
            entry
        })
        .collect();
    log_matches(&entries, term);

    match output_format {
        OutputFormat::Json => output_json(&SearchResponse {
            term: term.to_string(),
            matches,
        })?,
        OutputFormat::Human => {
            if matches.is_empty() {
                println!("No matches for \"{}\"", term);
                return Ok(());
            }
            for location in &matches {
                println!(
                    "{}:{}:{} - {}:{}",
                    location.file_path,
                    location.start_line,
                    location.start_column,
                    location.end_line,
                    location.end_column
                );
            }
            println!("{} matches", matches.len());
        }
    }
    Ok(())
}
