//! Status command: storage statistics, versions and active indices

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use astrolabe::output::{output_json, OutputFormat};
use astrolabe::storage::SqliteStorage;

#[derive(Serialize)]
struct StatusResponse {
    database: String,
    storage_version: i64,
    application_version: String,
    node_count: i64,
    edge_count: i64,
    file_count: i64,
    file_loc_count: i64,
    source_location_count: i64,
    error_count: i64,
    fatal_error_count: i64,
    indices: Vec<String>,
}

pub fn run(db_path: &Path, output_format: OutputFormat) -> Result<()> {
    if !db_path.is_file() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let storage = SqliteStorage::open(db_path)?;
    let stats = storage.get_storage_stats();
    let errors = storage.get_error_count();

    let response = StatusResponse {
        database: db_path.display().to_string(),
        storage_version: storage.storage_version(),
        application_version: storage.application_version(),
        node_count: stats.node_count,
        edge_count: stats.edge_count,
        file_count: stats.file_count,
        file_loc_count: stats.file_loc_count,
        source_location_count: stats.source_location_count,
        error_count: errors.total,
        fatal_error_count: errors.fatal,
        indices: storage.index_names(),
    };

    match output_format {
        OutputFormat::Json => output_json(&response)?,
        OutputFormat::Human => {
            println!("Database: {}", response.database);
            println!(
                "Versions: storage {} / application {}",
                response.storage_version, response.application_version
            );
            println!(
                "Graph: {} nodes, {} edges",
                response.node_count, response.edge_count
            );
            println!(
                "Code: {} files, {} lines, {} source locations",
                response.file_count, response.file_loc_count, response.source_location_count
            );
            println!(
                "Errors: {} total, {} fatal",
                response.error_count, response.fatal_error_count
            );
            println!("Indices: {}", response.indices.join(", "));
        }
    }
    Ok(())
}
