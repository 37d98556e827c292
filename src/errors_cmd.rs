//! Errors command: list stored analysis diagnostics

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use astrolabe::output::{output_json, OutputFormat};
use astrolabe::storage::{SqliteStorage, StorageError};

#[derive(Serialize)]
struct ErrorsResponse {
    errors: Vec<StorageError>,
}

pub fn run(db_path: &Path, fatal_only: bool, output_format: OutputFormat) -> Result<()> {
    if !db_path.is_file() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let storage = SqliteStorage::open(db_path)?;
    let errors = if fatal_only {
        storage.get_fatal_errors()
    } else {
        storage.get_all_errors()
    };

    match output_format {
        OutputFormat::Json => output_json(&ErrorsResponse { errors })?,
        OutputFormat::Human => {
            for error in &errors {
                let marker = if error.fatal { "fatal" } else { "error" };
                println!(
                    "[{}] {}:{}:{}: {}",
                    marker, error.file_path, error.line_number, error.column_number, error.message
                );
            }
            println!("{} diagnostics", errors.len());
        }
    }
    Ok(())
}
