//! Vacuum command: compact the database and merge FTS segments

use std::path::Path;

use anyhow::Result;

use astrolabe::storage::SqliteStorage;

pub fn run(db_path: &Path) -> Result<()> {
    if !db_path.is_file() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let mut storage = SqliteStorage::open(db_path)?;
    storage.optimize_fts();
    storage.optimize_memory();
    println!("Optimized {}", db_path.display());
    Ok(())
}
