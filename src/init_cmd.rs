//! Init command: create or upgrade a database in place

use std::path::Path;

use anyhow::Result;

use astrolabe::storage::SqliteStorage;

pub fn run(db_path: &Path) -> Result<()> {
    let mut storage = SqliteStorage::open(db_path)?;
    let persisted = storage.storage_version();
    storage.init()?;

    if persisted == 0 {
        println!("Created database at {}", db_path.display());
    } else if persisted != astrolabe::STORAGE_VERSION {
        println!(
            "Cleared incompatible database (storage version {} -> {}) at {}",
            persisted,
            astrolabe::STORAGE_VERSION,
            db_path.display()
        );
    } else {
        println!("Database at {} is up to date", db_path.display());
    }
    Ok(())
}
