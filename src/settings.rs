//! Application settings persistence
//!
//! Settings live in a JSON file owned by the surrounding application.
//! Missing or unreadable files yield defaults so a fresh install starts
//! without ceremony.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How many entries the recent-projects list keeps
pub const RECENT_PROJECTS_CAP: usize = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub logging_enabled: bool,
    pub color_scheme_path: PathBuf,
    /// Most-recent-first, deduplicated, capped at [`RECENT_PROJECTS_CAP`]
    pub recent_projects: Vec<PathBuf>,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        ApplicationSettings {
            logging_enabled: false,
            color_scheme_path: PathBuf::new(),
            recent_projects: Vec::new(),
        }
    }
}

impl ApplicationSettings {
    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> ApplicationSettings {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(settings) => settings,
                Err(err) => {
                    tracing::warn!(
                        "Failed to parse settings at {}: {}",
                        path.display(),
                        err
                    );
                    ApplicationSettings::default()
                }
            },
            Err(_) => ApplicationSettings::default(),
        }
    }

    /// Persist settings as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .context("Failed to serialize application settings")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    /// Move `path` to the head of the recent-projects list
    ///
    /// Deduplicates and enforces the cap.
    pub fn add_recent_project(&mut self, path: &Path) {
        self.recent_projects.retain(|p| p != path);
        self.recent_projects.insert(0, path.to_path_buf());
        self.recent_projects.truncate(RECENT_PROJECTS_CAP);
    }
}
