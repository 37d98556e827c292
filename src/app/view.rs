//! Collaborator traits for the GUI and IDE layers
//!
//! The coordinator never talks to a toolkit directly: it drives these
//! traits and leaves thread-affinity to the implementations (a real GUI
//! re-posts onto its own loop). Headless runs simply pass no factories.

use std::path::Path;
use std::sync::Arc;

use crate::cache::StorageCache;

/// The main application window
pub trait MainView: Send + Sync {
    fn set_title(&self, title: &str);
    fn activate_window(&self);
    fn hide_start_screen(&self);
    /// Repaint all views after a cache invalidation
    fn refresh_view(&self);
    fn load_layout(&self);
    fn save_layout(&self);
    fn update_recent_project_menu(&self, recent_projects: &[&Path]);
}

/// Produces the GUI layer at startup
pub trait ViewFactory {
    fn create_main_view(&self) -> Box<dyn MainView>;
}

/// Listens for IDE requests and translates them into bus messages
pub trait IdeCommunicationController: Send + Sync {
    fn start_listening(&self);
}

/// Produces the IDE communication layer at startup
///
/// The controller outlives individual calls, so it receives its own
/// reference-counted handle to the storage cache.
pub trait NetworkFactory {
    fn create_ide_communication_controller(
        &self,
        storage_cache: Arc<StorageCache>,
    ) -> Box<dyn IdeCommunicationController>;
}
