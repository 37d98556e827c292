//! Astrolabe: persistent code-knowledge store for source exploration
//!
//! Astrolabe ingests the output of a code analyzer (symbols, relations,
//! source positions, file contents, diagnostics) and exposes a queryable
//! graph over that corpus, together with the message-driven application
//! runtime that surrounds it.
//!
//! # Position Conventions
//!
//! All source positions in the store follow editor conventions:
//! - **Line positions**: 1-indexed (line 1 is the first line)
//! - **Column positions**: 1-indexed (column 1 is the first character)
//! - **Ranges**: end positions are inclusive of the final character
//!
//! # Layers
//!
//! - [`storage`]: the SQLite-backed graph store with schema and version
//!   gate, typed CRUD, mode-gated secondary indices, full-text search.
//! - [`cache`]: read-through facade interactive consumers subscribe to.
//! - [`scheduling`] / [`messaging`]: one worker drains deferred tasks,
//!   one drains the typed message bus; after startup deliveries run as
//!   tasks, serializing all handler code on the scheduler thread.
//! - [`app`]: the runtime owning both workers and the single live
//!   application instance that reacts to lifecycle messages.

pub mod app;
pub mod cache;
pub mod messaging;
pub mod output;
pub mod project;
pub mod scheduling;
pub mod search;
pub mod settings;
pub mod storage;
pub mod version;

pub use app::{
    Application, ApplicationConfig, IdeCommunicationController, MainView, NetworkFactory, Runtime,
    ViewFactory,
};
pub use cache::{StorageCache, StorageHandle};
pub use messaging::{Message, MessageKind, MessageQueue};
pub use project::{Project, ProjectSettings, ProjectState};
pub use scheduling::TaskScheduler;
pub use search::{CommandType, SearchMatch, SearchType};
pub use settings::ApplicationSettings;
pub use storage::{
    AccessType, DefinitionType, EdgeType, ErrorCountInfo, Id, LocationType, NodeType,
    ParseLocation, SqliteStorage, StorageStats, STORAGE_VERSION,
};
