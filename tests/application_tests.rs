//! Application coordinator lifecycle tests.
//!
//! These drive the real runtime: both worker threads run, messages are
//! delivered as tasks, and the tests observe effects through status
//! subscribers, a recording view, and the storage cache.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use astrolabe::storage::indices::StorageMode;
use astrolabe::{
    ApplicationConfig, IdeCommunicationController, MainView, Message, MessageKind, NetworkFactory,
    Runtime, StorageCache, ViewFactory, STORAGE_VERSION,
};
use tempfile::TempDir;

fn wait_for(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("condition not met within timeout");
}

fn make_project_file(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, "{}").unwrap();
    path
}

fn settings_path(dir: &TempDir) -> PathBuf {
    dir.path().join("settings.json")
}

fn settings_path_with_logging(dir: &TempDir) -> PathBuf {
    let path = settings_path(dir);
    fs::write(&path, r#"{ "logging_enabled": true }"#).unwrap();
    path
}

type StatusLog = Arc<Mutex<Vec<(String, bool)>>>;

fn subscribe_statuses(runtime: &Runtime) -> StatusLog {
    let log: StatusLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    runtime.message_queue().subscribe(
        MessageKind::Status,
        Arc::new(move |message| {
            if let Message::Status { text, is_error, .. } = message {
                sink.lock().unwrap().push((text.clone(), *is_error));
            }
        }),
    );
    log
}

fn load_project(runtime: &Runtime, path: &Path) {
    runtime.message_queue().dispatch(Message::LoadProject {
        project_settings_path: path.to_path_buf(),
        force_refresh: false,
    });
}

// ----- recording view and network collaborators -----

type EventLog = Arc<Mutex<Vec<String>>>;

struct RecordingView {
    events: EventLog,
}

impl RecordingView {
    fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl MainView for RecordingView {
    fn set_title(&self, title: &str) {
        self.push(format!("title:{}", title));
    }
    fn activate_window(&self) {
        self.push("activate_window");
    }
    fn hide_start_screen(&self) {
        self.push("hide_start_screen");
    }
    fn refresh_view(&self) {
        self.push("refresh_view");
    }
    fn load_layout(&self) {
        self.push("load_layout");
    }
    fn save_layout(&self) {
        self.push("save_layout");
    }
    fn update_recent_project_menu(&self, recent_projects: &[&Path]) {
        self.push(format!("recent_menu:{}", recent_projects.len()));
    }
}

struct RecordingViewFactory {
    events: EventLog,
}

impl ViewFactory for RecordingViewFactory {
    fn create_main_view(&self) -> Box<dyn MainView> {
        Box::new(RecordingView {
            events: Arc::clone(&self.events),
        })
    }
}

struct RecordingIdeController {
    events: EventLog,
}

impl IdeCommunicationController for RecordingIdeController {
    fn start_listening(&self) {
        self.events.lock().unwrap().push("listening".to_string());
    }
}

struct RecordingNetworkFactory {
    events: EventLog,
}

impl NetworkFactory for RecordingNetworkFactory {
    fn create_ide_communication_controller(
        &self,
        _storage_cache: Arc<StorageCache>,
    ) -> Box<dyn IdeCommunicationController> {
        Box::new(RecordingIdeController {
            events: Arc::clone(&self.events),
        })
    }
}

fn recorded(events: &EventLog, needle: &str) -> bool {
    events.lock().unwrap().iter().any(|e| e == needle)
}

// ============================================================================
// Fresh project load
// ============================================================================

#[test]
fn test_fresh_project_load() {
    let dir = TempDir::new().unwrap();
    let project = make_project_file(&dir, "p.prj");

    let mut runtime = Runtime::new();
    let statuses = subscribe_statuses(&runtime);
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        None,
        None,
    );

    load_project(&runtime, &project);
    wait_for(|| app.current_project_path().as_deref() == Some(project.as_path()));

    let expected = format!("Loading Project: {}", project.display());
    wait_for(|| statuses.lock().unwrap().iter().any(|(t, _)| *t == expected));

    let (version, node_count) = app
        .storage_cache()
        .with_storage(|s| (s.storage_version(), s.get_node_count()))
        .unwrap();
    assert_eq!(version, STORAGE_VERSION);
    assert_eq!(node_count, 0);

    assert_eq!(app.recent_projects(), vec![project.clone()]);
    assert!(project.with_extension("adb").is_file());

    runtime.shutdown();
}

#[test]
fn test_empty_path_is_ignored() {
    let dir = TempDir::new().unwrap();

    let mut runtime = Runtime::new();
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        None,
        None,
    );

    load_project(&runtime, Path::new(""));
    // Nothing to wait for; drain through shutdown and check no project came up.
    runtime.shutdown();

    assert!(app.current_project_path().is_none());
    assert!(app.recent_projects().is_empty());
}

#[test]
fn test_failed_load_surfaces_error_status() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.prj");

    let mut runtime = Runtime::new();
    let statuses = subscribe_statuses(&runtime);
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        None,
        None,
    );

    load_project(&runtime, &missing);

    let expected = format!("Failed to load project: {}", missing.display());
    wait_for(|| {
        statuses
            .lock()
            .unwrap()
            .iter()
            .any(|(t, is_error)| *t == expected && *is_error)
    });

    // The broken path still lands in the recent list, like any attempted load.
    assert_eq!(app.recent_projects(), vec![missing]);
    runtime.shutdown();
}

// ============================================================================
// Recent projects
// ============================================================================

#[test]
fn test_recent_projects_capped_and_deduplicated() {
    let dir = TempDir::new().unwrap();
    let projects: Vec<PathBuf> = (0..9)
        .map(|i| make_project_file(&dir, &format!("p{}.prj", i)))
        .collect();

    let mut runtime = Runtime::new();
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        None,
        None,
    );

    for project in &projects {
        load_project(&runtime, project);
        wait_for(|| app.current_project_path().as_deref() == Some(project.as_path()));
    }
    // Re-load an earlier one; it must move to the head, not duplicate.
    load_project(&runtime, &projects[4]);
    wait_for(|| app.recent_projects().first() == Some(&projects[4]));

    let recent = app.recent_projects();
    assert!(recent.len() <= 7);
    let unique: std::collections::HashSet<_> = recent.iter().collect();
    assert_eq!(unique.len(), recent.len());
    assert_eq!(recent[0], projects[4]);

    runtime.shutdown();
}

// ============================================================================
// Repeat loads and refresh
// ============================================================================

#[test]
fn test_same_path_without_force_is_ignored() {
    let dir = TempDir::new().unwrap();
    let project = make_project_file(&dir, "p.prj");

    let mut runtime = Runtime::new();
    let statuses = subscribe_statuses(&runtime);
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        None,
        None,
    );

    load_project(&runtime, &project);
    wait_for(|| app.current_project_path().as_deref() == Some(project.as_path()));
    load_project(&runtime, &project);
    runtime.shutdown();

    let loading = format!("Loading Project: {}", project.display());
    let count = statuses
        .lock()
        .unwrap()
        .iter()
        .filter(|(t, _)| *t == loading)
        .count();
    assert_eq!(count, 1, "second load of the same project must be a no-op");
    assert_eq!(app.recent_projects().len(), 1);
}

#[test]
fn test_force_refresh_of_loaded_project_starts_indexing() {
    let dir = TempDir::new().unwrap();
    let project = make_project_file(&dir, "p.prj");

    let mut runtime = Runtime::new();
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        None,
        None,
    );

    load_project(&runtime, &project);
    wait_for(|| app.current_project_path().as_deref() == Some(project.as_path()));

    runtime.message_queue().dispatch(Message::LoadProject {
        project_settings_path: project.clone(),
        force_refresh: true,
    });

    // The refresh switches the engine into bulk-write mode.
    wait_for(|| {
        app.storage_cache()
            .with_storage(|s| s.mode() == StorageMode::Write)
            .unwrap_or(false)
    });

    runtime.shutdown();
}

// ============================================================================
// GUI-facing handlers
// ============================================================================

#[test]
fn test_gui_startup_and_project_load() {
    let dir = TempDir::new().unwrap();
    let project = make_project_file(&dir, "p.prj");
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let factory = RecordingViewFactory {
        events: Arc::clone(&events),
    };

    let mut runtime = Runtime::new();
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        Some(&factory),
        None,
    );

    assert!(app.has_gui());
    assert!(recorded(&events, "load_layout"));
    assert!(recorded(&events, "title:Astrolabe Trial"));

    load_project(&runtime, &project);
    wait_for(|| recorded(&events, "hide_start_screen"));

    let expected_title = format!("title:Astrolabe Trial - {}", "p.prj");
    assert!(recorded(&events, &expected_title));
    assert!(recorded(&events, "recent_menu:1"));

    runtime.shutdown();
    assert!(recorded(&events, "save_layout"));
}

#[test]
fn test_finished_parsing_reports_stats_and_refreshes_ui() {
    let dir = TempDir::new().unwrap();
    let project = make_project_file(&dir, "p.prj");
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let factory = RecordingViewFactory {
        events: Arc::clone(&events),
    };

    let mut runtime = Runtime::new();
    let statuses = subscribe_statuses(&runtime);
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path_with_logging(&dir),
        },
        Some(&factory),
        None,
    );

    load_project(&runtime, &project);
    wait_for(|| app.current_project_path().as_deref() == Some(project.as_path()));

    // Simulate the analyzer: 3 files and 10 plain nodes in one transaction.
    let mut source_paths = Vec::new();
    for i in 0..3 {
        let path = dir.path().join(format!("s{}.c", i));
        fs::write(&path, "void f();\n").unwrap();
        source_paths.push(path.to_string_lossy().to_string());
    }
    app.storage_cache()
        .with_storage_mut(|s| {
            s.begin_transaction();
            for (i, path) in source_paths.iter().enumerate() {
                s.add_file(&format!("s{}.c", i), path, "0");
            }
            for i in 0..10 {
                s.add_node(
                    astrolabe::NodeType::Function,
                    &format!("fn{}", i),
                    astrolabe::DefinitionType::Explicit,
                );
            }
            s.commit_transaction();
        })
        .unwrap();

    let refreshes_before = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| *e == "refresh_view")
        .count();

    runtime.message_queue().dispatch(Message::FinishedParsing);

    wait_for(|| {
        statuses
            .lock()
            .unwrap()
            .iter()
            .any(|(t, _)| t.contains("13 nodes") && t.contains("3 files"))
    });
    wait_for(|| {
        events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| *e == "refresh_view")
            .count()
            > refreshes_before
    });

    let stats = app
        .storage_cache()
        .with_storage(|s| s.get_storage_stats())
        .unwrap();
    assert_eq!(stats.node_count, 13);
    assert_eq!(stats.file_count, 3);

    runtime.shutdown();
}

#[test]
fn test_switch_color_scheme_repaints_without_style_reload() {
    let dir = TempDir::new().unwrap();
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let factory = RecordingViewFactory {
        events: Arc::clone(&events),
    };
    let scheme = dir.path().join("dusk.xml");

    let mut runtime = Runtime::new();
    let statuses = subscribe_statuses(&runtime);
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        Some(&factory),
        None,
    );

    runtime.message_queue().dispatch(Message::SwitchColorScheme {
        color_scheme_path: scheme.clone(),
    });

    wait_for(|| app.current_color_scheme() == scheme);
    wait_for(|| recorded(&events, "refresh_view"));

    let expected = format!("Switch color scheme: {}", scheme.display());
    assert!(statuses.lock().unwrap().iter().any(|(t, _)| *t == expected));

    runtime.shutdown();
}

#[test]
fn test_entered_license_leaves_trial_mode() {
    let dir = TempDir::new().unwrap();
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let factory = RecordingViewFactory {
        events: Arc::clone(&events),
    };

    let mut runtime = Runtime::new();
    let app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        Some(&factory),
        None,
    );

    assert!(app.is_in_trial());
    runtime.message_queue().dispatch(Message::EnteredLicense);

    wait_for(|| !app.is_in_trial());
    wait_for(|| recorded(&events, "title:Astrolabe"));

    runtime.shutdown();
}

#[test]
fn test_activate_window_reaches_the_view() {
    let dir = TempDir::new().unwrap();
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let factory = RecordingViewFactory {
        events: Arc::clone(&events),
    };

    let mut runtime = Runtime::new();
    let _app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        Some(&factory),
        None,
    );

    runtime.message_queue().dispatch(Message::ActivateWindow);
    wait_for(|| recorded(&events, "activate_window"));

    runtime.shutdown();
}

#[test]
fn test_network_factory_controller_starts_listening() {
    let dir = TempDir::new().unwrap();
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let factory = RecordingNetworkFactory {
        events: Arc::clone(&events),
    };

    let mut runtime = Runtime::new();
    let _app = runtime.create_application(
        ApplicationConfig {
            settings_path: settings_path(&dir),
        },
        None,
        Some(&factory),
    );

    assert!(recorded(&events, "listening"));
    runtime.shutdown();
}
