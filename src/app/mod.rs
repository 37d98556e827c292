//! Application coordinator and runtime
//!
//! [`Runtime`] is the top-level owner of the long-lived values that the
//! original design kept as process singletons: the task scheduler, the
//! message queue, and the one live [`Application`]. Construct it once at
//! process start; dropping it tears everything down in reverse order.
//!
//! After startup, messages are enqueued as tasks, so all handler code runs
//! serialized on the scheduler worker thread and application state needs
//! no locking discipline beyond its own mutex.

mod view;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::cache::StorageCache;
use crate::messaging::{Message, MessageKind, MessageQueue};
use crate::project::{Project, ProjectSettings};
use crate::scheduling::TaskScheduler;
use crate::settings::ApplicationSettings;

pub use view::{IdeCommunicationController, MainView, NetworkFactory, ViewFactory};

/// Startup parameters for the application
#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    /// Where application settings are persisted
    pub settings_path: PathBuf,
}

struct AppState {
    settings: ApplicationSettings,
    settings_path: PathBuf,
    current_color_scheme: PathBuf,
    project: Option<Project>,
    main_view: Option<Box<dyn MainView>>,
    ide_controller: Option<Box<dyn IdeCommunicationController>>,
    is_in_trial: bool,
}

/// The single live application instance
///
/// Owns the storage cache and the current project; reacts to lifecycle
/// messages from the bus.
pub struct Application {
    has_gui: bool,
    queue: Arc<MessageQueue>,
    storage_cache: Arc<StorageCache>,
    state: Mutex<AppState>,
}

impl Application {
    pub fn has_gui(&self) -> bool {
        self.has_gui
    }

    pub fn storage_cache(&self) -> &Arc<StorageCache> {
        &self.storage_cache
    }

    pub fn is_in_trial(&self) -> bool {
        self.state.lock().unwrap().is_in_trial
    }

    /// Settings path of the currently open project, if any
    pub fn current_project_path(&self) -> Option<PathBuf> {
        self.state
            .lock()
            .unwrap()
            .project
            .as_ref()
            .map(|p| p.settings_path().to_path_buf())
    }

    pub fn recent_projects(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().settings.recent_projects.clone()
    }

    /// Color scheme currently applied to the views
    pub fn current_color_scheme(&self) -> PathBuf {
        self.state.lock().unwrap().current_color_scheme.clone()
    }

    /// Dispatch entry point; registered per message kind on the bus
    fn handle_message(&self, message: &Message) {
        match message {
            Message::ActivateWindow => self.on_activate_window(),
            Message::EnteredLicense => self.on_entered_license(),
            Message::FinishedParsing => self.on_finished_parsing(),
            Message::LoadProject {
                project_settings_path,
                force_refresh,
            } => self.on_load_project(project_settings_path, *force_refresh),
            Message::Refresh {
                all,
                ui_only,
                load_style,
            } => self.on_refresh(*all, *ui_only, *load_style),
            Message::SwitchColorScheme { color_scheme_path } => {
                self.on_switch_color_scheme(color_scheme_path)
            }
            _ => {}
        }
    }

    fn on_activate_window(&self) {
        let state = self.state.lock().unwrap();
        if let Some(view) = &state.main_view {
            view.activate_window();
        }
    }

    fn on_entered_license(&self) {
        self.queue.dispatch(Message::status(
            "Found valid license key, unlocked application.",
        ));

        let mut state = self.state.lock().unwrap();
        state.is_in_trial = false;
        self.update_title(&state);
    }

    fn on_finished_parsing(&self) {
        let state = self.state.lock().unwrap();
        self.log_storage_stats(&state);

        if self.has_gui {
            self.queue.dispatch(Message::refresh_ui_only());
        }
    }

    fn on_load_project(&self, project_settings_path: &Path, force_refresh: bool) {
        if project_settings_path.as_os_str().is_empty() {
            return;
        }

        let mut state = self.state.lock().unwrap();

        let already_loaded = state
            .project
            .as_ref()
            .map(|p| p.settings_path() == project_settings_path)
            .unwrap_or(false);

        if already_loaded {
            if force_refresh {
                if let Some(project) = state.project.as_mut() {
                    project.set_state_settings_updated();
                }
                self.refresh_project(&mut state, false);
            }
            return;
        }

        self.create_and_load_project(&mut state, project_settings_path);
    }

    fn on_refresh(&self, all: bool, ui_only: bool, load_style: bool) {
        let mut state = self.state.lock().unwrap();

        if load_style {
            let scheme = state.settings.color_scheme_path.clone();
            self.load_style(&mut state, &scheme);
        }

        self.refresh_views(&state);

        if !ui_only {
            self.refresh_project(&mut state, all);
        }
    }

    fn on_switch_color_scheme(&self, color_scheme_path: &Path) {
        self.queue.dispatch(Message::status(format!(
            "Switch color scheme: {}",
            color_scheme_path.display()
        )));

        {
            let mut state = self.state.lock().unwrap();
            self.load_style(&mut state, color_scheme_path);
        }

        self.queue.dispatch(Message::Refresh {
            all: false,
            ui_only: true,
            load_style: false,
        });
    }

    /// Tear down the previous project and bring up the one at `path`
    ///
    /// Every failure, whatever its source, surfaces as an error status;
    /// the message loop must keep making progress.
    fn create_and_load_project(&self, state: &mut AppState, path: &Path) {
        self.queue.dispatch(Message::status(format!(
            "Loading Project: {}",
            path.display()
        )));

        self.update_recent_projects(state, path);

        self.storage_cache.clear();
        self.storage_cache.set_subject(None);

        let result = ProjectSettings::load(path).and_then(|settings| {
            let mut project = Project::new(settings);
            let loaded = project.load(&self.storage_cache);
            // The project stays current in whatever state load left it.
            state.project = Some(project);
            loaded
        });

        match result {
            Ok(()) => {
                if self.has_gui {
                    self.update_title(state);
                    if let Some(view) = &state.main_view {
                        view.hide_start_screen();
                    }
                }
            }
            Err(err) => {
                tracing::error!("Failed to load project: {:#}", err);
                self.queue.dispatch(Message::status_error(format!(
                    "Failed to load project: {}",
                    path.display()
                )));
            }
        }
    }

    fn refresh_project(&self, state: &mut AppState, force: bool) {
        let Some(project) = state.project.as_mut() else {
            return;
        };

        match project.refresh(force) {
            Ok(true) => {
                self.storage_cache.clear();
                self.refresh_views(state);
            }
            Ok(false) => {}
            Err(err) => {
                tracing::error!("Failed to refresh project: {:#}", err);
                self.queue
                    .dispatch(Message::status_error("Failed to refresh project"));
            }
        }
    }

    fn refresh_views(&self, state: &AppState) {
        if let Some(view) = &state.main_view {
            view.refresh_view();
        }
    }

    fn load_style(&self, state: &mut AppState, color_scheme_path: &Path) {
        state.current_color_scheme = color_scheme_path.to_path_buf();
        tracing::debug!("Loaded color scheme {}", color_scheme_path.display());
    }

    fn update_title(&self, state: &AppState) {
        let Some(view) = &state.main_view else {
            return;
        };

        let mut title = if state.is_in_trial {
            "Astrolabe Trial".to_string()
        } else {
            "Astrolabe".to_string()
        };

        if let Some(project) = &state.project {
            if let Some(name) = project.settings_path().file_name() {
                title.push_str(" - ");
                title.push_str(&name.to_string_lossy());
            }
        }

        view.set_title(&title);
    }

    fn update_recent_projects(&self, state: &mut AppState, path: &Path) {
        state.settings.add_recent_project(path);
        let settings_path = state.settings_path.clone();
        if let Err(err) = state.settings.save(&settings_path) {
            tracing::warn!("Failed to persist recent projects: {:#}", err);
        }

        if let Some(view) = &state.main_view {
            let recent: Vec<&Path> = state
                .settings
                .recent_projects
                .iter()
                .map(PathBuf::as_path)
                .collect();
            view.update_recent_project_menu(&recent);
        }
    }

    /// Publish an indexing summary when logging is enabled
    fn log_storage_stats(&self, state: &AppState) {
        if !state.settings.logging_enabled {
            return;
        }

        let stats = self.storage_cache.get_storage_stats();
        let errors = self.storage_cache.get_error_count();
        let text = format!(
            "Graph: {} nodes, {} edges. Code: {} files, {} lines. Errors: {} total, {} fatal.",
            stats.node_count,
            stats.edge_count,
            stats.file_count,
            stats.file_loc_count,
            errors.total,
            errors.fatal
        );

        tracing::info!("{}", text);
        self.queue.dispatch(Message::status(text));
    }

    fn subscribe(app: &Arc<Application>, queue: &MessageQueue) {
        const HANDLED: [MessageKind; 6] = [
            MessageKind::ActivateWindow,
            MessageKind::EnteredLicense,
            MessageKind::FinishedParsing,
            MessageKind::LoadProject,
            MessageKind::Refresh,
            MessageKind::SwitchColorScheme,
        ];

        for kind in HANDLED {
            let weak = Arc::downgrade(app);
            queue.subscribe(
                kind,
                Arc::new(move |message| {
                    if let Some(app) = weak.upgrade() {
                        app.handle_message(message);
                    }
                }),
            );
        }
    }
}

/// Top-level owner of scheduler, message queue and application
pub struct Runtime {
    scheduler: Arc<TaskScheduler>,
    queue: Arc<MessageQueue>,
    application: Option<Arc<Application>>,
    stopped: bool,
}

impl Runtime {
    /// Materialize the scheduler and message queue; loops are not started
    /// until an application exists
    pub fn new() -> Runtime {
        let scheduler = Arc::new(TaskScheduler::new());
        let queue = Arc::new(MessageQueue::new(Arc::clone(&scheduler)));
        Runtime {
            scheduler,
            queue,
            application: None,
            stopped: false,
        }
    }

    pub fn scheduler(&self) -> &Arc<TaskScheduler> {
        &self.scheduler
    }

    pub fn message_queue(&self) -> &Arc<MessageQueue> {
        &self.queue
    }

    pub fn application(&self) -> Option<&Arc<Application>> {
        self.application.as_ref()
    }

    /// Construct the single application instance and start both loops
    ///
    /// With a view factory the GUI layer comes up and the start screen is
    /// requested; with a network factory the IDE channel starts listening.
    /// Afterwards message delivery is routed through the scheduler.
    pub fn create_application(
        &mut self,
        config: ApplicationConfig,
        view_factory: Option<&dyn ViewFactory>,
        network_factory: Option<&dyn NetworkFactory>,
    ) -> Arc<Application> {
        let settings = ApplicationSettings::load(&config.settings_path);
        self.queue.dispatch(Message::status(format!(
            "Load settings: {}",
            config.settings_path.display()
        )));

        let storage_cache = Arc::new(StorageCache::new());

        let has_gui = view_factory.is_some();
        let main_view = view_factory.map(|factory| factory.create_main_view());
        let ide_controller = network_factory
            .map(|factory| factory.create_ide_communication_controller(Arc::clone(&storage_cache)));

        let current_color_scheme = settings.color_scheme_path.clone();
        let app = Arc::new(Application {
            has_gui,
            queue: Arc::clone(&self.queue),
            storage_cache,
            state: Mutex::new(AppState {
                settings,
                settings_path: config.settings_path,
                current_color_scheme,
                project: None,
                main_view,
                ide_controller,
                is_in_trial: true,
            }),
        });

        {
            let state = app.state.lock().unwrap();
            if has_gui {
                app.update_title(&state);
                if let Some(view) = &state.main_view {
                    view.load_layout();
                }
                self.queue.dispatch(Message::ShowStartScreen);
            }
            if let Some(controller) = &state.ide_controller {
                controller.start_listening();
            }
        }

        Application::subscribe(&app, &self.queue);

        self.scheduler.start_scheduler_loop_threaded();
        self.queue.set_send_messages_as_tasks(true);
        self.queue.start_message_loop_threaded();

        self.application = Some(Arc::clone(&app));
        app
    }

    /// Stop the message loop, then the scheduler, then persist the layout
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        self.queue.stop_message_loop();
        self.scheduler.stop_scheduler_loop();

        if let Some(app) = &self.application {
            let state = app.state.lock().unwrap();
            if let Some(view) = &state.main_view {
                view.save_layout();
            }
        }
        self.application = None;
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}
