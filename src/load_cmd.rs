//! Load command: drive a project load through the application runtime
//!
//! Exercises the full message path: the load intent goes onto the bus, the
//! application handles it on the scheduler worker, and status notices come
//! back out through a subscriber printing to the terminal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use astrolabe::{ApplicationConfig, Message, MessageKind, Runtime};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub fn run(project_path: PathBuf, settings_path: PathBuf) -> Result<()> {
    let mut runtime = Runtime::new();

    runtime.message_queue().subscribe(
        MessageKind::Status,
        Arc::new(|message| {
            if let Message::Status { text, is_error, .. } = message {
                if *is_error {
                    eprintln!("ERROR: {}", text);
                } else {
                    println!("{}", text);
                }
            }
        }),
    );

    let app = runtime.create_application(
        ApplicationConfig { settings_path },
        None,
        None,
    );

    runtime.message_queue().dispatch(Message::LoadProject {
        project_settings_path: project_path.clone(),
        force_refresh: false,
    });

    wait_until_idle(&runtime);
    let loaded = app.current_project_path().as_deref() == Some(project_path.as_path());
    runtime.shutdown();

    if !loaded {
        anyhow::bail!("Project was not loaded: {}", project_path.display());
    }
    Ok(())
}

/// Wait until both worker queues have gone quiet
fn wait_until_idle(runtime: &Runtime) {
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    let mut quiet_polls = 0;
    while Instant::now() < deadline {
        let idle = runtime.message_queue().pending_message_count() == 0
            && runtime.scheduler().pending_task_count() == 0;
        if idle {
            quiet_polls += 1;
            // Handlers can enqueue follow-up work; require a stable window.
            if quiet_polls >= 3 {
                return;
            }
        } else {
            quiet_polls = 0;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
