//! Cooperative task scheduler
//!
//! One worker thread drains a FIFO of deferred work items. Once dequeued,
//! a task runs to completion on the worker; nothing is interruptible
//! mid-call. After startup the message queue routes deliveries through
//! here, which serializes all handler code on this one thread.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// A deferred unit of work
pub type Task = Box<dyn FnOnce() + Send>;

struct SchedulerState {
    tasks: VecDeque<Task>,
    running: bool,
}

/// FIFO scheduler with one worker thread
///
/// Constructed once by the runtime and shared by reference; started and
/// stopped exactly once.
pub struct TaskScheduler {
    state: Mutex<SchedulerState>,
    condvar: Condvar,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TaskScheduler {
    pub fn new() -> TaskScheduler {
        TaskScheduler {
            state: Mutex::new(SchedulerState {
                tasks: VecDeque::new(),
                running: false,
            }),
            condvar: Condvar::new(),
            worker: Mutex::new(None),
        }
    }

    /// Append a task to the FIFO
    pub fn schedule(&self, task: Task) {
        let mut state = self.state.lock().unwrap();
        state.tasks.push_back(task);
        self.condvar.notify_one();
    }

    /// Number of tasks waiting to run
    pub fn pending_task_count(&self) -> usize {
        self.state.lock().unwrap().tasks.len()
    }

    /// Launch the worker thread
    ///
    /// Idempotent: a second call while running is a no-op.
    pub fn start_scheduler_loop_threaded(self: &Arc<TaskScheduler>) {
        {
            let mut state = self.state.lock().unwrap();
            if state.running {
                return;
            }
            state.running = true;
        }

        let scheduler = Arc::clone(self);
        let handle = thread::Builder::new()
            .name("task-scheduler".to_string())
            .spawn(move || scheduler.run_loop())
            .expect("Failed to spawn scheduler thread");

        *self.worker.lock().unwrap() = Some(handle);
    }

    /// Drain remaining tasks, then halt the worker
    pub fn stop_scheduler_loop(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if !state.running {
                return;
            }
            state.running = false;
        }
        self.condvar.notify_all();

        let handle = self.worker.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Scheduler worker panicked during shutdown");
            }
        }
    }

    fn run_loop(&self) {
        loop {
            let task = {
                let mut state = self.state.lock().unwrap();
                loop {
                    if let Some(task) = state.tasks.pop_front() {
                        break Some(task);
                    }
                    if !state.running {
                        break None;
                    }
                    state = self.condvar.wait(state).unwrap();
                }
            };

            match task {
                Some(task) => task(),
                None => return,
            }
        }
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        TaskScheduler::new()
    }
}
