//! Message queue with a threaded delivery loop
//!
//! Publishing always enqueues. The delivery worker pops messages in order
//! and either delivers inline on its own thread or, once
//! `set_send_messages_as_tasks(true)` is flipped, wraps each delivery in a
//! task on the scheduler. Both paths preserve publish order per message
//! kind: the queue is FIFO and the scheduler drains its FIFO on a single
//! worker.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::scheduling::TaskScheduler;

use super::{Message, MessageKind};

/// Subscriber callback; runs on the delivery worker or scheduler thread
pub type MessageListener = Arc<dyn Fn(&Message) + Send + Sync>;

struct QueueState {
    messages: VecDeque<Message>,
    running: bool,
}

/// Typed publish/subscribe bus
///
/// Constructed once by the runtime together with the scheduler it routes
/// through; started and stopped exactly once.
pub struct MessageQueue {
    state: Mutex<QueueState>,
    condvar: Condvar,
    subscribers: Mutex<HashMap<MessageKind, Vec<MessageListener>>>,
    send_as_tasks: AtomicBool,
    scheduler: Arc<TaskScheduler>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MessageQueue {
    pub fn new(scheduler: Arc<TaskScheduler>) -> MessageQueue {
        MessageQueue {
            state: Mutex::new(QueueState {
                messages: VecDeque::new(),
                running: false,
            }),
            condvar: Condvar::new(),
            subscribers: Mutex::new(HashMap::new()),
            send_as_tasks: AtomicBool::new(false),
            scheduler,
            worker: Mutex::new(None),
        }
    }

    /// Register a listener for one message kind
    pub fn subscribe(&self, kind: MessageKind, listener: MessageListener) {
        self.subscribers
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(listener);
    }

    /// Enqueue a message for delivery
    pub fn dispatch(&self, message: Message) {
        let mut state = self.state.lock().unwrap();
        state.messages.push_back(message);
        self.condvar.notify_one();
    }

    /// Route deliveries through the task scheduler instead of delivering
    /// on the queue worker
    pub fn set_send_messages_as_tasks(&self, enabled: bool) {
        self.send_as_tasks.store(enabled, Ordering::SeqCst);
    }

    /// Number of messages waiting for delivery
    pub fn pending_message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    /// Launch the delivery worker thread
    ///
    /// Idempotent: a second call while running is a no-op.
    pub fn start_message_loop_threaded(self: &Arc<MessageQueue>) {
        {
            let mut state = self.state.lock().unwrap();
            if state.running {
                return;
            }
            state.running = true;
        }

        let queue = Arc::clone(self);
        let handle = thread::Builder::new()
            .name("message-loop".to_string())
            .spawn(move || queue.run_loop())
            .expect("Failed to spawn message loop thread");

        *self.worker.lock().unwrap() = Some(handle);
    }

    /// Drain remaining messages, then halt the worker
    pub fn stop_message_loop(&self) {
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
                tracing::error!("Message loop worker panicked during shutdown");
            }
        }
    }

    fn run_loop(self: Arc<MessageQueue>) {
        loop {
            let message = {
                let mut state = self.state.lock().unwrap();
                loop {
                    if let Some(message) = state.messages.pop_front() {
                        break Some(message);
                    }
                    if !state.running {
                        break None;
                    }
                    state = self.condvar.wait(state).unwrap();
                }
            };

            let message = match message {
                Some(message) => message,
                None => return,
            };

            if self.send_as_tasks.load(Ordering::SeqCst) {
                let queue = Arc::clone(&self);
                self.scheduler
                    .schedule(Box::new(move || queue.deliver(&message)));
            } else {
                self.deliver(&message);
            }
        }
    }

    fn deliver(&self, message: &Message) {
        let listeners: Vec<MessageListener> = {
            let subscribers = self.subscribers.lock().unwrap();
            match subscribers.get(&message.kind()) {
                Some(listeners) => listeners.clone(),
                None => return,
            }
        };

        for listener in listeners {
            listener(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undelivered_kinds_are_dropped() {
        let scheduler = Arc::new(TaskScheduler::new());
        let queue = Arc::new(MessageQueue::new(scheduler));
        queue.dispatch(Message::ShowStartScreen);
        assert_eq!(queue.pending_message_count(), 1);
        queue.start_message_loop_threaded();
        queue.stop_message_loop();
        assert_eq!(queue.pending_message_count(), 0);
    }
}
