//! Subscriber notification
//!
//! Every processed event is handed to the registered callbacks on a
//! dedicated notifier thread, so a slow or panicking subscriber never holds
//! up the dispatcher.

use crate::core::dispatcher::join_within;
use crate::core::{LogEvent, PipelineMetrics};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Callback receiving each fully rendered event
pub type Subscriber = Arc<dyn Fn(&LogEvent) + Send + Sync>;

/// Handle returned by [`SubscriberHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Registry = Arc<RwLock<Vec<(SubscriptionId, Subscriber)>>>;

pub struct SubscriberHub {
    subscribers: Registry,
    next_id: AtomicU64,
    sender: Mutex<Option<Sender<Arc<LogEvent>>>>,
    notifier: Mutex<Option<thread::JoinHandle<()>>>,
    metrics: Arc<PipelineMetrics>,
}

impl SubscriberHub {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(0),
            sender: Mutex::new(None),
            notifier: Mutex::new(None),
            metrics,
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&LogEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(callback)));
        id
    }

    /// Returns false if `id` was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Queue `event` for delivery. Never blocks; dropped if the notifier
    /// is not running.
    pub fn notify(&self, event: Arc<LogEvent>) {
        if self.is_empty() {
            return;
        }
        if let Some(ref sender) = *self.sender.lock() {
            let _ = sender.send(event);
        }
    }

    pub(crate) fn start(&self) {
        let mut notifier = self.notifier.lock();
        if notifier.is_some() {
            return;
        }

        let (sender, receiver) = unbounded();
        let subscribers = Arc::clone(&self.subscribers);
        let metrics = Arc::clone(&self.metrics);
        let handle = thread::Builder::new()
            .name("log-pipeline-notifier".to_string())
            .spawn(move || Self::run(receiver, subscribers, metrics));

        match handle {
            Ok(handle) => {
                *notifier = Some(handle);
                *self.sender.lock() = Some(sender);
            }
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to spawn subscriber notifier: {}", e);
            }
        }
    }

    /// Close the channel and wait up to `timeout` for queued notifications
    pub(crate) fn shutdown(&self, timeout: Duration) -> bool {
        drop(self.sender.lock().take());
        match self.notifier.lock().take() {
            Some(handle) => join_within(handle, timeout, "subscriber notifier"),
            None => true,
        }
    }

    fn run(receiver: Receiver<Arc<LogEvent>>, subscribers: Registry, metrics: Arc<PipelineMetrics>) {
        for event in receiver {
            // Clone the list so callbacks may (un)subscribe without deadlocking
            let current: Vec<Subscriber> = subscribers
                .read()
                .iter()
                .map(|(_, subscriber)| Arc::clone(subscriber))
                .collect();

            for subscriber in current {
                if catch_unwind(AssertUnwindSafe(|| subscriber(event.as_ref()))).is_err() {
                    metrics.record_subscriber_failure();
                    eprintln!(
                        "[LOGGER ERROR] Subscriber panicked while handling a log event. \
                         Other subscribers continue to function."
                    );
                }
            }
        }
    }
}

impl Drop for SubscriberHub {
    fn drop(&mut self) {
        drop(self.sender.get_mut().take());
    }
}
