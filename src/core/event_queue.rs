//! Unbounded multi-producer queue drained in batches by the dispatcher

use super::log_entry::LogEvent;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Pending log events.
///
/// Any number of threads may [`enqueue`](EventQueue::enqueue); a single
/// consumer detaches whole batches with [`drain_all`](EventQueue::drain_all).
/// Events from one producer thread come out in the order they went in.
pub struct EventQueue {
    sender: Sender<LogEvent>,
    receiver: Receiver<LogEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Append an event. Never blocks.
    pub fn enqueue(&self, event: LogEvent) {
        // Both channel ends live in `self`, so the channel cannot be disconnected.
        let _ = self.sender.send(event);
    }

    /// Wait up to `wait` for the first event, then detach everything queued
    /// at that moment. Returns an empty batch on timeout.
    ///
    /// Events enqueued while the batch is being processed stay in the queue
    /// for the next call.
    pub fn drain_all(&self, wait: Duration) -> Vec<LogEvent> {
        let first = match self.receiver.recv_timeout(wait) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return Vec::new()
            }
        };

        let queued = self.receiver.len();
        let mut batch = Vec::with_capacity(queued + 1);
        batch.push(first);
        batch.extend(self.receiver.try_iter().take(queued));
        batch
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
