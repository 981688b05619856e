//! Logger lifecycle and producer API

use super::{
    appender::Appender,
    config::{LoggerOptions, PipelineConfig},
    dispatcher::{join_finished, wait_finished, Dispatcher, Sinks},
    error::{LoggerError, Result},
    event_queue::EventQueue,
    log_arg::LogArg,
    log_entry::{AttachedError, LogEvent},
    log_level::LogLevel,
    metrics::PipelineMetrics,
    retention::remove_stale_logs,
};
use crate::appenders::{ConsoleAppender, FileAppender, SubscriberHub, SubscriptionId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct Worker {
    running: Arc<AtomicBool>,
    handle: thread::JoinHandle<VecDeque<LogEvent>>,
}

impl Worker {
    /// Join a finished worker and take back the events it did not dispatch
    fn reclaim(self) -> VecDeque<LogEvent> {
        join_finished(self.handle, "Dispatcher").unwrap_or_default()
    }
}

enum LifecycleState {
    Stopped {
        /// Worker that outlived the last grace period
        lingering: Option<Worker>,
        /// Events drained from the queue but not dispatched yet
        backlog: VecDeque<LogEvent>,
    },
    Running(Worker),
}

impl LifecycleState {
    fn stopped(backlog: VecDeque<LogEvent>) -> Self {
        LifecycleState::Stopped {
            lingering: None,
            backlog,
        }
    }
}

/// An asynchronous log pipeline.
///
/// Producers enqueue events from any thread; while the logger is started a
/// background dispatcher renders them and writes them to the console, the
/// subscribers and the log file.
///
/// # Example
///
/// ```no_run
/// use log_pipeline::prelude::*;
/// use log_pipeline::info;
///
/// let logger = Logger::builder()
///     .file_path("logs/app.log")
///     .display_level(LogLevel::Info)
///     .start()?;
///
/// logger.add_blacklist(["hunter2"]);
/// info!(logger, "user {} connected from {}", "alice", "10.0.0.7");
///
/// logger.stop();
/// # Ok::<(), LoggerError>(())
/// ```
pub struct Logger {
    queue: Arc<EventQueue>,
    config: Arc<PipelineConfig>,
    sinks: Arc<Sinks>,
    subscribers: Arc<SubscriberHub>,
    metrics: Arc<PipelineMetrics>,
    options: LoggerOptions,
    state: Mutex<LifecycleState>,
}

impl Logger {
    /// A stopped logger with default options and a stdout console
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start the dispatcher.
    ///
    /// Creates the log directory, removes stale logs when a cleanup cutoff is
    /// set, and opens the log file, which must not exist yet. Fails with
    /// [`LoggerError::AlreadyStarted`] without touching any file if the
    /// logger is running, or if the dispatcher of the previous run is still
    /// finishing its last event after waiting another grace period.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        match &mut *state {
            LifecycleState::Running(_) => return Err(LoggerError::AlreadyStarted),
            LifecycleState::Stopped { lingering, backlog } => {
                if let Some(worker) = lingering.take() {
                    if !wait_finished(&worker.handle, self.options.grace_period()) {
                        *lingering = Some(worker);
                        return Err(LoggerError::AlreadyStarted);
                    }
                    let mut leftover = worker.reclaim();
                    leftover.append(backlog);
                    *backlog = leftover;
                }
            }
        }
        self.options.validate()?;

        let file = match self.options.log_file() {
            Some(path) => Some(self.prepare_file(path)?),
            None => None,
        };

        self.config.set_display_level(self.options.display_level);
        *self.sinks.file.lock() = file;
        self.subscribers.start();

        let backlog = match &mut *state {
            LifecycleState::Stopped { backlog, .. } => std::mem::take(backlog),
            LifecycleState::Running(_) => VecDeque::new(),
        };
        let running = Arc::new(AtomicBool::new(true));
        let dispatcher = Dispatcher {
            queue: Arc::clone(&self.queue),
            config: Arc::clone(&self.config),
            sinks: Arc::clone(&self.sinks),
            subscribers: Arc::clone(&self.subscribers),
            metrics: Arc::clone(&self.metrics),
            running: Arc::clone(&running),
            poll_interval: self.options.poll_interval(),
            recovery_delay: self.options.recovery_delay(),
        };

        match dispatcher.spawn(backlog) {
            Ok(handle) => {
                *state = LifecycleState::Running(Worker { running, handle });
                Ok(())
            }
            Err(e) => {
                self.sinks.file.lock().take();
                self.subscribers.shutdown(Duration::ZERO);
                Err(LoggerError::io_operation(
                    "starting logger",
                    "cannot spawn dispatcher thread",
                    e,
                ))
            }
        }
    }

    fn prepare_file(&self, path: &Path) -> Result<FileAppender> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| {
            LoggerError::io_operation("creating log directory", dir.display().to_string(), e)
        })?;

        if let Some(cutoff) = self.options.cleanup_before {
            remove_stale_logs(
                &dir,
                cutoff,
                self.options.strict_cleanup,
                &self.queue,
                &self.metrics,
            )?;
        }

        FileAppender::create(path)
    }

    /// Stop the dispatcher and release the log file.
    ///
    /// The dispatcher finishes the event in hand and exits; events it had
    /// not reached yet are kept and dispatched first after the next `start`.
    /// Calling `stop` on a stopped logger does nothing.
    ///
    /// Returns `true` if the dispatcher exited within the grace period.
    /// Otherwise it is kept aside and the next `start` waits for it.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock();
        if !matches!(*state, LifecycleState::Running(_)) {
            return true;
        }
        let LifecycleState::Running(worker) =
            std::mem::replace(&mut *state, LifecycleState::stopped(VecDeque::new()))
        else {
            return true;
        };

        worker.running.store(false, Ordering::Release);
        let grace = self.options.grace_period();
        let exited = wait_finished(&worker.handle, grace);
        if exited {
            *state = LifecycleState::stopped(worker.reclaim());
        } else {
            eprintln!(
                "[LOGGER WARNING] Dispatcher thread did not finish within {:?}. \
                 It will be joined before the next start.",
                grace
            );
            *state = LifecycleState::Stopped {
                lingering: Some(worker),
                backlog: VecDeque::new(),
            };
        }

        if let Some(mut file) = self.sinks.file.lock().take() {
            if let Err(e) = file.close() {
                eprintln!("[LOGGER ERROR] Failed to close log file: {}", e);
            }
        }
        if let Some(console) = self.sinks.console.lock().as_mut() {
            if let Err(e) = console.flush() {
                eprintln!("[LOGGER ERROR] Failed to flush console: {}", e);
            }
        }
        self.subscribers.shutdown(grace);

        exited
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), LifecycleState::Running(_))
    }

    /// Whether a log file is currently open
    pub fn has_open_file(&self) -> bool {
        self.sinks.file.lock().is_some()
    }

    /// Change the console threshold; applies from the next dispatcher iteration
    pub fn change_level(&self, level: LogLevel) {
        self.config.set_display_level(level);
    }

    pub fn display_level(&self) -> LogLevel {
        self.config.display_level()
    }

    /// Mask these substrings, case-insensitively, in console and file output
    pub fn add_blacklist<I, S>(&self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.add_blacklist(entries);
    }

    /// Never write these levels to the log file
    pub fn add_level_blacklist<I>(&self, levels: I)
    where
        I: IntoIterator<Item = LogLevel>,
    {
        self.config.add_level_blacklist(levels);
    }

    /// Register a callback fired once per processed event.
    ///
    /// Callbacks run on a separate thread; a panicking callback is counted
    /// in [`PipelineMetrics::subscriber_failures`] and otherwise ignored.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&LogEvent) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Events waiting for the dispatcher
    pub fn pending_events(&self) -> usize {
        let held = match &*self.state.lock() {
            LifecycleState::Stopped { backlog, .. } => backlog.len(),
            LifecycleState::Running(_) => 0,
        };
        self.queue.len() + held
    }

    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }

    /// Enqueue an event. Never blocks.
    pub fn log(
        &self,
        level: LogLevel,
        template: impl Into<String>,
        error: Option<AttachedError>,
        args: Vec<LogArg>,
    ) {
        let mut event = LogEvent::new(level, template).with_args(args);
        event.error = error;
        self.queue.enqueue(event);
    }

    pub fn log_event(&self, event: LogEvent) {
        self.queue.enqueue(event);
    }

    /// Always shown, whatever the display level
    #[inline]
    pub fn none(&self, template: impl Into<String>) {
        self.log(LogLevel::None, template, None, Vec::new());
    }

    #[inline]
    pub fn fatal(&self, template: impl Into<String>) {
        self.log(LogLevel::Fatal, template, None, Vec::new());
    }

    #[inline]
    pub fn error(&self, template: impl Into<String>) {
        self.log(LogLevel::Error, template, None, Vec::new());
    }

    #[inline]
    pub fn warn(&self, template: impl Into<String>) {
        self.log(LogLevel::Warn, template, None, Vec::new());
    }

    #[inline]
    pub fn info(&self, template: impl Into<String>) {
        self.log(LogLevel::Info, template, None, Vec::new());
    }

    #[inline]
    pub fn debug(&self, template: impl Into<String>) {
        self.log(LogLevel::Debug, template, None, Vec::new());
    }

    #[inline]
    pub fn debug2(&self, template: impl Into<String>) {
        self.log(LogLevel::Debug2, template, None, Vec::new());
    }

    #[inline]
    pub fn trace(&self, template: impl Into<String>) {
        self.log(LogLevel::Trace, template, None, Vec::new());
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[cfg(test)]
    pub(crate) fn drain_pending(&self) -> Vec<LogEvent> {
        self.queue.drain_all(Duration::from_millis(10))
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use log_pipeline::prelude::*;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .display_level(LogLevel::Warn)
///     .console(ConsoleAppender::with_colors(false))
///     .blacklist(["password"])
///     .grace_period(Duration::from_millis(100))
///     .build();
///
/// assert!(!logger.is_running());
/// ```
pub struct LoggerBuilder {
    options: LoggerOptions,
    console: Option<Box<dyn Appender>>,
    blacklist: Vec<String>,
    level_blacklist: Vec<LogLevel>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            options: LoggerOptions::default(),
            console: Some(Box::new(ConsoleAppender::new())),
            blacklist: Vec::new(),
            level_blacklist: Vec::new(),
        }
    }

    /// Replace all start options at once
    #[must_use = "builder methods return a new value"]
    pub fn options(mut self, options: LoggerOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.file_path = Some(path.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn display_level(mut self, level: LogLevel) -> Self {
        self.options.display_level = level;
        self
    }

    /// Delete files in the log directory created before `cutoff` when starting
    #[must_use = "builder methods return a new value"]
    pub fn cleanup_before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.options.cleanup_before = Some(cutoff);
        self
    }

    /// Make a failed stale-log deletion abort `start`
    #[must_use = "builder methods return a new value"]
    pub fn strict_cleanup(mut self, strict: bool) -> Self {
        self.options.strict_cleanup = strict;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.options.grace_period_ms = duration_ms(grace);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn recovery_delay(mut self, delay: Duration) -> Self {
        self.options.recovery_delay_ms = duration_ms(delay);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval_ms = duration_ms(interval).max(1);
        self
    }

    /// Use `appender` as the console sink
    #[must_use = "builder methods return a new value"]
    pub fn console<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.console = Some(Box::new(appender));
        self
    }

    /// Disable console output
    #[must_use = "builder methods return a new value"]
    pub fn without_console(mut self) -> Self {
        self.console = None;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn blacklist<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist.extend(entries.into_iter().map(Into::into));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level_blacklist<I>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = LogLevel>,
    {
        self.level_blacklist.extend(levels);
        self
    }

    /// Build a stopped Logger
    pub fn build(self) -> Logger {
        let metrics = Arc::new(PipelineMetrics::new());
        let config = PipelineConfig::new(self.options.display_level);
        config.add_blacklist(self.blacklist);
        config.add_level_blacklist(self.level_blacklist);

        let sinks = Sinks::default();
        *sinks.console.lock() = self.console;

        Logger {
            queue: Arc::new(EventQueue::new()),
            config: Arc::new(config),
            sinks: Arc::new(sinks),
            subscribers: Arc::new(SubscriberHub::new(Arc::clone(&metrics))),
            metrics,
            options: self.options,
            state: Mutex::new(LifecycleState::stopped(VecDeque::new())),
        }
    }

    /// Build and start the Logger
    pub fn start(self) -> Result<Logger> {
        let logger = self.build();
        logger.start()?;
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
