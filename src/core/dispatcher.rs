//! Background dispatcher
//!
//! One worker thread per running logger drains the [`EventQueue`], renders
//! each event and fans it out to the console, the subscribers and the file.
//!
//! **Failure isolation**: a file write error becomes a FATAL event in the
//! same pipeline; a panic anywhere in an iteration is caught, reported as an
//! ERROR event, and the loop resumes after a pause. The loop only ends when
//! the running flag is cleared; the flag is checked between events, and
//! events not yet dispatched are handed back to the caller through the
//! thread's join handle.

use super::{
    appender::{Appender, RenderedRecord},
    config::{ConfigSnapshot, PipelineConfig},
    error::LoggerError,
    event_queue::EventQueue,
    log_entry::{AttachedError, EventOrigin, LogEvent},
    log_level::LogLevel,
    metrics::PipelineMetrics,
    redactor::redact,
    template::{self, Segment},
};
use crate::appenders::{FileAppender, SubscriberHub};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub(crate) const FILE_FAILURE_TEMPLATE: &str = "Couldn't write log to file: {}";
pub(crate) const LOOP_FAILURE_TEMPLATE: &str =
    "An exception occurred while trying to display a log message";

/// Longest single sleep while pausing, so a stop request is noticed quickly
const PAUSE_SLICE: Duration = Duration::from_millis(10);

/// Output destinations owned by the lifecycle controller
#[derive(Default)]
pub(crate) struct Sinks {
    pub console: Mutex<Option<Box<dyn Appender>>>,
    pub file: Mutex<Option<FileAppender>>,
}

pub(crate) struct Dispatcher {
    pub queue: Arc<EventQueue>,
    pub config: Arc<PipelineConfig>,
    pub sinks: Arc<Sinks>,
    pub subscribers: Arc<SubscriberHub>,
    pub metrics: Arc<PipelineMetrics>,
    pub running: Arc<AtomicBool>,
    pub poll_interval: Duration,
    pub recovery_delay: Duration,
}

impl Dispatcher {
    /// Start the worker thread. `backlog` is dispatched before anything
    /// still in the queue.
    pub fn spawn(
        self,
        backlog: VecDeque<LogEvent>,
    ) -> std::io::Result<thread::JoinHandle<VecDeque<LogEvent>>> {
        thread::Builder::new()
            .name("log-pipeline-dispatcher".to_string())
            .spawn(move || self.run(backlog))
    }

    fn run(self, mut pending: VecDeque<LogEvent>) -> VecDeque<LogEvent> {
        // Events of a batch not yet taken when an iteration panics or the
        // logger stops stay here.
        while self.running.load(Ordering::Acquire) {
            if pending.is_empty() {
                pending.extend(self.queue.drain_all(self.poll_interval));
                if pending.is_empty() {
                    continue;
                }
            }

            let outcome = catch_unwind(AssertUnwindSafe(|| self.run_iteration(&mut pending)));
            if let Err(panic) = outcome {
                self.recover(panic_message(panic.as_ref()));
            }
        }

        pending
    }

    fn run_iteration(&self, pending: &mut VecDeque<LogEvent>) {
        let config = self.config.snapshot();
        while self.running.load(Ordering::Acquire) {
            let Some(event) = pending.pop_front() else {
                break;
            };
            self.dispatch(event, &config);
        }
    }

    /// Render one event and hand it to every sink
    pub fn dispatch(&self, mut event: LogEvent, config: &ConfigSnapshot) {
        let segments = render_redacted(&event, &config.string_blacklist);
        event.set_rendered(template::concat(&segments));

        if config.shows_on_console(event.level) {
            self.write_console(&event, &segments);
        }

        let event = Arc::new(event);
        self.subscribers.notify(Arc::clone(&event));

        if config.persists_to_file(event.level) {
            self.write_file(&event, &segments);
        }

        self.metrics.record_processed();
    }

    fn write_console(&self, event: &LogEvent, segments: &[Segment]) {
        let mut console = self.sinks.console.lock();
        let Some(appender) = console.as_mut() else {
            return;
        };

        let record = RenderedRecord { event, segments };
        match appender.append(&record).and_then(|_| appender.flush()) {
            Ok(()) => {
                self.metrics.record_console_line();
            }
            Err(e) => {
                self.metrics.record_sink_failure();
                eprintln!("[LOGGER ERROR] Console appender failed: {}", e);
            }
        }
    }

    fn write_file(&self, event: &LogEvent, segments: &[Segment]) {
        let result = {
            let mut file = self.sinks.file.lock();
            let Some(appender) = file.as_mut() else {
                return;
            };
            appender.append(&RenderedRecord { event, segments })
        };

        match result {
            Ok(()) => {
                self.metrics.record_file_line();
            }
            Err(e) => {
                self.metrics.record_sink_failure();
                if event.origin == EventOrigin::SinkFailure {
                    eprintln!("[LOGGER ERROR] Failed to write log file failure report: {}", e);
                    return;
                }
                self.queue.enqueue(
                    LogEvent::new(LogLevel::Fatal, FILE_FAILURE_TEMPLATE)
                        .with_arg(e.to_string())
                        .with_origin(EventOrigin::SinkFailure),
                );
            }
        }
    }

    fn recover(&self, message: String) {
        self.metrics.record_loop_recovery();
        self.queue.enqueue(
            LogEvent::new(LogLevel::Error, LOOP_FAILURE_TEMPLATE)
                .with_error(AttachedError::from(LoggerError::dispatch_panic(message)))
                .with_origin(EventOrigin::Pipeline),
        );
        self.pause(self.recovery_delay);
    }

    fn pause(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while self.running.load(Ordering::Acquire) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining.min(PAUSE_SLICE));
        }
    }
}

/// Redact the template, render it, then redact the whole rendered message.
///
/// The second pass also catches entries spanning a literal and an argument.
/// Redaction keeps the character count, so the masked message is cut back
/// into the original segments.
pub(crate) fn render_redacted(event: &LogEvent, blacklist: &[String]) -> Vec<Segment> {
    if blacklist.is_empty() {
        return template::render(&event.template, &event.args);
    }

    let redacted = redact(&event.template, blacklist);
    let mut segments = template::render(&redacted, &event.args);
    let masked = redact(&template::concat(&segments), blacklist);
    let mut chars = masked.chars();
    for segment in segments.iter_mut() {
        let len = segment.text.chars().count();
        segment.text = chars.by_ref().take(len).collect();
    }
    segments
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Poll until `handle` has finished or `timeout` elapsed
pub(crate) fn wait_finished<T>(handle: &thread::JoinHandle<T>, timeout: Duration) -> bool {
    let start = Instant::now();
    while !handle.is_finished() {
        if start.elapsed() >= timeout {
            return false;
        }
        thread::sleep(PAUSE_SLICE);
    }
    true
}

/// Join a finished thread, reporting a panic on stderr
pub(crate) fn join_finished<T>(handle: thread::JoinHandle<T>, what: &str) -> Option<T> {
    match handle.join() {
        Ok(value) => Some(value),
        Err(e) => {
            eprintln!(
                "[LOGGER ERROR] {} thread panicked during shutdown: {}",
                what,
                panic_message(e.as_ref())
            );
            None
        }
    }
}

/// Wait up to `timeout` for `handle` to finish.
///
/// Returns false if the thread panicked or is still running; a thread still
/// running is detached.
pub(crate) fn join_within(handle: thread::JoinHandle<()>, timeout: Duration, what: &str) -> bool {
    if !wait_finished(&handle, timeout) {
        eprintln!(
            "[LOGGER WARNING] {} thread did not finish within {:?}. \
             Queued logs may be lost.",
            what, timeout
        );
        return false;
    }
    join_finished(handle, what).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogArg, RenderedRecord, Result, SegmentStyle};
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    struct CountingAppender {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Appender for CountingAppender {
        fn append(&mut self, record: &RenderedRecord<'_>) -> Result<()> {
            self.lines.lock().push(record.event.rendered_message().to_string());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct PanicOnce {
        fired: Arc<AtomicUsize>,
    }

    impl Appender for PanicOnce {
        fn append(&mut self, _record: &RenderedRecord<'_>) -> Result<()> {
            if self.fired.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("console exploded");
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panic-once"
        }
    }

    fn dispatcher(console: Option<Box<dyn Appender>>) -> Dispatcher {
        let metrics = Arc::new(PipelineMetrics::new());
        let sinks = Sinks::default();
        *sinks.console.lock() = console;
        Dispatcher {
            queue: Arc::new(EventQueue::new()),
            config: Arc::new(PipelineConfig::new(LogLevel::Trace)),
            sinks: Arc::new(sinks),
            subscribers: Arc::new(SubscriberHub::new(Arc::clone(&metrics))),
            metrics,
            running: Arc::new(AtomicBool::new(true)),
            poll_interval: Duration::from_millis(5),
            recovery_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_redaction_covers_template_and_values() {
        let event = LogEvent::new(LogLevel::Info, "Secret for {}: {}")
            .with_args(vec!["bob".into(), LogArg::from("my-secret-value")]);
        let segments = render_redacted(&event, &["secret".to_string()]);
        assert_eq!(template::concat(&segments), "****** for bob: my-******-value");
    }

    #[test]
    fn test_redaction_spans_literal_and_argument() {
        let event = LogEvent::new(LogLevel::Info, "pass{} ok").with_arg("word");
        let segments = render_redacted(&event, &["PASSWORD".to_string()]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("****"),
                Segment::new("****", SegmentStyle::Value),
                Segment::plain(" ok"),
            ]
        );
    }

    #[test]
    fn test_file_failure_is_reported_once() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut file = FileAppender::create(temp_dir.path().join("closed.log")).unwrap();
        file.close().unwrap();

        let lines = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = dispatcher(Some(Box::new(CountingAppender { lines: Arc::clone(&lines) })));
        *dispatcher.sinks.file.lock() = Some(file);
        let config = dispatcher.config.snapshot();

        dispatcher.dispatch(LogEvent::new(LogLevel::Info, "first"), &config);
        let mut reports = dispatcher.queue.drain_all(Duration::from_millis(10));
        assert_eq!(reports.len(), 1);
        let report = reports.remove(0);
        assert_eq!(report.level, LogLevel::Fatal);
        assert_eq!(report.template, FILE_FAILURE_TEMPLATE);
        assert_eq!(report.origin, EventOrigin::SinkFailure);

        // processing goes on with the next event
        dispatcher.dispatch(LogEvent::new(LogLevel::Info, "second"), &config);
        assert_eq!(dispatcher.queue.drain_all(Duration::from_millis(10)).len(), 1);

        // the report fails to reach the file too, but is not reported again
        dispatcher.dispatch(report, &config);
        assert!(dispatcher.queue.is_empty());

        let lines = lines.lock();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "first");
        assert_eq!(lines[1], "second");
        assert!(lines[2].starts_with("Couldn't write log to file: "));
        assert_eq!(dispatcher.metrics.sink_failures(), 3);
        assert_eq!(dispatcher.metrics.file_lines(), 0);
        assert_eq!(dispatcher.metrics.events_processed(), 3);
    }

    #[test]
    fn test_stop_returns_undispatched_events() {
        let dispatcher = dispatcher(None);
        let running = Arc::clone(&dispatcher.running);
        let metrics = Arc::clone(&dispatcher.metrics);
        running.store(false, Ordering::Release);

        let backlog: VecDeque<LogEvent> = ["a", "b", "c"]
            .into_iter()
            .map(|text| LogEvent::new(LogLevel::Info, text))
            .collect();
        let handle = dispatcher.spawn(backlog).expect("spawn dispatcher");
        assert!(wait_finished(&handle, Duration::from_secs(1)));

        let leftover = join_finished(handle, "dispatcher").expect("no panic");
        let templates: Vec<_> = leftover.iter().map(|e| e.template.as_str()).collect();
        assert_eq!(templates, ["a", "b", "c"]);
        assert_eq!(metrics.events_processed(), 0);
    }

    #[test]
    fn test_console_respects_display_level() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = dispatcher(Some(Box::new(CountingAppender { lines: Arc::clone(&lines) })));
        dispatcher.config.set_display_level(LogLevel::Warn);
        let config = dispatcher.config.snapshot();

        dispatcher.dispatch(LogEvent::new(LogLevel::Info, "hidden"), &config);
        dispatcher.dispatch(LogEvent::new(LogLevel::Error, "shown {}").with_arg(1), &config);
        dispatcher.dispatch(LogEvent::new(LogLevel::None, "always"), &config);

        assert_eq!(*lines.lock(), vec!["shown 1".to_string(), "always".to_string()]);
        assert_eq!(dispatcher.metrics.events_processed(), 3);
    }

    #[test]
    fn test_panic_is_recovered_and_reported() {
        let fired = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher(Some(Box::new(PanicOnce { fired: Arc::clone(&fired) })));
        let queue = Arc::clone(&dispatcher.queue);
        let metrics = Arc::clone(&dispatcher.metrics);
        let running = Arc::clone(&dispatcher.running);

        queue.enqueue(LogEvent::new(LogLevel::Info, "first"));
        queue.enqueue(LogEvent::new(LogLevel::Info, "second"));
        let handle = dispatcher.spawn(VecDeque::new()).expect("spawn dispatcher");

        let deadline = Instant::now() + Duration::from_secs(2);
        while metrics.events_processed() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        running.store(false, Ordering::Release);
        assert!(wait_finished(&handle, Duration::from_secs(1)));
        assert!(join_finished(handle, "dispatcher").is_some());

        // "first" was in flight when the console panicked; "second" and the
        // recovery report still went through
        assert_eq!(metrics.loop_recoveries(), 1);
        assert!(metrics.events_processed() >= 2);
        assert!(fired.load(Ordering::SeqCst) >= 3);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(boxed.as_ref()), "static str");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "Unknown panic");
    }
}
