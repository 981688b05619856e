//! Integration tests for the log pipeline
//!
//! These tests verify:
//! - Ordering and sink routing
//! - Display level and file level filtering
//! - Blacklist redaction
//! - Lifecycle errors
//! - Stale log cleanup
//! - Subscribers and the host framework adapter

use log_pipeline::core::template;
use log_pipeline::prelude::*;
use log_pipeline::{error, info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Console writer capturing everything in memory
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn builder(console: &SharedBuffer) -> LoggerBuilder {
    Logger::builder()
        .console(ConsoleAppender::with_colors(false).with_writer(console.clone()))
        .poll_interval(Duration::from_millis(2))
        .grace_period(Duration::from_millis(500))
}

fn wait_for_processed(logger: &Logger, count: u64) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while logger.metrics().events_processed() < count && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(
        logger.metrics().events_processed() >= count,
        "only {} of {} events processed",
        logger.metrics().events_processed(),
        count
    );
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read log file")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_events_reach_file_in_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("ordered.log");
    let console = SharedBuffer::default();
    let logger = builder(&console).file_path(&log_file).start().expect("start");

    logger.info("A");
    logger.info("B");
    logger.info("C");
    wait_for_processed(&logger, 3);
    assert!(logger.stop());

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("[INFO  ] A"));
    assert!(lines[1].ends_with("[INFO  ] B"));
    assert!(lines[2].ends_with("[INFO  ] C"));
    assert!(lines[0].starts_with('['));

    let console_lines: Vec<String> = console.contents().lines().map(str::to_string).collect();
    assert_eq!(console_lines, lines);
}

#[test]
fn test_display_level_only_filters_console() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("filtered.log");
    let console = SharedBuffer::default();
    let logger = builder(&console)
        .file_path(&log_file)
        .display_level(LogLevel::Warn)
        .start()
        .expect("start");

    logger.info("x");
    logger.none("banner");
    wait_for_processed(&logger, 2);
    logger.stop();

    let output = console.contents();
    assert!(!output.contains("] x"));
    assert!(output.contains("[NONE  ] banner"));

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[INFO  ] x"));
}

#[test]
fn test_change_level_applies_to_later_events() {
    let console = SharedBuffer::default();
    let logger = builder(&console)
        .display_level(LogLevel::Error)
        .start()
        .expect("start");

    logger.warn("hidden");
    wait_for_processed(&logger, 1);
    logger.change_level(LogLevel::Trace);
    logger.trace("visible");
    wait_for_processed(&logger, 2);
    logger.stop();

    let output = console.contents();
    assert!(!output.contains("hidden"));
    assert!(output.contains("[TRACE ] visible"));
}

#[test]
fn test_file_level_blacklist() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("levels.log");
    let console = SharedBuffer::default();
    let logger = builder(&console)
        .file_path(&log_file)
        .display_level(LogLevel::Trace)
        .start()
        .expect("start");
    logger.add_level_blacklist([LogLevel::Debug, LogLevel::Trace]);

    logger.debug("console only");
    logger.warn("everywhere");
    wait_for_processed(&logger, 2);
    logger.stop();

    assert!(console.contents().contains("console only"));
    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("[WARN  ] everywhere"));
}

#[test]
fn test_missing_arguments_keep_placeholders() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("placeholders.log");
    let console = SharedBuffer::default();
    let logger = builder(&console).file_path(&log_file).start().expect("start");

    info!(logger, "got {} and {}", 5);
    info!(logger, "unterminated {oops", "unused");
    wait_for_processed(&logger, 2);
    logger.stop();

    let lines = read_lines(&log_file);
    assert!(lines[0].ends_with("] got 5 and {}"));
    assert!(lines[1].ends_with("] unterminated {oops"));
}

#[test]
fn test_blacklist_masks_console_and_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("redacted.log");
    let console = SharedBuffer::default();
    let logger = builder(&console).file_path(&log_file).start().expect("start");
    logger.add_blacklist(["secret"]);

    logger.info("token SECRET123");
    warn!(logger, "value {}", "my-secret");
    wait_for_processed(&logger, 2);
    logger.stop();

    let lines = read_lines(&log_file);
    assert!(lines[0].ends_with("] token ******123"));
    assert!(lines[1].ends_with("] value my-******"));

    let output = console.contents();
    assert!(output.contains("token ******123"));
    assert!(!output.to_lowercase().contains("secret"));
}

#[test]
fn test_argument_style_hints() {
    let segments = template::render("n={} s={}", &[LogArg::from(42), LogArg::from("abc")]);
    let styles: Vec<(String, SegmentStyle)> =
        segments.into_iter().map(|s| (s.text, s.style)).collect();
    assert_eq!(
        styles,
        vec![
            ("n=".to_string(), SegmentStyle::Plain),
            ("42".to_string(), SegmentStyle::Emphasis),
            (" s=".to_string(), SegmentStyle::Plain),
            ("abc".to_string(), SegmentStyle::Value),
        ]
    );
}

#[test]
fn test_attached_error_follows_line() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("errors.log");
    let console = SharedBuffer::default();
    let logger = builder(&console).file_path(&log_file).start().expect("start");

    let failure = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
    error!(logger, error = failure, "Opening {} failed", "/etc/shadow");
    wait_for_processed(&logger, 1);
    logger.stop();

    let lines = read_lines(&log_file);
    assert!(lines[0].ends_with("[ERROR ] Opening /etc/shadow failed"));
    assert_eq!(lines[1], "access denied");
    assert!(console.contents().contains("\"message\": \"access denied\""));
}

#[test]
fn test_double_start_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("double.log");
    let console = SharedBuffer::default();
    let logger = builder(&console).file_path(&log_file).start().expect("start");

    let err = logger.start().unwrap_err();
    assert!(matches!(err, LoggerError::AlreadyStarted));
    assert!(logger.is_running());

    logger.info("still works");
    wait_for_processed(&logger, 1);
    assert!(logger.stop());
    assert_eq!(read_lines(&log_file).len(), 1);
}

#[test]
fn test_stop_twice_is_noop() {
    let console = SharedBuffer::default();
    let logger = builder(&console).start().expect("start");
    assert!(logger.stop());
    assert!(logger.stop());
    assert!(!logger.is_running());
}

#[test]
fn test_restart_on_existing_file_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("once.log");
    let console = SharedBuffer::default();
    let logger = builder(&console).file_path(&log_file).start().expect("start");
    logger.info("first run");
    wait_for_processed(&logger, 1);
    logger.stop();

    let err = logger.start().unwrap_err();
    assert!(matches!(err, LoggerError::FileExists { .. }));
    assert!(err.is_startup_error());
    assert!(!logger.is_running());
    assert_eq!(read_lines(&log_file).len(), 1);
}

#[test]
fn test_cleanup_reports_deleted_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("logs");
    fs::create_dir_all(&log_dir).unwrap();
    fs::write(log_dir.join("yesterday.log"), "old").unwrap();

    let log_file = log_dir.join("today.log");
    let console = SharedBuffer::default();
    let logger = builder(&console)
        .file_path(&log_file)
        .cleanup_before(chrono::Utc::now() + chrono::Duration::minutes(1))
        .start()
        .expect("start");
    wait_for_processed(&logger, 1);
    logger.stop();

    assert!(!log_dir.join("yesterday.log").exists());
    assert_eq!(logger.metrics().files_cleaned(), 1);
    let lines = read_lines(&log_file);
    assert!(lines[0].ends_with("[DEBUG ] yesterday.log deleted"));
}

#[test]
fn test_subscribers_receive_rendered_events() {
    let console = SharedBuffer::default();
    let logger = builder(&console).display_level(LogLevel::Error).build();
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    logger.subscribe(move |event| {
        sink.lock()
            .unwrap()
            .push((event.level, event.rendered_message().to_string()));
    });
    logger.add_blacklist(["pw"]);

    logger.start().expect("start");
    info!(logger, "login {} pw={}", "alice", 1234);
    wait_for_processed(&logger, 1);

    let deadline = Instant::now() + Duration::from_secs(5);
    while received.lock().unwrap().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    logger.stop();

    let received = received.lock().unwrap();
    assert_eq!(
        *received,
        vec![(LogLevel::Info, "login alice **=1234".to_string())]
    );
    assert!(console.contents().is_empty());
}

#[test]
fn test_host_framework_adapter() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("adapter.log");
    let console = SharedBuffer::default();
    let logger = builder(&console)
        .file_path(&log_file)
        .display_level(LogLevel::Trace)
        .start()
        .expect("start");

    logger.log_external(
        ExternalLevel::Critical,
        7,
        "cache",
        None,
        |state, _| format!("{} unavailable {{0}}", state),
    );
    wait_for_processed(&logger, 1);
    logger.stop();

    let lines = read_lines(&log_file);
    assert!(lines[0].ends_with("[FATAL ] [ 7] cache unavailable {0}"));
}

#[test]
fn test_options_from_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("json.log");
    let json = format!(
        r#"{{"file_path": {}, "display_level": "ERROR", "grace_period_ms": 100}}"#,
        serde_json::to_string(&log_file).unwrap()
    );
    let options = LoggerOptions::from_json(&json).expect("valid options");
    assert_eq!(options.display_level, LogLevel::Error);

    let console = SharedBuffer::default();
    let logger = builder(&console).options(options).start().expect("start");
    assert_eq!(logger.display_level(), LogLevel::Error);
    assert!(log_file.exists());
    logger.stop();
}
