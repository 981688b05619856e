//! Basic pipeline usage example
//!
//! Demonstrates levels, placeholders, redaction, subscribers and the log file.
//!
//! Run with: cargo run --example basic_usage

use log_pipeline::prelude::*;
use log_pipeline::{error, info, warn};
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Log Pipeline - Basic Usage Example ===\n");

    let log_dir = std::env::temp_dir().join("log_pipeline_demo");
    let log_file = log_dir.join(format!(
        "demo-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S%3f")
    ));

    let logger = Logger::builder()
        .file_path(&log_file)
        .display_level(LogLevel::Trace)
        .cleanup_before(chrono::Utc::now() - chrono::Duration::days(7))
        .start()?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug2("This is a verbose debug message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");
    logger.none("This line is shown at every display level");
    std::thread::sleep(Duration::from_millis(100));

    println!("\n2. Placeholders:");
    info!(logger, "User {} logged in from {}", "alice", "192.168.1.100");
    info!(logger, "Processed {} items in {} ms", 1500, 42.7);
    warn!(logger, "Only {} of {} placeholders filled", 1);
    std::thread::sleep(Duration::from_millis(100));

    println!("\n3. Redaction:");
    logger.add_blacklist(["hunter2"]);
    info!(logger, "Password for {} is {}", "bob", "HUNTER2");
    std::thread::sleep(Duration::from_millis(100));

    println!("\n4. Subscribers and attached errors:");
    let id = logger.subscribe(|event| {
        if event.level <= LogLevel::Error {
            println!("   subscriber saw: {}", event.rendered_message());
        }
    });
    let failure = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml missing");
    error!(logger, error = failure, "Failed to load {}", "config.toml");
    std::thread::sleep(Duration::from_millis(100));
    logger.unsubscribe(id);

    println!("\n5. Raising the display level to WARN:");
    logger.change_level(LogLevel::Warn);
    logger.info("Only in the file");
    logger.warn("On the console and in the file");
    std::thread::sleep(Duration::from_millis(100));

    logger.stop();

    println!("\n=== Example completed ===");
    println!("Log file: {}", log_file.display());
    println!("Events processed: {}", logger.metrics().events_processed());

    Ok(())
}
