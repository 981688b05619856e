//! Removal of stale log files before the pipeline starts

use super::{
    error::{LoggerError, Result},
    event_queue::EventQueue,
    log_entry::{AttachedError, EventOrigin, LogEvent},
    log_level::LogLevel,
    metrics::PipelineMetrics,
};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Delete every regular file in `dir` created before `cutoff`.
///
/// Deletions and failures are reported as events on `queue`. With `strict`,
/// the first failure is returned instead.
pub(crate) fn remove_stale_logs(
    dir: &Path,
    cutoff: DateTime<Utc>,
    strict: bool,
    queue: &EventQueue,
    metrics: &PipelineMetrics,
) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => return report(dir, e, strict, queue),
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report(dir, e, strict, queue)?;
                continue;
            }
        };
        let path = entry.path();

        let created = match entry.metadata() {
            Ok(metadata) if metadata.is_file() => metadata.created().or_else(|_| metadata.modified()),
            Ok(_) => continue,
            Err(e) => Err(e),
        };
        let created: DateTime<Utc> = match created {
            Ok(time) => time.into(),
            Err(e) => {
                report(&path, e, strict, queue)?;
                continue;
            }
        };
        if created >= cutoff {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                metrics.record_file_cleaned();
                let name = entry.file_name().to_string_lossy().into_owned();
                queue.enqueue(
                    LogEvent::new(LogLevel::Debug, "{} deleted")
                        .with_arg(name)
                        .with_origin(EventOrigin::Pipeline),
                );
            }
            Err(e) => report(&path, e, strict, queue)?,
        }
    }

    Ok(())
}

fn report(path: &Path, error: std::io::Error, strict: bool, queue: &EventQueue) -> Result<()> {
    let display = path.display().to_string();
    if strict {
        return Err(LoggerError::cleanup(display, error));
    }

    queue.enqueue(
        LogEvent::new(LogLevel::Error, "Couldn't delete log file {}")
            .with_arg(display)
            .with_error(AttachedError::from(error))
            .with_origin(EventOrigin::Pipeline),
    );
    Ok(())
}
