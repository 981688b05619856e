//! Pipeline configuration
//!
//! [`PipelineConfig`] is the mutable state shared between the lifecycle
//! controller and the dispatcher. [`LoggerOptions`] holds the inputs read
//! once at start.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Runtime-mutable settings read by the dispatcher
#[derive(Debug, Default)]
pub struct PipelineConfig {
    display_level: RwLock<LogLevel>,
    string_blacklist: RwLock<Vec<String>>,
    file_level_blacklist: RwLock<HashSet<LogLevel>>,
}

/// Owned copy of the configuration taken once per dispatcher iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub display_level: LogLevel,
    pub string_blacklist: Arc<[String]>,
    pub file_level_blacklist: HashSet<LogLevel>,
}

impl ConfigSnapshot {
    pub fn shows_on_console(&self, level: LogLevel) -> bool {
        level.is_visible_at(self.display_level)
    }

    pub fn persists_to_file(&self, level: LogLevel) -> bool {
        !self.file_level_blacklist.contains(&level)
    }
}

impl PipelineConfig {
    pub fn new(display_level: LogLevel) -> Self {
        Self {
            display_level: RwLock::new(display_level),
            ..Self::default()
        }
    }

    pub fn display_level(&self) -> LogLevel {
        *self.display_level.read()
    }

    pub fn set_display_level(&self, level: LogLevel) {
        *self.display_level.write() = level;
    }

    /// Add substrings to mask. Empty and duplicate entries are ignored.
    pub fn add_blacklist<I, S>(&self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut blacklist = self.string_blacklist.write();
        for entry in entries {
            let entry = entry.into();
            if !entry.is_empty() && !blacklist.contains(&entry) {
                blacklist.push(entry);
            }
        }
    }

    /// Exclude levels from file persistence
    pub fn add_level_blacklist<I>(&self, levels: I)
    where
        I: IntoIterator<Item = LogLevel>,
    {
        self.file_level_blacklist.write().extend(levels);
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            display_level: *self.display_level.read(),
            string_blacklist: self.string_blacklist.read().as_slice().into(),
            file_level_blacklist: self.file_level_blacklist.read().clone(),
        }
    }
}

pub const DEFAULT_GRACE_PERIOD_MS: u64 = 500;
pub const DEFAULT_RECOVERY_DELAY_MS: u64 = 1000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Inputs read when the logger starts
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use log_pipeline::{LoggerOptions, LogLevel};
///
/// let options = LoggerOptions::from_json(r#"{ "display_level": "WARN" }"#).unwrap();
/// assert_eq!(options.display_level, LogLevel::Warn);
/// assert!(options.file_path.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// Log file to create. `None` or empty disables the file sink.
    pub file_path: Option<PathBuf>,
    /// Console visibility threshold
    pub display_level: LogLevel,
    /// Delete files in the log directory created before this instant
    pub cleanup_before: Option<DateTime<Utc>>,
    /// Fail `start` when a stale log cannot be deleted
    pub strict_cleanup: bool,
    /// How long `stop` waits for the dispatcher to exit
    pub grace_period_ms: u64,
    /// Pause after a dispatcher iteration panicked
    pub recovery_delay_ms: u64,
    /// Longest wait on an empty queue before the running flag is re-checked
    pub poll_interval_ms: u64,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            file_path: None,
            display_level: LogLevel::default(),
            cleanup_before: None,
            strict_cleanup: false,
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            recovery_delay_ms: DEFAULT_RECOVERY_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl LoggerOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(LoggerError::config(
                "LoggerOptions",
                "poll_interval_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// The file path, with an empty path treated as absent
    pub fn log_file(&self) -> Option<&PathBuf> {
        self.file_path
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn recovery_delay(&self) -> Duration {
        Duration::from_millis(self.recovery_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
