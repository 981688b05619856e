//! Bridge for callers using a host framework's logging abstraction
//!
//! Such frameworks hand over a level, an event id, an opaque state value and
//! a formatter; the adapter turns them into a plain pipeline event.

use super::{log_entry::AttachedError, log_level::LogLevel, logger::Logger};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity scale of the host logging framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalLevel {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
    None,
}

impl From<ExternalLevel> for LogLevel {
    fn from(level: ExternalLevel) -> Self {
        match level {
            ExternalLevel::Trace => LogLevel::Trace,
            ExternalLevel::Debug => LogLevel::Debug2,
            ExternalLevel::Information => LogLevel::Info,
            ExternalLevel::Warning => LogLevel::Warn,
            ExternalLevel::Error => LogLevel::Error,
            ExternalLevel::Critical => LogLevel::Fatal,
            ExternalLevel::None => LogLevel::None,
        }
    }
}

/// Numeric identifier with an optional name, as carried by host frameworks
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub id: i32,
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<i32> for EventId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Logger {
    /// Log on behalf of a host framework.
    ///
    /// The message is `formatter(state, error)` prefixed with `[id] `, the id
    /// right-aligned to two columns (`[ 7] `). It is logged as a template
    /// without arguments, so braces in it are kept verbatim.
    pub fn log_external<S, F>(
        &self,
        level: ExternalLevel,
        event_id: impl Into<EventId>,
        state: S,
        error: Option<AttachedError>,
        formatter: F,
    ) where
        F: FnOnce(&S, Option<&AttachedError>) -> String,
    {
        let text = formatter(&state, error.as_ref());
        let template = format!("[{:>2}] {}", event_id.into().id, text);
        self.log(level.into(), template, error, Vec::new());
    }

    /// Whether the pipeline accepts events for processing.
    ///
    /// Level filtering happens in the dispatcher, so every level is enabled
    /// while the logger runs.
    pub fn is_enabled(&self, _level: ExternalLevel) -> bool {
        self.is_running()
    }
}
