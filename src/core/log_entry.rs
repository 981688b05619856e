//! Log event structure

use super::log_arg::LogArg;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde_json::json;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A failure attached to a log event.
///
/// Opaque to the pipeline apart from its textual renderings. Cloning is
/// cheap, so one error can travel to every sink and subscriber.
#[derive(Clone)]
pub struct AttachedError {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
    type_name: &'static str,
}

impl<E> From<E> for AttachedError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self {
            inner: Arc::new(error),
            type_name: std::any::type_name::<E>(),
        }
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for MessageError {}

impl AttachedError {
    /// An error carrying only a message
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MessageError(message.into())),
            type_name: "message",
        }
    }

    pub fn from_boxed(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self {
            inner: Arc::from(error),
            type_name: "boxed",
        }
    }

    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Rust type name of the original error, when it was known
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Messages of the source chain, outermost first, excluding the error itself
    pub fn sources(&self) -> Vec<String> {
        let mut sources = Vec::new();
        let mut current = self.inner.source();
        while let Some(source) = current {
            sources.push(source.to_string());
            current = source.source();
        }
        sources
    }

    /// The error message followed by one `Caused by:` line per source
    pub fn render_text(&self) -> String {
        let mut text = self.inner.to_string();
        for source in self.sources() {
            text.push_str("\nCaused by: ");
            text.push_str(&source);
        }
        text
    }

    /// Pretty JSON view used on the console
    pub fn render_json(&self) -> String {
        let value = json!({
            "message": self.inner.to_string(),
            "kind": self.type_name,
            "sources": self.sources(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| self.render_text())
    }
}

impl fmt::Debug for AttachedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedError")
            .field("kind", &self.type_name)
            .field("message", &self.inner.to_string())
            .finish()
    }
}

impl fmt::Display for AttachedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventOrigin {
    Producer,
    /// Reports a failed file write
    SinkFailure,
    /// Reports a recovered dispatcher iteration or a cleanup result
    Pipeline,
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub template: String,
    pub args: Vec<LogArg>,
    pub error: Option<AttachedError>,
    rendered: Option<String>,
    pub(crate) origin: EventOrigin,
}

impl LogEvent {
    pub fn new(level: LogLevel, template: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            template: template.into(),
            args: Vec::new(),
            error: None,
            rendered: None,
            origin: EventOrigin::Producer,
        }
    }

    pub fn with_args(mut self, args: Vec<LogArg>) -> Self {
        self.args = args;
        self
    }

    pub fn with_arg(mut self, arg: impl Into<LogArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<AttachedError>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub(crate) fn with_origin(mut self, origin: EventOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// The final plain-text message; empty until the dispatcher rendered it
    pub fn rendered_message(&self) -> &str {
        self.rendered.as_deref().unwrap_or("")
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered.is_some()
    }

    pub(crate) fn set_rendered(&mut self, message: String) {
        debug_assert!(self.rendered.is_none(), "event rendered twice");
        if self.rendered.is_none() {
            self.rendered = Some(message);
        }
    }
}
