//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEvent, template::Segment, timestamp::TimestampFormat};

/// A fully rendered event handed to the sinks
#[derive(Debug, Clone, Copy)]
pub struct RenderedRecord<'a> {
    pub event: &'a LogEvent,
    /// Styled pieces of the rendered message, in order
    pub segments: &'a [Segment],
}

impl RenderedRecord<'_> {
    /// `[timestamp] [LEVEL ] message` without colors or trailing newline
    pub fn plain_line(&self, timestamp_format: &TimestampFormat) -> String {
        format!(
            "[{}] [{}] {}",
            timestamp_format.format(&self.event.timestamp),
            self.event.level.label(),
            self.event.rendered_message()
        )
    }
}

pub trait Appender: Send {
    fn append(&mut self, record: &RenderedRecord<'_>) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
