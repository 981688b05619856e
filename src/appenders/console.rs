//! Console appender implementation

use crate::core::{Appender, RenderedRecord, Result, TimestampFormat};
use colored::Colorize;
use std::io::Write;

pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    writer: Box<dyn Write + Send>,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            timestamp_format: TimestampFormat::default(),
            writer: Box::new(std::io::stdout()),
        }
    }

    /// Write somewhere other than stdout
    ///
    /// # Example
    ///
    /// ```
    /// use log_pipeline::appenders::ConsoleAppender;
    ///
    /// let appender = ConsoleAppender::with_colors(false).with_writer(std::io::stderr());
    /// ```
    #[must_use]
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Fails with [`LoggerError::InvalidConfiguration`] for an unknown
    /// strftime pattern.
    ///
    /// [`LoggerError::InvalidConfiguration`]: crate::LoggerError::InvalidConfiguration
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Result<Self> {
        format.validate()?;
        self.timestamp_format = format;
        Ok(self)
    }

    fn format_line(&self, record: &RenderedRecord<'_>) -> String {
        if !self.use_colors {
            return record.plain_line(&self.timestamp_format);
        }

        let level = record.event.level;
        let mut label = format!("[{}]", level.label()).color(level.color());
        if let Some(background) = level.background() {
            label = label.on_color(background);
        }

        let mut line = format!(
            "[{}] {} ",
            self.timestamp_format.format(&record.event.timestamp),
            label
        );
        for segment in record.segments {
            line.push_str(&segment.text.color(segment.style.color()).to_string());
        }
        line
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, record: &RenderedRecord<'_>) -> Result<()> {
        let mut output = self.format_line(record);
        output.push('\n');

        if let Some(ref error) = record.event.error {
            output.push_str(&error.render_json());
            output.push('\n');
        }

        self.writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
