//! Timestamp formatting utilities
//!
//! Log lines default to `dd.MM.yyyy HH:mm:ss:fff` in local time. Other
//! formats are available for sinks that feed log aggregation tools.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// strftime pattern of [`TimestampFormat::Pipeline`]
pub const PIPELINE_TIMESTAMP_PATTERN: &str = "%d.%m.%Y %H:%M:%S:%3f";

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use log_pipeline::TimestampFormat;
/// use chrono::{Local, TimeZone};
///
/// let at = Local.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Pipeline.format(&at), "08.01.2025 10:30:45:000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Day-first with milliseconds: `08.01.2025 10:30:45:123`
    #[default]
    Pipeline,

    /// ISO 8601 with milliseconds and offset: `2025-01-08T10:30:45.123+01:00`
    Iso8601,

    /// RFC 3339: `2025-01-08T10:30:45.123456789+01:00`
    Rfc3339,

    /// Custom strftime format
    ///
    /// ```
    /// use log_pipeline::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%Y-%m-%d".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Format `datetime`. A custom pattern chrono cannot render falls back to
    /// the pipeline pattern.
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::Pipeline => datetime.format(PIPELINE_TIMESTAMP_PATTERN).to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    Err(_) => datetime.format(PIPELINE_TIMESTAMP_PATTERN).to_string(),
                }
            }
        }
    }

    /// Reject custom patterns containing specifiers chrono does not know
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(format_str) = self {
            if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "TimestampFormat",
                    format!("invalid strftime pattern '{}'", format_str),
                ));
            }
        }
        Ok(())
    }
}
