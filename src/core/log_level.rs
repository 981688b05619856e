//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event, from least to most verbose.
///
/// A display level `L` shows every event whose level is `<= L`, so `None`
/// is always shown and `Trace` only when the threshold is `Trace`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    None = 0,
    Fatal = 1,
    Error = 2,
    Warn = 3,
    Info = 4,
    #[default]
    Debug = 5,
    Debug2 = 6,
    Trace = 7,
}

/// Width of the level column in rendered lines
pub const LEVEL_LABEL_WIDTH: usize = 6;

impl LogLevel {
    pub const ALL: [LogLevel; 8] = [
        LogLevel::None,
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Debug2,
        LogLevel::Trace,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::None => "NONE",
            LogLevel::Fatal => "FATAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Debug2 => "DEBUG2",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Level name padded or truncated to [`LEVEL_LABEL_WIDTH`] characters
    pub fn label(&self) -> String {
        let name = self.to_str();
        let truncated = &name[..name.len().min(LEVEL_LABEL_WIDTH)];
        format!("{:<width$}", truncated, width = LEVEL_LABEL_WIDTH)
    }

    /// True when an event at this level passes the `threshold` display level
    #[inline]
    pub fn is_visible_at(&self, threshold: LogLevel) -> bool {
        *self <= threshold
    }

    pub fn color(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace | LogLevel::Debug2 | LogLevel::Debug | LogLevel::None => BrightBlack,
            LogLevel::Info => Cyan,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => Black,
        }
    }

    pub fn background(&self) -> Option<colored::Color> {
        match self {
            LogLevel::Fatal => Some(colored::Color::Red),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(LogLevel::None),
            "FATAL" => Ok(LogLevel::Fatal),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "DEBUG2" => Ok(LogLevel::Debug2),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
