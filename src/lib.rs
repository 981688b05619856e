//! # Log Pipeline
//!
//! An in-process, asynchronous log pipeline.
//!
//! Producers on any thread enqueue events without blocking. A background
//! dispatcher renders each event from its template and arguments, masks
//! blacklisted substrings, and fans the result out to:
//!
//! - a colored console, filtered by the display level
//! - registered subscribers
//! - a log file, filtered by a per-level blacklist
//!
//! Write failures and dispatcher panics are reported as events in the same
//! pipeline; the dispatcher keeps running until it is stopped.

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender, SubscriptionId};
    pub use crate::core::{
        Appender, AttachedError, EventId, ExternalLevel, LogArg, LogEvent, LogLevel, Logger,
        LoggerBuilder, LoggerError, LoggerOptions, PipelineMetrics, RenderedRecord, Result,
        Segment, SegmentStyle, TimestampFormat,
    };
}

pub use appenders::{ConsoleAppender, FileAppender, SubscriptionId};
pub use core::{
    Appender, AttachedError, EventId, ExternalLevel, LogArg, LogEvent, LogLevel, Logger,
    LoggerBuilder, LoggerError, LoggerOptions, PipelineMetrics, RenderedRecord, Result, Segment,
    SegmentStyle, TimestampFormat,
};
