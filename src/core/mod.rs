//! Core pipeline types and traits

pub mod adapter;
pub mod appender;
pub mod config;
pub(crate) mod dispatcher;
pub mod error;
pub mod event_queue;
pub mod log_arg;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod redactor;
pub(crate) mod retention;
pub mod template;
pub mod timestamp;

pub use adapter::{EventId, ExternalLevel};
pub use appender::{Appender, RenderedRecord};
pub use config::{ConfigSnapshot, LoggerOptions, PipelineConfig};
pub use error::{LoggerError, Result};
pub use event_queue::EventQueue;
pub use log_arg::LogArg;
pub use log_entry::{AttachedError, LogEvent};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::PipelineMetrics;
pub use template::{Segment, SegmentStyle};
pub use timestamp::TimestampFormat;
