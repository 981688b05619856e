//! Pipeline metrics for observability
//!
//! Counters describing what the dispatcher did and which failures it
//! absorbed. Failures inside the pipeline never reach the caller, so these
//! counters are the cheapest way to notice them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for pipeline observability
///
/// # Example
///
/// ```
/// use log_pipeline::PipelineMetrics;
///
/// let metrics = PipelineMetrics::new();
/// metrics.record_processed();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.events_processed(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// ```
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Events taken through a full dispatcher pass
    events_processed: AtomicU64,

    /// Lines written to the console sink
    console_lines: AtomicU64,

    /// Lines appended to the file sink
    file_lines: AtomicU64,

    /// File or console writes that returned an error
    sink_failures: AtomicU64,

    /// Dispatcher iterations that panicked and were recovered
    loop_recoveries: AtomicU64,

    /// Subscriber callbacks that panicked
    subscriber_failures: AtomicU64,

    /// Stale log files removed at start
    files_cleaned: AtomicU64,
}

impl PipelineMetrics {
    pub const fn new() -> Self {
        Self {
            events_processed: AtomicU64::new(0),
            console_lines: AtomicU64::new(0),
            file_lines: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            loop_recoveries: AtomicU64::new(0),
            subscriber_failures: AtomicU64::new(0),
            files_cleaned: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_processed(&self) -> u64 {
        self.events_processed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn console_lines(&self) -> u64 {
        self.console_lines.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn file_lines(&self) -> u64 {
        self.file_lines.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn loop_recoveries(&self) -> u64 {
        self.loop_recoveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn subscriber_failures(&self) -> u64 {
        self.subscriber_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn files_cleaned(&self) -> u64 {
        self.files_cleaned.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_processed(&self) -> u64 {
        self.events_processed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_console_line(&self) -> u64 {
        self.console_lines.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_file_line(&self) -> u64 {
        self.file_lines.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_loop_recovery(&self) -> u64 {
        self.loop_recoveries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_subscriber_failure(&self) -> u64 {
        self.subscriber_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_file_cleaned(&self) -> u64 {
        self.files_cleaned.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of processed events whose sink write failed (0.0 - 100.0)
    pub fn failure_rate(&self) -> f64 {
        let processed = self.events_processed();
        if processed == 0 {
            return 0.0;
        }
        (self.sink_failures() as f64 / processed as f64) * 100.0
    }
}
