//! Logging macros.
//!
//! Arguments are passed through unformatted: each becomes a [`LogArg`] that
//! fills the next `{}` placeholder of the template when the event is
//! rendered, so numbers and text keep their own console colors.
//!
//! [`LogArg`]: crate::LogArg
//!
//! # Examples
//!
//! ```
//! use log_pipeline::prelude::*;
//! use log_pipeline::{error, info};
//!
//! let logger = Logger::builder().without_console().build();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! let failure = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
//! error!(logger, error = failure, "Writing {} failed", "report.csv");
//! ```

/// Log at an explicit level.
///
/// # Examples
///
/// ```
/// # use log_pipeline::prelude::*;
/// # let logger = Logger::builder().without_console().build();
/// use log_pipeline::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, error = $err:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.log(
            $level,
            $template,
            ::core::option::Option::Some($crate::AttachedError::from($err)),
            ::std::vec![$($crate::LogArg::from($arg)),*],
        )
    };
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.log(
            $level,
            $template,
            ::core::option::Option::None,
            ::std::vec![$($crate::LogArg::from($arg)),*],
        )
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use log_pipeline::prelude::*;
/// # let logger = Logger::builder().without_console().build();
/// # logger.change_level(LogLevel::Trace);
/// use log_pipeline::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($rest)+)
    };
}

#[macro_export]
macro_rules! debug2 {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug2, $($rest)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($rest)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use log_pipeline::prelude::*;
/// # let logger = Logger::builder().without_console().build();
/// use log_pipeline::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($rest)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($rest)+)
    };
}

/// Log an error-level message, optionally with an attached error.
///
/// # Examples
///
/// ```
/// # use log_pipeline::prelude::*;
/// # let logger = Logger::builder().without_console().build();
/// use log_pipeline::error;
/// error!(logger, "Failed to connect to {}", "db-1");
/// error!(logger, error = AttachedError::msg("timed out"), "Retry {} failed", 3);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($rest)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($rest)+)
    };
}

/// Log at level NONE, which the console shows at every display level.
#[macro_export]
macro_rules! always {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::None, $($rest)+)
    };
}
