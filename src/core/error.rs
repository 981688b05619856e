//! Error types for the log pipeline

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// `start` called while the dispatcher is running
    #[error("The logger is already started")]
    AlreadyStarted,

    /// Log file path is already taken
    #[error("Log file '{path}' already exists")]
    FileExists { path: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },

    /// Stale log deletion failed in strict mode
    #[error("Failed to delete '{path}': {source}")]
    CleanupFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A dispatcher iteration panicked
    #[error("Dispatcher iteration panicked: {message}")]
    DispatchPanic { message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a file exists error
    pub fn file_exists(path: impl Into<String>) -> Self {
        LoggerError::FileExists { path: path.into() }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a file lock error
    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }

    /// Create a cleanup error
    pub fn cleanup(path: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::CleanupFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a dispatch panic error
    pub fn dispatch_panic(message: impl Into<String>) -> Self {
        LoggerError::DispatchPanic {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error aborts `start`
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            LoggerError::AlreadyStarted
                | LoggerError::FileExists { .. }
                | LoggerError::FileLockError { .. }
                | LoggerError::CleanupFailed { .. }
                | LoggerError::IoOperation { .. }
                | LoggerError::InvalidConfiguration { .. }
        )
    }
}
