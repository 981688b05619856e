//! File appender implementation

use crate::core::{Appender, LoggerError, RenderedRecord, Result, TimestampFormat};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Appends one line per event to a freshly created file.
///
/// The file must not exist yet; an existing path is never overwritten.
/// The handle holds an exclusive advisory lock until the appender is dropped.
pub struct FileAppender {
    file: Option<File>,
    path: PathBuf,
    timestamp_format: TimestampFormat,
}

impl FileAppender {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let display = path.display().to_string();

        let file = OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => LoggerError::file_exists(display.clone()),
                _ => LoggerError::io_operation("creating log file", display.clone(), e),
            })?;
        file.try_lock_exclusive()
            .map_err(|_| LoggerError::file_lock(display))?;

        Ok(Self {
            file: Some(file),
            path,
            timestamp_format: TimestampFormat::default(),
        })
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

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock and close the file. Later appends fail.
    pub fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
            FileExt::unlock(&file)?;
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl Appender for FileAppender {
    fn append(&mut self, record: &RenderedRecord<'_>) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::other("File writer not initialized"))?;

        let mut output = record.plain_line(&self.timestamp_format);
        output.push('\n');
        if let Some(ref error) = record.event.error {
            output.push_str(&error.render_text());
            output.push('\n');
        }

        file.write_all(output.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut file) = self.file {
            file.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
