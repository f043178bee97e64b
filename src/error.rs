//! Error types for the log tailer library.

use thiserror::Error;

/// The main error type for tailer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors when opening, inspecting or reading the tailed file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// Rejected tailer configuration.
    #[error("Invalid tailer configuration: {message}")]
    InvalidConfig { message: String },

    /// The sleep between two polls was interrupted.
    #[error("Tailer interrupted")]
    Interrupted,

    /// Too many consecutive poll cycles failed.
    #[error("Giving up after {attempts} consecutive failed polls")]
    RetriesExhausted { attempts: u32 },

    /// A line grew past the configured cap; the bytes beyond it were dropped.
    #[error("Line longer than {limit} bytes, truncated")]
    LineTooLong { limit: usize },

    /// No tokio runtime was available, or one could not be built for a tailer thread.
    #[error("Tailer runtime error: {message}")]
    Runtime { message: String },
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error was raised by an interrupted poll sleep.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted)
    }
}

/// A convenient Result type for tailer operations.
pub type Result<T> = std::result::Result<T, Error>;
