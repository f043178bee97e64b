//! A log tailer library that follows a growing file the way `tail -F` does.
//!
//! A [`Tailer`] polls one file, survives truncation, rotation and temporary
//! absence, and hands every newly appended line to a [`TailerListener`]. Lines
//! are only delivered once their terminator (`\n`, `\r\n` or a lone `\r`) has
//! been written.
//!
//! # Example
//!
//! ```rust,no_run
//! use log_tailer::{Error, Tailer, TailerConfig, TailerListener};
//! use std::time::Duration;
//!
//! struct Printer;
//!
//! impl TailerListener for Printer {
//!     fn handle_line(&mut self, line: String) {
//!         println!("{}", line);
//!     }
//!
//!     fn handle_error(&mut self, error: Error) {
//!         eprintln!("Error: {}", error);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TailerConfig::builder("app.log")
//!         .delay(Duration::from_millis(500))
//!         .build()?;
//!
//!     let handle = Tailer::spawn(config, Printer);
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!     handle.stop_timeout(Duration::from_secs(1)).await;
//!
//!     Ok(())
//! }
//! ```

// Internal modules - not part of public API
mod charset;
mod config;
mod error;
mod file_id;
mod fingerprint;
mod listener;
mod reader;
mod stream;
mod tailer;
mod watcher;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use charset::Charset;
pub use config::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DELAY, DEFAULT_MAX_CONSECUTIVE_ERRORS, DEFAULT_MAX_LINE_LENGTH,
    TailerConfig, TailerConfigBuilder,
};
pub use error::{Error, Result};
pub use listener::{TailerEvent, TailerListener};
pub use stream::LineStream;
pub use tailer::{Tailer, TailerHandle};

/// Creates a stream of the lines appended to the file described by `config`.
///
/// The tailer runs as a task on the current tokio runtime; outside of one this
/// returns [`Error::Runtime`].
///
/// # Example
///
/// ```rust,no_run
/// use log_tailer::{TailerConfig, tail_lines};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = TailerConfig::builder("app.log").tail_from_end(false).build()?;
///     let mut stream = tail_lines(config)?;
///
///     while let Some(line) = stream.next().await {
///         println!("New line: {}", line?);
///     }
///
///     Ok(())
/// }
/// ```
pub fn tail_lines(config: TailerConfig) -> Result<LineStream> {
    tokio::runtime::Handle::try_current().map_err(|e| Error::Runtime {
        message: e.to_string(),
    })?;
    Ok(LineStream::new(config))
}
