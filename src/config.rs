//! Tailer configuration, validated once when it is built.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::charset::Charset;
use crate::error::{Error, Result};

/// Default delay between two polls.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Default size of the chunk read from the file at a time.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Default number of consecutive failed polls tolerated before giving up.
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Default cap on the bytes kept for a single line.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Immutable settings of a single tailer.
#[derive(Debug, Clone)]
pub struct TailerConfig {
    path: PathBuf,
    delay: Duration,
    charset: Charset,
    tail_from_end: bool,
    reopen: bool,
    buffer_size: usize,
    max_consecutive_errors: u32,
    max_line_length: usize,
    notify_wakeup: bool,
}

impl TailerConfig {
    /// Configuration with every setting at its default.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Starts a builder for the file at `path`. The file does not need to exist yet.
    pub fn builder<P: AsRef<Path>>(path: P) -> TailerConfigBuilder {
        TailerConfigBuilder {
            path: path.as_ref().to_path_buf(),
            delay: DEFAULT_DELAY,
            charset: Charset::default(),
            tail_from_end: true,
            reopen: cfg!(windows),
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            notify_wakeup: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Whether tailing starts at the current end of the file instead of its beginning.
    pub fn tail_from_end(&self) -> bool {
        self.tail_from_end
    }

    /// Whether the file handle is closed and reopened by path around every sleep.
    pub fn reopen(&self) -> bool {
        self.reopen
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn max_consecutive_errors(&self) -> u32 {
        self.max_consecutive_errors
    }

    /// Longest line kept, in bytes. Longer lines are cut and reported.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Whether file system notifications may cut a poll sleep short.
    pub fn notify_wakeup(&self) -> bool {
        self.notify_wakeup
    }
}

/// Builder for [`TailerConfig`].
#[derive(Debug, Clone)]
pub struct TailerConfigBuilder {
    path: PathBuf,
    delay: Duration,
    charset: Charset,
    tail_from_end: bool,
    reopen: bool,
    buffer_size: usize,
    max_consecutive_errors: u32,
    max_line_length: usize,
    notify_wakeup: bool,
}

impl TailerConfigBuilder {
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn tail_from_end(mut self, tail_from_end: bool) -> Self {
        self.tail_from_end = tail_from_end;
        self
    }

    pub fn reopen(mut self, reopen: bool) -> Self {
        self.reopen = reopen;
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max;
        self
    }

    pub fn max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn notify_wakeup(mut self, notify_wakeup: bool) -> Self {
        self.notify_wakeup = notify_wakeup;
        self
    }

    /// Validates the settings and freezes them.
    pub fn build(self) -> Result<TailerConfig> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::invalid_config("file path must not be empty"));
        }
        if self.delay.is_zero() {
            return Err(Error::invalid_config("poll delay must be positive"));
        }
        if self.buffer_size == 0 {
            return Err(Error::invalid_config("buffer size must be positive"));
        }
        if self.max_consecutive_errors == 0 {
            return Err(Error::invalid_config(
                "max consecutive errors must be at least 1",
            ));
        }
        if self.max_line_length == 0 {
            return Err(Error::invalid_config("max line length must be positive"));
        }

        Ok(TailerConfig {
            path: self.path,
            delay: self.delay,
            charset: self.charset,
            tail_from_end: self.tail_from_end,
            reopen: self.reopen,
            buffer_size: self.buffer_size,
            max_consecutive_errors: self.max_consecutive_errors,
            max_line_length: self.max_line_length,
            notify_wakeup: self.notify_wakeup,
        })
    }
}
