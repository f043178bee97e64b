//! Incremental line reading for tailed files.

use std::io::SeekFrom;
use std::mem;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::charset::Charset;
use crate::config::DEFAULT_MAX_LINE_LENGTH;

/// Splits a byte stream into lines, carrying unterminated bytes across reads.
///
/// `\n` and `\r\n` end a line. A lone `\r` ends a line only once the next byte is
/// known to be something other than `\n` or `\r`; a `\r` that follows a pending
/// `\r` is kept as line content.
///
/// A line keeps at most `max_line` bytes. Anything past that is dropped, and the
/// shortened line is still delivered once its terminator arrives.
#[derive(Debug)]
pub(crate) struct LineSplitter {
    carry: Vec<u8>,
    seen_cr: bool,
    max_line: usize,
    overflowing: bool,
    overflows: usize,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(0, DEFAULT_MAX_LINE_LENGTH)
    }
}

impl LineSplitter {
    pub(crate) fn new(capacity: usize, max_line: usize) -> Self {
        Self {
            carry: Vec::with_capacity(capacity.min(max_line)),
            seen_cr: false,
            max_line,
            overflowing: false,
            overflows: 0,
        }
    }

    /// Feeds a chunk and returns every line it completed, terminators stripped.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        for &byte in chunk {
            match byte {
                b'\n' => {
                    self.seen_cr = false;
                    lines.push(self.finish_line());
                }
                b'\r' => {
                    if self.seen_cr {
                        self.keep(b'\r');
                    }
                    self.seen_cr = true;
                }
                _ => {
                    if self.seen_cr {
                        self.seen_cr = false;
                        lines.push(self.finish_line());
                    }
                    self.keep(byte);
                }
            }
        }
        lines
    }

    fn keep(&mut self, byte: u8) {
        if self.carry.len() < self.max_line {
            self.carry.push(byte);
        } else if !self.overflowing {
            self.overflowing = true;
            self.overflows += 1;
        }
    }

    fn finish_line(&mut self) -> Vec<u8> {
        self.overflowing = false;
        mem::take(&mut self.carry)
    }

    /// Bytes held back because their line is not terminated yet.
    pub(crate) fn pending(&self) -> usize {
        self.carry.len() + usize::from(self.seen_cr)
    }

    /// Number of lines that hit the length cap since the last call.
    pub(crate) fn take_overflows(&mut self) -> usize {
        mem::take(&mut self.overflows)
    }

    /// Drops any partial line.
    pub(crate) fn reset(&mut self) {
        self.carry.clear();
        self.seen_cr = false;
        self.overflowing = false;
    }
}

/// Reads `[position, length)` from `file` in `buffer`-sized chunks and hands every
/// completed line to `on_line`.
///
/// `position` advances by the bytes consumed, including bytes parked in the
/// splitter. Reading stops early when `keep_going` turns false. Returns the number
/// of bytes read.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn read_new_lines<F, K>(
    file: &mut File,
    position: &mut u64,
    length: u64,
    buffer: &mut [u8],
    splitter: &mut LineSplitter,
    charset: Charset,
    mut on_line: F,
    keep_going: K,
) -> std::io::Result<u64>
where
    F: FnMut(String),
    K: Fn() -> bool,
{
    let Some(mut remaining) = calculate_bytes_to_read(length, *position) else {
        return Ok(0);
    };

    file.seek(SeekFrom::Start(*position)).await?;

    let mut total = 0u64;
    while remaining > 0 && keep_going() {
        let want = remaining.min(buffer.len() as u64) as usize;
        let read = file.read(&mut buffer[..want]).await?;
        if read == 0 {
            // Shrunk underneath us; the next poll sees the truncation
            break;
        }

        let read = read as u64;
        *position += read;
        remaining -= read;
        total += read;

        for line in splitter.push(&buffer[..read as usize]) {
            on_line(charset.decode(&line));
        }
    }

    Ok(total)
}

/// Detect if the file was truncated by comparing current size with last position
pub(crate) fn detect_file_truncation(current_size: u64, last_position: u64) -> bool {
    current_size < last_position
}

/// Calculate bytes to read based on current size and last position
pub(crate) fn calculate_bytes_to_read(current_size: u64, last_position: u64) -> Option<u64> {
    if current_size <= last_position {
        None
    } else {
        Some(current_size - last_position)
    }
}
