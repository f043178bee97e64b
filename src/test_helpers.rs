//! Test utilities for creating, growing and rotating temporary log files.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct TempLogFile {
    pub path: PathBuf,
    temp_dir: tempfile::TempDir,
}

impl TempLogFile {
    /// Create a new, empty temporary log file
    pub fn new() -> std::io::Result<Self> {
        let temp_file = Self::missing()?;
        File::create(&temp_file.path)?;
        Ok(temp_file)
    }

    /// A path inside a fresh temporary directory; the file itself is not created
    pub fn missing() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("test.log");

        Ok(Self { path, temp_dir })
    }

    /// Create a temporary log file holding exactly `content`
    pub fn with_raw(content: &[u8]) -> std::io::Result<Self> {
        let temp_file = Self::new()?;
        temp_file.append_raw(content)?;
        Ok(temp_file)
    }

    /// Append bytes as-is, without adding a terminator
    pub fn append_raw(&self, content: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(content)?;
        file.flush()?;
        Ok(())
    }

    /// Append `content` followed by a newline
    pub fn append_line(&self, content: &str) -> std::io::Result<()> {
        self.append_raw(format!("{}\n", content).as_bytes())
    }

    /// Truncate the file in place
    pub fn truncate(&self) -> std::io::Result<()> {
        File::create(&self.path)?;
        Ok(())
    }

    /// Delete the file
    pub fn remove(&self) -> std::io::Result<()> {
        fs::remove_file(&self.path)
    }

    /// Move the file aside to `test.log.1` and start a new one with `content`
    pub fn rotate_with(&self, content: &[u8]) -> std::io::Result<()> {
        fs::rename(&self.path, self.temp_dir.path().join("test.log.1"))?;
        fs::write(&self.path, content)
    }

    /// Get the path to the temporary file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_log_file_creation() {
        let temp_file = TempLogFile::new().unwrap();
        assert!(temp_file.path().exists());

        let missing = TempLogFile::missing().unwrap();
        assert!(!missing.path().exists());
    }

    #[test]
    fn test_append_raw_and_line() {
        let temp_file = TempLogFile::with_raw(b"partial").unwrap();
        temp_file.append_line(" done").unwrap();

        let content = fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "partial done\n");
    }

    #[test]
    fn test_truncate() {
        let temp_file = TempLogFile::with_raw(b"initial content\n").unwrap();
        temp_file.truncate().unwrap();

        let content = fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_remove_and_rotate() {
        let temp_file = TempLogFile::with_raw(b"old\n").unwrap();
        temp_file.rotate_with(b"new\n").unwrap();
        assert_eq!(fs::read_to_string(temp_file.path()).unwrap(), "new\n");

        temp_file.remove().unwrap();
        assert!(!temp_file.path().exists());
    }
}
