//! Optional file system notifications that wake the poll loop early.
//!
//! Polling stays the source of truth; an event only means "look now" instead of
//! waiting out the rest of the poll delay.

use crate::error::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Watches the directory holding the tailed file.
pub(crate) struct FileWatcher {
    watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<notify::Result<Event>>,
    file_path: PathBuf,
    file_name: String,
}

impl FileWatcher {
    /// Creates a new file watcher for the specified path.
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        Ok(Self {
            watcher,
            receiver: rx,
            file_path,
            file_name,
        })
    }

    /// Starts watching the parent directory, so deletion and recreation are seen too.
    pub(crate) fn start_watching(&mut self) -> Result<()> {
        let watch_path = watch_directory(&self.file_path);
        self.watcher.watch(watch_path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    /// Waits for the next event touching the tailed file. Access events are
    /// skipped, since the tailer's own opens and reads produce them.
    ///
    /// `None` means the notification channel closed.
    pub(crate) async fn next_relevant(&mut self) -> Option<notify::Result<()>> {
        loop {
            match self.receiver.recv().await? {
                Ok(event)
                    if !event.kind.is_access()
                        && is_event_relevant_to_file(&event, &self.file_name) =>
                {
                    return Some(Ok(()));
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    #[cfg(test)]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Directory to watch for `file_path`; a bare file name lives in the current directory.
fn watch_directory(file_path: &Path) -> &Path {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Check if a notify event is relevant to a specific file
pub(crate) fn is_event_relevant_to_file(event: &Event, target_file_name: &str) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy() == target_file_name)
            .unwrap_or(false)
    })
}
