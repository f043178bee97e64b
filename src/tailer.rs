//! The polling loop that follows a file and its control handle.

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use tokio::fs::File;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::config::TailerConfig;
use crate::error::{Error, Result};
use crate::file_id::{FileId, is_replaced};
use crate::fingerprint::{FINGERPRINT_SIZE, Fingerprint};
use crate::listener::TailerListener;
use crate::reader::{LineSplitter, detect_file_truncation, read_new_lines};
use crate::watcher::FileWatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Run,
    Stop,
    Interrupt,
}

#[derive(Debug)]
struct Shared {
    path: std::path::PathBuf,
    signal: watch::Sender<Signal>,
    finished: watch::Sender<bool>,
    started: AtomicBool,
    /// Mirrors `finished` for waiters outside any runtime.
    exited: Mutex<bool>,
    exited_signal: Condvar,
}

impl Shared {
    fn mark_finished(&self) {
        self.finished.send_replace(true);
        let mut exited = self.exited.lock().unwrap_or_else(PoisonError::into_inner);
        *exited = true;
        self.exited_signal.notify_all();
    }
}

/// Controls a tailer from any thread or task.
///
/// Cloning is cheap; every clone controls the same tailer.
#[derive(Debug, Clone)]
pub struct TailerHandle {
    shared: Arc<Shared>,
}

impl TailerHandle {
    /// The path being tailed.
    pub fn file(&self) -> &Path {
        &self.shared.path
    }

    /// Asks the loop to end after its current step. Never blocks.
    pub fn stop(&self) {
        self.shared.signal.send_if_modified(|signal| {
            if *signal == Signal::Run {
                *signal = Signal::Stop;
                true
            } else {
                false
            }
        });
    }

    /// Stops the loop and waits up to `timeout` for it to exit.
    ///
    /// Returns `true` when no further polling can happen: either the loop exited,
    /// or it never started and will see the stop before its first poll.
    pub async fn stop_timeout(&self, timeout: Duration) -> bool {
        self.stop();
        if !self.shared.started.load(Ordering::Acquire) {
            return true;
        }
        tokio::time::timeout(timeout, self.join()).await.is_ok()
    }

    /// Like [`stop_timeout`](Self::stop_timeout), but blocks the calling thread.
    ///
    /// Meant for callers without a runtime, such as the owner of a tailer started
    /// with [`Tailer::spawn_on_thread`]. Calling it from a task of the runtime that
    /// drives the tailer stalls that runtime.
    pub fn stop_timeout_blocking(&self, timeout: Duration) -> bool {
        self.stop();
        if !self.shared.started.load(Ordering::Acquire) {
            return true;
        }

        let exited = self
            .shared
            .exited
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (exited, _) = self
            .shared
            .exited_signal
            .wait_timeout_while(exited, timeout, |exited| !*exited)
            .unwrap_or_else(PoisonError::into_inner);
        *exited
    }

    /// Breaks the poll sleep. The listener receives [`Error::Interrupted`] and the
    /// loop exits.
    pub fn interrupt(&self) {
        self.shared.signal.send_if_modified(|signal| {
            if *signal == Signal::Run {
                *signal = Signal::Interrupt;
                true
            } else {
                false
            }
        });
    }

    /// Waits until the loop has exited, or the tailer was dropped without running.
    pub async fn join(&self) {
        let mut finished = self.shared.finished.subscribe();
        let _ = finished.wait_for(|done| *done).await;
    }

    /// Whether the loop has started and not yet exited.
    pub fn is_running(&self) -> bool {
        self.shared.started.load(Ordering::Acquire) && !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        *self.shared.finished.borrow()
    }
}

/// Mutable state of one run, owned by the polling loop alone.
struct RunState {
    file: Option<File>,
    file_id: Option<FileId>,
    /// Bytes consumed from the current file, including any parked partial line.
    position: u64,
    last_length: u64,
    last_modified: Option<SystemTime>,
    fingerprint: Fingerprint,
    splitter: LineSplitter,
    /// Whether a file has been established and `position` is meaningful.
    tracking: bool,
    /// Next established file is a replacement of the previous one.
    rotation_pending: bool,
    /// Next established file is read from its beginning.
    from_beginning: bool,
    missing_reported: bool,
    consecutive_errors: u32,
}

impl RunState {
    fn new(config: &TailerConfig) -> Self {
        Self {
            file: None,
            file_id: None,
            position: 0,
            last_length: 0,
            last_modified: None,
            fingerprint: Fingerprint::default(),
            splitter: LineSplitter::new(config.buffer_size(), config.max_line_length()),
            tracking: false,
            rotation_pending: false,
            from_beginning: false,
            missing_reported: false,
            consecutive_errors: 0,
        }
    }

    /// Abandons the current file; the next poll establishes a file from scratch.
    fn forget(&mut self) {
        self.file = None;
        self.file_id = None;
        self.position = 0;
        self.last_length = 0;
        self.last_modified = None;
        self.fingerprint = Fingerprint::default();
        self.splitter.reset();
        self.tracking = false;
        self.from_beginning = true;
    }
}

enum Pause {
    Elapsed,
    Woken,
    SignalChanged(bool),
    WatcherFailed(notify::Error),
    WatcherClosed,
}

/// Follows one file and reports to one listener.
///
/// Build it with [`Tailer::new`] and drive [`Tailer::run`] on any executor, or use
/// [`Tailer::spawn`] / [`Tailer::spawn_on_thread`]. `run` consumes the tailer, so a
/// tailer can only ever be polled by one loop.
pub struct Tailer<L: TailerListener> {
    config: TailerConfig,
    listener: L,
    handle: TailerHandle,
    signal: watch::Receiver<Signal>,
}

impl<L: TailerListener> Tailer<L> {
    /// Creates a tailer and calls the listener's `init`. No I/O happens here.
    pub fn new(config: TailerConfig, mut listener: L) -> Self {
        let (signal, signal_rx) = watch::channel(Signal::Run);
        let (finished, _) = watch::channel(false);
        let handle = TailerHandle {
            shared: Arc::new(Shared {
                path: config.path().to_path_buf(),
                signal,
                finished,
                started: AtomicBool::new(false),
                exited: Mutex::new(false),
                exited_signal: Condvar::new(),
            }),
        };

        listener.init(&handle);

        Self {
            config,
            listener,
            handle,
            signal: signal_rx,
        }
    }

    pub fn handle(&self) -> TailerHandle {
        self.handle.clone()
    }

    pub fn file(&self) -> &Path {
        self.config.path()
    }

    pub fn config(&self) -> &TailerConfig {
        &self.config
    }

    /// Runs the polling loop until stopped, interrupted, or out of retries.
    ///
    /// Nothing is returned to the caller; every fault goes to the listener.
    pub async fn run(mut self) {
        self.handle.shared.started.store(true, Ordering::Release);
        debug!("Tailing {}", self.config.path().display());
        self.run_loop().await;
        debug!("Stopped tailing {}", self.config.path().display());
    }

    async fn run_loop(&mut self) {
        let mut state = RunState::new(&self.config);
        let mut buffer = vec![0u8; self.config.buffer_size()];
        let mut wakeup = self.start_wakeup();

        loop {
            match self.current_signal() {
                Signal::Run => {}
                Signal::Stop => return,
                Signal::Interrupt => {
                    self.listener.handle_error(Error::Interrupted);
                    return;
                }
            }

            match self.poll(&mut state, &mut buffer).await {
                Ok(()) => state.consecutive_errors = 0,
                Err(e) => {
                    state.consecutive_errors += 1;
                    warn!(
                        "Poll of {} failed ({} in a row): {}",
                        self.config.path().display(),
                        state.consecutive_errors,
                        e
                    );
                    // Reopened by path on the next cycle
                    state.file = None;
                    self.listener.handle_error(e);

                    if state.consecutive_errors >= self.config.max_consecutive_errors() {
                        self.listener.handle_error(Error::RetriesExhausted {
                            attempts: state.consecutive_errors,
                        });
                        return;
                    }
                }
            }

            if self.config.reopen() && state.file.take().is_some() {
                trace!("Closed {} until next poll", self.config.path().display());
            }

            if !self.pause(&mut wakeup).await {
                return;
            }
        }
    }

    /// One poll cycle: find the file, detect rotation, read what is new.
    async fn poll(&mut self, state: &mut RunState, buffer: &mut [u8]) -> Result<()> {
        let metadata = match tokio::fs::metadata(self.config.path()).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.on_missing(state, buffer).await;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("{} is a directory", self.config.path().display()),
            )));
        }

        if state.tracking {
            let replaced = is_replaced(state.file_id, FileId::from_metadata(&metadata));
            let truncated = detect_file_truncation(metadata.len(), state.position);
            if replaced || truncated {
                debug!(
                    "Rotation of {} (replaced: {}, size {} -> {})",
                    self.config.path().display(),
                    replaced,
                    state.last_length,
                    metadata.len()
                );
                if replaced {
                    self.drain_previous(state, buffer).await;
                }
                self.listener.file_rotated();
                state.forget();
            }
        }

        if !state.tracking && !self.establish(state).await? {
            return Ok(());
        }

        if state.file.is_none() && !self.reopen(state).await? {
            return Ok(());
        }

        self.read_available(state, buffer, &metadata).await
    }

    /// Opens the file for the first time, or again after a rotation.
    ///
    /// Returns `false` if it vanished before it could be opened.
    async fn establish(&mut self, state: &mut RunState) -> Result<bool> {
        let Some(mut file) = open(self.config.path()).await? else {
            self.report_missing(state);
            return Ok(false);
        };
        let metadata = file.metadata().await?;
        let fingerprint = Fingerprint::read(&mut file, FINGERPRINT_SIZE).await?;
        state.missing_reported = false;

        if state.rotation_pending {
            state.rotation_pending = false;
            self.listener.file_rotated();
        }

        state.position = if state.from_beginning || !self.config.tail_from_end() {
            0
        } else {
            metadata.len()
        };
        state.last_length = state.position;
        state.last_modified = metadata.modified().ok();
        state.file_id = FileId::from_metadata(&metadata);
        state.fingerprint = fingerprint;
        state.file = Some(file);
        state.tracking = true;
        state.from_beginning = false;

        debug!(
            "Opened {} at position {}",
            self.config.path().display(),
            state.position
        );
        Ok(true)
    }

    /// Reopens the tracked file by path after it was closed.
    ///
    /// A closed file's inode may be reused by its replacement, so the head of the
    /// reopened file must still match what was seen before.
    async fn reopen(&mut self, state: &mut RunState) -> Result<bool> {
        let Some(mut file) = open(self.config.path()).await? else {
            self.on_vanished(state);
            return Ok(false);
        };
        let metadata = file.metadata().await?;
        let file_id = FileId::from_metadata(&metadata);
        let fingerprint = Fingerprint::read(&mut file, FINGERPRINT_SIZE).await?;

        let replaced = is_replaced(state.file_id, file_id);
        if replaced || !fingerprint.continues(&state.fingerprint) {
            debug!(
                "Rotation of {} on reopen (replaced: {}, head of {} bytes changed)",
                self.config.path().display(),
                replaced,
                state.fingerprint.len()
            );
            self.listener.file_rotated();
            state.splitter.reset();
            state.position = 0;
            state.last_length = 0;
            state.last_modified = None;
        }

        state.file_id = file_id;
        state.fingerprint = fingerprint;
        state.file = Some(file);
        Ok(true)
    }

    async fn read_available(
        &mut self,
        state: &mut RunState,
        buffer: &mut [u8],
        path_metadata: &Metadata,
    ) -> Result<()> {
        let Some(file) = state.file.as_mut() else {
            return Ok(());
        };

        let length = file.metadata().await?.len();
        let modified = path_metadata.modified().ok();
        let newer = match (modified, state.last_modified) {
            (Some(now), Some(before)) => now > before,
            (Some(_), None) => true,
            _ => false,
        };

        if length < state.position {
            // Shrunk between the stat and now; handled as a rotation next cycle
            return Ok(());
        }

        if length > state.position {
            let signal = &self.signal;
            let listener = &mut self.listener;
            let read = read_new_lines(
                file,
                &mut state.position,
                length,
                buffer,
                &mut state.splitter,
                self.config.charset(),
                |line| listener.handle_line(line),
                || *signal.borrow() == Signal::Run,
            )
            .await?;

            trace!(
                "Read {} bytes from {}, {} pending",
                read,
                self.config.path().display(),
                state.splitter.pending()
            );
            self.report_overflows(state);

            if read > 0 && state.position == length {
                self.listener.end_of_file_reached();
            }
        } else if newer {
            trace!(
                "{} touched without growing",
                self.config.path().display()
            );
        }

        state.last_length = length;
        if modified.is_some() {
            state.last_modified = modified;
        }
        Ok(())
    }

    /// The path no longer exists.
    async fn on_missing(&mut self, state: &mut RunState, buffer: &mut [u8]) {
        if state.tracking {
            self.drain_previous(state, buffer).await;
        }
        self.on_vanished(state);
    }

    fn on_vanished(&mut self, state: &mut RunState) {
        if state.tracking {
            debug!("{} disappeared", self.config.path().display());
            state.forget();
            state.rotation_pending = true;
        }
        self.report_missing(state);
    }

    fn report_missing(&mut self, state: &mut RunState) {
        if !state.missing_reported {
            state.missing_reported = true;
            debug!("{} not found", self.config.path().display());
            self.listener.file_not_found();
        }
    }

    /// Delivers lines appended to the old file before it was replaced.
    async fn drain_previous(&mut self, state: &mut RunState, buffer: &mut [u8]) {
        let Some(file) = state.file.as_mut() else {
            return;
        };

        let result = match file.metadata().await {
            Ok(metadata) => {
                let signal = &self.signal;
                let listener = &mut self.listener;
                read_new_lines(
                    file,
                    &mut state.position,
                    metadata.len(),
                    buffer,
                    &mut state.splitter,
                    self.config.charset(),
                    |line| listener.handle_line(line),
                    || *signal.borrow() == Signal::Run,
                )
                .await
            }
            Err(e) => Err(e),
        };

        self.report_overflows(state);
        if let Err(e) = result {
            warn!(
                "Could not drain previous {}: {}",
                self.config.path().display(),
                e
            );
            self.listener.handle_error(e.into());
        }
    }

    fn report_overflows(&mut self, state: &mut RunState) {
        let limit = self.config.max_line_length();
        for _ in 0..state.splitter.take_overflows() {
            warn!(
                "Line in {} exceeds {} bytes, truncating",
                self.config.path().display(),
                limit
            );
            self.listener.handle_error(Error::LineTooLong { limit });
        }
    }

    /// Sleeps for the poll delay. Returns `false` when the loop must exit.
    async fn pause(&mut self, wakeup: &mut Option<FileWatcher>) -> bool {
        let delay = tokio::time::sleep(self.config.delay());
        tokio::pin!(delay);

        loop {
            let outcome = tokio::select! {
                _ = &mut delay => Pause::Elapsed,
                changed = self.signal.changed() => Pause::SignalChanged(changed.is_ok()),
                wake = next_wakeup(wakeup) => match wake {
                    Some(Ok(())) => Pause::Woken,
                    Some(Err(e)) => Pause::WatcherFailed(e),
                    None => Pause::WatcherClosed,
                },
            };

            match outcome {
                Pause::Elapsed => return true,
                Pause::Woken => {
                    trace!("Woken early for {}", self.config.path().display());
                    return true;
                }
                Pause::SignalChanged(false) => return false,
                Pause::SignalChanged(true) => match self.current_signal() {
                    Signal::Run => continue,
                    Signal::Stop => return false,
                    Signal::Interrupt => {
                        self.listener.handle_error(Error::Interrupted);
                        return false;
                    }
                },
                Pause::WatcherFailed(e) => {
                    warn!("File watcher error: {}", e);
                    self.listener.handle_error(e.into());
                }
                Pause::WatcherClosed => {
                    warn!("File watcher closed, falling back to plain polling");
                    *wakeup = None;
                }
            }
        }
    }

    fn start_wakeup(&mut self) -> Option<FileWatcher> {
        if !self.config.notify_wakeup() {
            return None;
        }

        let started = FileWatcher::new(self.config.path()).and_then(|mut watcher| {
            watcher.start_watching()?;
            Ok(watcher)
        });

        match started {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!(
                    "Cannot watch {}, polling only: {}",
                    self.config.path().display(),
                    e
                );
                self.listener.handle_error(e);
                None
            }
        }
    }

    fn current_signal(&mut self) -> Signal {
        *self.signal.borrow_and_update()
    }
}

impl<L: TailerListener + 'static> Tailer<L> {
    /// Creates a tailer and runs it as a tokio task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: TailerConfig, listener: L) -> TailerHandle {
        let tailer = Tailer::new(config, listener);
        let handle = tailer.handle();
        tokio::spawn(tailer.run());
        handle
    }

    /// Creates a tailer and runs it on a dedicated OS thread with its own
    /// single-threaded runtime.
    pub fn spawn_on_thread(config: TailerConfig, listener: L) -> Result<TailerHandle> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Runtime {
                message: e.to_string(),
            })?;

        let name = match config.path().file_name() {
            Some(name) => format!("tailer-{}", name.to_string_lossy()),
            None => "tailer".to_string(),
        };

        let tailer = Tailer::new(config, listener);
        let handle = tailer.handle();
        std::thread::Builder::new()
            .name(name)
            .spawn(move || runtime.block_on(tailer.run()))?;

        Ok(handle)
    }
}

impl<L: TailerListener> Drop for Tailer<L> {
    fn drop(&mut self) {
        self.handle.shared.mark_finished();
    }
}

/// Opens `path`, mapping absence to `None`.
async fn open(path: &Path) -> Result<Option<File>> {
    match File::open(path).await {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn next_wakeup(wakeup: &mut Option<FileWatcher>) -> Option<notify::Result<()>> {
    match wakeup {
        Some(watcher) => watcher.next_relevant().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::TailerEvent;
    use crate::test_helpers::TempLogFile;
    use tokio::sync::mpsc;

    const DELAY: Duration = Duration::from_millis(20);

    fn config_for(path: &Path) -> TailerConfig {
        TailerConfig::builder(path)
            .delay(DELAY)
            .tail_from_end(false)
            .build()
            .unwrap()
    }

    /// Collects lines until `count` arrived or the timeout passed.
    async fn collect_lines(
        rx: &mut mpsc::UnboundedReceiver<TailerEvent>,
        count: usize,
        timeout: Duration,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        let _ = tokio::time::timeout(timeout, async {
            while lines.len() < count {
                match rx.recv().await {
                    Some(TailerEvent::Line(line)) => lines.push(line),
                    Some(_) => {}
                    None => break,
                }
            }
        })
        .await;
        lines
    }

    #[tokio::test]
    async fn test_init_receives_handle() {
        let temp = TempLogFile::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let tailer = Tailer::new(config_for(temp.path()), tx);

        match rx.try_recv() {
            Ok(TailerEvent::Init(handle)) => assert_eq!(handle.file(), temp.path()),
            other => panic!("Expected init event, got {:?}", other),
        }
        assert_eq!(tailer.file(), temp.path());
        assert!(!tailer.handle().is_running());
    }

    #[tokio::test]
    async fn test_reads_existing_content_from_start() {
        let temp = TempLogFile::with_raw(b"first\nsecond\n").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = Tailer::spawn(config_for(temp.path()), tx);
        let lines = collect_lines(&mut rx, 2, Duration::from_secs(2)).await;

        assert_eq!(lines, vec!["first", "second"]);
        assert!(handle.stop_timeout(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_tail_from_end_skips_existing_content() {
        let temp = TempLogFile::with_raw(b"old\n").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = TailerConfig::builder(temp.path())
            .delay(DELAY)
            .build()
            .unwrap();

        let handle = Tailer::spawn(config, tx);
        tokio::time::sleep(DELAY * 3).await;
        temp.append_raw(b"new\n").unwrap();

        let lines = collect_lines(&mut rx, 1, Duration::from_secs(2)).await;
        assert_eq!(lines, vec!["new"]);
        handle.stop_timeout(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_end_of_file_follows_read() {
        let temp = TempLogFile::with_raw(b"only\n").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = Tailer::spawn(config_for(temp.path()), tx);

        let mut saw_line = false;
        let reached = tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(event) = rx.recv().await {
                match event {
                    TailerEvent::Line(_) => saw_line = true,
                    TailerEvent::EndOfFile => return true,
                    _ => {}
                }
            }
            false
        })
        .await
        .unwrap_or(false);

        assert!(saw_line);
        assert!(reached);
        handle.stop_timeout(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_stop_before_run_prevents_polling() {
        let temp = TempLogFile::with_raw(b"never\n").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let tailer = Tailer::new(config_for(temp.path()), tx);
        let handle = tailer.handle();
        assert!(handle.stop_timeout(Duration::from_millis(10)).await);

        tailer.run().await;

        assert!(handle.is_finished());
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, TailerEvent::Init(_)), "unexpected {:?}", event);
        }
    }

    #[tokio::test]
    async fn test_join_returns_when_tailer_dropped_unrun() {
        let temp = TempLogFile::new().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        let tailer = Tailer::new(config_for(temp.path()), tx);
        let handle = tailer.handle();
        drop(tailer);

        tokio::time::timeout(Duration::from_secs(1), handle.join())
            .await
            .expect("join should not hang");
    }

    #[tokio::test]
    async fn test_retries_exhausted_ends_loop() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file
        let path = dir.path().join("not_a_file");
        std::fs::create_dir(&path).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = TailerConfig::builder(&path)
            .delay(Duration::from_millis(5))
            .tail_from_end(false)
            .max_consecutive_errors(2)
            .build()
            .unwrap();

        let handle = Tailer::spawn(config, tx);
        tokio::time::timeout(Duration::from_secs(2), handle.join())
            .await
            .expect("loop should give up");

        let mut io_errors = 0;
        let mut exhausted = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                TailerEvent::Error(Error::Io(_)) => io_errors += 1,
                TailerEvent::Error(Error::RetriesExhausted { attempts }) => {
                    assert_eq!(attempts, 2);
                    exhausted += 1;
                }
                _ => {}
            }
        }
        assert_eq!(io_errors, 2);
        assert_eq!(exhausted, 1);
    }

    #[test]
    fn test_spawn_on_thread_stops_without_a_runtime() {
        let temp = TempLogFile::with_raw(b"threaded\n").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = Tailer::spawn_on_thread(config_for(temp.path()), tx).unwrap();

        loop {
            match rx.blocking_recv() {
                Some(TailerEvent::Line(line)) => {
                    assert_eq!(line, "threaded");
                    break;
                }
                Some(_) => {}
                None => panic!("tailer ended before delivering the line"),
            }
        }

        assert!(handle.stop_timeout_blocking(Duration::from_secs(2)));
        assert!(handle.is_finished());
        assert!(!handle.is_running());
    }

    #[test]
    fn test_stop_timeout_blocking_before_run() {
        let temp = TempLogFile::new().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        let tailer = Tailer::new(config_for(temp.path()), tx);
        let handle = tailer.handle();

        assert!(handle.stop_timeout_blocking(Duration::from_millis(10)));
        drop(tailer);
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_overlong_line_is_truncated_and_reported() {
        let temp = TempLogFile::with_raw(b"0123456789abcdef\nshort\n").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = TailerConfig::builder(temp.path())
            .delay(DELAY)
            .tail_from_end(false)
            .max_line_length(8)
            .build()
            .unwrap();

        let handle = Tailer::spawn(config, tx);

        let mut lines = Vec::new();
        let mut too_long = 0;
        let _ = tokio::time::timeout(Duration::from_secs(2), async {
            while lines.len() < 2 || too_long == 0 {
                match rx.recv().await {
                    Some(TailerEvent::Line(line)) => lines.push(line),
                    Some(TailerEvent::Error(Error::LineTooLong { limit })) => {
                        assert_eq!(limit, 8);
                        too_long += 1;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        })
        .await;

        assert_eq!(lines, vec!["01234567", "short"]);
        assert_eq!(too_long, 1);
        assert!(handle.stop_timeout(Duration::from_secs(1)).await);
    }
}
