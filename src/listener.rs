//! Callbacks through which a tailer reports what it observes.

use tokio::sync::mpsc;

use crate::error::Error;
use crate::tailer::TailerHandle;

/// Receives notifications from a running tailer.
///
/// Every hook is called synchronously from the polling task, so implementations
/// must return promptly. Only [`handle_line`](TailerListener::handle_line) and
/// [`handle_error`](TailerListener::handle_error) are required.
pub trait TailerListener: Send {
    /// Called once when the tailer is constructed, before any I/O.
    fn init(&mut self, _handle: &TailerHandle) {}

    /// The file is absent. Called once each time it goes missing.
    fn file_not_found(&mut self) {}

    /// The file was truncated or replaced; reading restarts at its beginning.
    fn file_rotated(&mut self) {}

    /// A complete line, without its terminator.
    fn handle_line(&mut self, line: String);

    /// A fault seen while polling. The loop keeps going unless the error is
    /// [`Error::Interrupted`] or [`Error::RetriesExhausted`].
    fn handle_error(&mut self, error: Error);

    /// The file was read up to its currently known end.
    fn end_of_file_reached(&mut self) {}
}

/// One listener notification as a value.
#[derive(Debug)]
pub enum TailerEvent {
    Init(TailerHandle),
    FileNotFound,
    FileRotated,
    Line(String),
    Error(Error),
    EndOfFile,
}

/// Forwards every notification into a channel. Send failures are ignored: a
/// dropped receiver just means nobody is listening any more.
impl TailerListener for mpsc::UnboundedSender<TailerEvent> {
    fn init(&mut self, handle: &TailerHandle) {
        let _ = self.send(TailerEvent::Init(handle.clone()));
    }

    fn file_not_found(&mut self) {
        let _ = self.send(TailerEvent::FileNotFound);
    }

    fn file_rotated(&mut self) {
        let _ = self.send(TailerEvent::FileRotated);
    }

    fn handle_line(&mut self, line: String) {
        let _ = self.send(TailerEvent::Line(line));
    }

    fn handle_error(&mut self, error: Error) {
        let _ = self.send(TailerEvent::Error(error));
    }

    fn end_of_file_reached(&mut self) {
        let _ = self.send(TailerEvent::EndOfFile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LinesOnly(Vec<String>);

    impl TailerListener for LinesOnly {
        fn handle_line(&mut self, line: String) {
            self.0.push(line);
        }

        fn handle_error(&mut self, _error: Error) {}
    }

    #[test]
    fn test_default_hooks_are_no_ops() {
        let mut listener = LinesOnly(Vec::new());
        listener.file_not_found();
        listener.file_rotated();
        listener.end_of_file_reached();
        listener.handle_line("kept".to_string());

        assert_eq!(listener.0, vec!["kept"]);
    }

    #[test]
    fn test_channel_listener_forwards_events() {
        let (mut tx, mut rx) = mpsc::unbounded_channel();

        tx.file_not_found();
        tx.file_rotated();
        tx.handle_line("line".to_string());
        tx.handle_error(Error::Interrupted);
        tx.end_of_file_reached();

        assert!(matches!(rx.try_recv(), Ok(TailerEvent::FileNotFound)));
        assert!(matches!(rx.try_recv(), Ok(TailerEvent::FileRotated)));
        assert!(matches!(rx.try_recv(), Ok(TailerEvent::Line(l)) if l == "line"));
        assert!(matches!(rx.try_recv(), Ok(TailerEvent::Error(Error::Interrupted))));
        assert!(matches!(rx.try_recv(), Ok(TailerEvent::EndOfFile)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_listener_survives_dropped_receiver() {
        let (mut tx, rx) = mpsc::unbounded_channel::<TailerEvent>();
        drop(rx);

        tx.handle_line("nobody listens".to_string());
        tx.end_of_file_reached();
    }
}
