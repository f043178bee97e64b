//! Stream adaptor over a spawned tailer.

use crate::config::TailerConfig;
use crate::error::Result;
use crate::listener::TailerEvent;
use crate::tailer::{Tailer, TailerHandle};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// A stream of lines from a tailed file.
///
/// Yields every delivered line and every reported error; the remaining
/// notifications are dropped. Dropping the stream stops the tailer.
pub struct LineStream {
    receiver: mpsc::UnboundedReceiver<TailerEvent>,
    handle: TailerHandle,
}

impl LineStream {
    /// Spawns a tailer for `config` on the current tokio runtime.
    pub fn new(config: TailerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Tailer::spawn(config, tx);

        LineStream {
            receiver: rx,
            handle,
        }
    }

    /// Handle controlling the underlying tailer.
    pub fn handle(&self) -> &TailerHandle {
        &self.handle
    }
}

impl Drop for LineStream {
    fn drop(&mut self) {
        self.handle.stop();
    }
}

impl Stream for LineStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.receiver).poll_recv(cx) {
                Poll::Ready(Some(TailerEvent::Line(line))) => return Poll::Ready(Some(Ok(line))),
                Poll::Ready(Some(TailerEvent::Error(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(Some(_)) => continue,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLogFile;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    fn from_start(temp: &TempLogFile) -> TailerConfig {
        TailerConfig::builder(temp.path())
            .delay(Duration::from_millis(20))
            .tail_from_end(false)
            .build()
            .unwrap()
    }

    // Helper function to collect stream items with timeout
    async fn collect_stream_items(
        stream: &mut LineStream,
        max_items: usize,
        timeout: Duration,
    ) -> Vec<String> {
        let mut items = Vec::new();
        let start = tokio::time::Instant::now();

        while items.len() < max_items && start.elapsed() < timeout {
            match tokio::time::timeout(Duration::from_millis(50), stream.next()).await {
                Ok(Some(Ok(item))) => items.push(item),
                Ok(Some(Err(_))) => break,
                Ok(None) => break,
                Err(_) => continue,
            }
        }

        items
    }

    #[tokio::test]
    async fn test_line_stream_reads_existing_content() {
        let temp = TempLogFile::with_raw(b"alpha\nbeta\n").unwrap();
        let mut stream = LineStream::new(from_start(&temp));

        let items = collect_stream_items(&mut stream, 2, Duration::from_secs(2)).await;
        assert_eq!(items, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_line_stream_follows_appends() {
        let temp = TempLogFile::new().unwrap();
        let mut stream = LineStream::new(from_start(&temp));

        temp.append_line("appended").unwrap();

        let items = collect_stream_items(&mut stream, 1, Duration::from_secs(2)).await;
        assert_eq!(items, vec!["appended"]);
    }

    #[tokio::test]
    async fn test_line_stream_stops_tailer_on_drop() {
        let temp = TempLogFile::new().unwrap();
        let stream = LineStream::new(from_start(&temp));
        let handle = stream.handle().clone();

        // Let the loop start
        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(stream);

        tokio::time::timeout(Duration::from_secs(1), handle.join())
            .await
            .expect("tailer should exit after the stream is dropped");
    }

    #[tokio::test]
    async fn test_line_stream_ends_after_interrupt() {
        let temp = TempLogFile::new().unwrap();
        let mut stream = LineStream::new(from_start(&temp));
        stream.handle().interrupt();

        let first = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .unwrap();
        assert!(matches!(first, Some(Err(e)) if e.is_interrupted()));
    }
}
