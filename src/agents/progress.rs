//! Progress notifications
//!
//! One-way channel from a running analysis to its host. Sends never wait:
//! a full or closed channel drops the event.

use super::types::{AnalysisPhase, AnalysisProgress};
use tokio::sync::mpsc::{self, error::TrySendError};

#[derive(Debug, Clone)]
pub struct ProgressSink {
    sender: mpsc::Sender<AnalysisProgress>,
}

/// Create a sink and the receiver the host drains
pub fn progress_channel(capacity: usize) -> (ProgressSink, mpsc::Receiver<AnalysisProgress>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ProgressSink { sender }, receiver)
}

impl ProgressSink {
    pub fn notify(&self, progress: AnalysisProgress) {
        match self.sender.try_send(progress) {
            Ok(()) => {}
            Err(TrySendError::Full(p)) => {
                tracing::debug!("[Progress] Channel full, dropped: {}", p.message);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("[Progress] Receiver gone, event dropped");
            }
        }
    }

    pub(crate) fn status(
        &self,
        phase: AnalysisPhase,
        current: usize,
        total: usize,
        current_file: Option<&str>,
        message: impl Into<String>,
    ) {
        self.notify(AnalysisProgress {
            phase,
            current,
            total,
            current_file: current_file.map(str::to_string),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sink, mut rx) = progress_channel(8);
        sink.status(AnalysisPhase::Starting, 0, 2, None, "Analyzing documents...");
        sink.status(AnalysisPhase::Processing, 1, 2, Some("notes.txt"), "Processing document 1 of 2...");
        drop(sink);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.phase, AnalysisPhase::Starting);
        assert_eq!(second.current, 1);
        assert_eq!(first.current_file, None);
        assert_eq!(second.current_file.as_deref(), Some("notes.txt"));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_full_channel_does_not_block() {
        let (sink, _rx) = progress_channel(1);
        sink.status(AnalysisPhase::Starting, 0, 0, None, "first");
        sink.status(AnalysisPhase::Complete, 0, 0, None, "dropped");
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (sink, rx) = progress_channel(1);
        drop(rx);
        sink.status(AnalysisPhase::Complete, 0, 0, None, "nobody listening");
    }
}
