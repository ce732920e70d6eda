//! # LogWriter: event-to-`tracing` bridge
//!
//! Turns incoming [`Event`]s into `tracing` records. Where those records end up
//! (stderr, a log file) is decided by whoever installs the `tracing` subscriber,
//! usually the binary.
//!
//! ## Example output
//! ```text
//! INFO  worker launched worker=1 destination=rtmp://a
//! INFO  start pushing worker=1 destination=rtmp://a
//! ERROR push rtmp://a failed: encoder exit status: 1 worker=1 destination=rtmp://a output=...
//! INFO  dispatch finished launched=2
//! INFO  shutdown requested
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.unwrap_or_default();
        let destination = e.destination.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::WorkerLaunched => {
                tracing::info!(worker, destination, "worker launched");
            }
            EventKind::WorkerStarting => {
                tracing::info!(worker, destination, "start pushing");
            }
            EventKind::WorkerStopped => {
                if e.reason.is_some() {
                    tracing::info!(worker, destination, reason, "push stopped");
                } else {
                    tracing::info!(worker, destination, "push finished");
                }
            }
            EventKind::WorkerFailed => {
                tracing::error!(
                    worker,
                    destination,
                    output = e.output.as_deref().unwrap_or(""),
                    "{reason}"
                );
            }
            EventKind::DispatchFinished => {
                tracing::info!(launched = e.count.unwrap_or_default(), "dispatch finished");
            }
            EventKind::NoDestinations => {
                tracing::info!("no destination to push");
            }
            EventKind::ListFailed => {
                tracing::error!(
                    launched = e.count.unwrap_or_default(),
                    "destination list failed: {reason}"
                );
            }
            EventKind::ShutdownRequested => {
                tracing::info!("shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!("all workers stopped within grace");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(
                    grace_ms = e.grace_ms.unwrap_or_default(),
                    stuck = reason,
                    "grace exceeded"
                );
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!("subscriber overflow: {reason}");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!("subscriber panicked: {reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_worker_record_names_the_destination() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let ev = Event::new(EventKind::WorkerFailed)
            .with_worker(3, "rtmp://live/c")
            .with_reason("push rtmp://live/c failed: encoder exit status: 1")
            .with_output("Connection refused");
        LogWriter::new().on_event(&ev).await;

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("ERROR"));
        assert!(text.contains("worker=3"));
        assert!(text.contains("destination=\"rtmp://live/c\"") || text.contains("destination=rtmp://live/c"));
        assert!(text.contains("Connection refused"));
    }
}
