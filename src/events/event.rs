//! # Runtime events emitted by the supervisor and push workers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Dispatch events**: the supervisor walking the destination list
//! - **Worker events**: one push worker's lifecycle (starting, stopped, failed)
//! - **Shutdown events**: signal observed, grace outcome
//! - **Subscriber events**: overflow and panics in subscriber workers
//!
//! The [`Event`] struct carries the metadata (destination, worker id, reason,
//! captured encoder output) relevant to its kind.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use pushvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::WorkerFailed)
//!     .with_worker(2, "rtmp://live.example/app/key")
//!     .with_reason("encoder exit status: 1")
//!     .with_output("Connection refused");
//!
//! assert_eq!(ev.kind, EventKind::WorkerFailed);
//! assert_eq!(ev.worker, Some(2));
//! assert_eq!(ev.destination.as_deref(), Some("rtmp://live.example/app/key"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets `reason` to `subscriber=<name> info=<panic message>`.
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `reason` to `subscriber=<name> reason=<full|closed>`.
    SubscriberOverflow,

    // === Dispatch events ===
    /// A push worker was launched for a destination.
    ///
    /// Sets `worker` (1-based launch ordinal) and `destination`.
    WorkerLaunched,

    /// The destination list was exhausted.
    ///
    /// Sets `count`: number of workers launched.
    DispatchFinished,

    /// The destination list held no non-blank address; nothing to wait for.
    NoDestinations,

    /// Reading the destination list failed; dispatch halted.
    ///
    /// Sets `reason` and `count` (workers launched before the failure).
    ListFailed,

    // === Worker events ===
    /// The worker was admitted and is starting its encoder.
    ///
    /// Sets `worker` and `destination`.
    WorkerStarting,

    /// The encoder exited cleanly, or was killed by cancellation.
    ///
    /// Sets `worker`, `destination`; `reason` is set when cancelled.
    WorkerStopped,

    /// The encoder could not be started or exited non-zero.
    ///
    /// Sets `worker`, `destination`, `reason` and `output` (captured stdout/stderr).
    WorkerFailed,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// All workers stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some workers did not stop in time.
    ///
    /// Sets `grace_ms` and `reason` (comma-separated destinations still running).
    GraceExceeded,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Launch ordinal of the worker (starting from 1).
    pub worker: Option<u32>,
    /// Destination address the worker pushes to.
    pub destination: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Captured combined encoder output.
    pub output: Option<Arc<str>>,
    /// Number of workers launched (dispatch events).
    pub count: Option<usize>,
    /// Grace period in milliseconds (compact).
    pub grace_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            destination: None,
            reason: None,
            output: None,
            count: None,
            grace_ms: None,
        }
    }

    /// Attaches the worker ordinal and its destination.
    #[inline]
    pub fn with_worker(mut self, worker: u32, destination: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker);
        self.destination = Some(destination.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches captured encoder output.
    #[inline]
    pub fn with_output(mut self, output: impl Into<Arc<str>>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Attaches a launch count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a grace period (stored as milliseconds).
    #[inline]
    pub fn with_grace(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.grace_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}
