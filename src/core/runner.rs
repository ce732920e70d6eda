//! # Run a worker once.
//!
//! Executes a [`Worker`] with a child cancellation token and publishes exactly
//! one terminal event to the [`Bus`].
//!
//! ## Event flow
//! ```text
//! Clean exit:
//!   worker.run() → Ok(())            → publish WorkerStopped
//!
//! Cancellation:
//!   worker.run() → Err(Canceled)     → publish WorkerStopped (reason = cancelled)
//!
//! Failure:
//!   worker.run() → Err(Spawn/Wait/Exited) → publish WorkerFailed (reason, output)
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `WorkerStopped` or `WorkerFailed`
//! - Never retries

use tokio_util::sync::CancellationToken;

use crate::{
    error::PushError,
    events::{Bus, Event, EventKind},
    push::Worker,
};

/// Executes `worker` once, publishing its outcome to `bus`.
///
/// Parent cancellation propagates to the worker through a child token.
pub async fn run_once<W: Worker + ?Sized>(
    worker: &W,
    parent: &CancellationToken,
    bus: &Bus,
) -> Result<(), PushError> {
    let child = parent.child_token();
    let res = worker.run(child).await;

    match &res {
        Ok(()) => bus.publish(
            Event::new(EventKind::WorkerStopped).with_worker(worker.id(), worker.destination()),
        ),
        Err(e) if !e.is_failure() => bus.publish(
            Event::new(EventKind::WorkerStopped)
                .with_worker(worker.id(), worker.destination())
                .with_reason(e.to_string()),
        ),
        Err(e) => {
            let mut ev = Event::new(EventKind::WorkerFailed)
                .with_worker(worker.id(), worker.destination())
                .with_reason(e.to_string());
            if let Some(output) = e.output() {
                ev = ev.with_output(output);
            }
            bus.publish(ev);
        }
    }
    res
}
