//! # WorkerActor: admission and execution of one push worker.
//!
//! ## Flow
//! ```text
//! Supervisor ──► set.spawn(WorkerActor::run(child_token))
//!
//!   ├─► cancelled already?          → exit
//!   ├─► acquire semaphore (optional, cancellable)
//!   │     ├─ closed / cancelled     → exit
//!   │     └─ permit held until the encoder exits
//!   ├─► publish WorkerStarting
//!   └─► run_once() ─────► worker.run()
//!                              ▼
//!                   publish WorkerStopped / WorkerFailed
//! ```
//!
//! ## Rules
//! - Exactly **one** attempt: there is no restart and no backoff
//! - Cancellation is checked before and during admission; after that it is
//!   the worker's job to honor it

use std::sync::Arc;

use tokio::{select, sync::Semaphore};
use tokio_util::sync::CancellationToken;

use crate::{
    core::runner::run_once,
    events::{Bus, Event, EventKind},
    push::WorkerRef,
};

/// Runs a single worker under the optional admission limit.
pub struct WorkerActor {
    /// Worker to execute.
    pub worker: WorkerRef,
    /// Internal event bus (used to publish lifecycle events).
    pub bus: Bus,
    /// Optional global limit on running encoders.
    pub semaphore: Option<Arc<Semaphore>>,
}

impl WorkerActor {
    /// Creates a new worker actor.
    pub fn new(bus: Bus, worker: WorkerRef, semaphore: Option<Arc<Semaphore>>) -> Self {
        Self {
            worker,
            bus,
            semaphore,
        }
    }

    /// Runs the worker once, unless cancelled before it is admitted.
    pub async fn run(self, runtime_token: CancellationToken) {
        if runtime_token.is_cancelled() {
            return;
        }
        let _permit = match &self.semaphore {
            Some(sem) => {
                let permit = sem.clone().acquire_owned();
                select! {
                    biased;
                    _ = runtime_token.cancelled() => return,
                    res = permit => match res {
                        Ok(permit) => Some(permit),
                        Err(_closed) => return,
                    },
                }
            }
            None => None,
        };

        self.bus.publish(
            Event::new(EventKind::WorkerStarting)
                .with_worker(self.worker.id(), self.worker.destination()),
        );
        let _ = run_once(self.worker.as_ref(), &runtime_token, &self.bus).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PushError;
    use crate::push::Worker;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Hold(u32);

    #[async_trait]
    impl Worker for Hold {
        fn id(&self) -> u32 {
            self.0
        }
        fn destination(&self) -> &str {
            "rtmp://hold"
        }
        async fn run(&self, ctx: CancellationToken) -> Result<(), PushError> {
            ctx.cancelled().await;
            Err(PushError::Canceled {
                destination: "rtmp://hold".into(),
            })
        }
    }

    #[tokio::test]
    async fn waits_for_permit_and_exits_on_cancel() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let sem = Arc::new(Semaphore::new(1));
        let token = CancellationToken::new();

        let first = tokio::spawn(
            WorkerActor::new(bus.clone(), Arc::new(Hold(1)), Some(sem.clone())).run(token.child_token()),
        );
        let second = tokio::spawn(
            WorkerActor::new(bus.clone(), Arc::new(Hold(2)), Some(sem.clone())).run(token.child_token()),
        );

        let ev = rx.recv().await.expect("first starts");
        assert_eq!((ev.kind, ev.worker), (EventKind::WorkerStarting, Some(1)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sem.available_permits(), 0);

        token.cancel();
        first.await.expect("first joins");
        second.await.expect("second joins");

        let ev = rx.recv().await.expect("first stops");
        assert_eq!((ev.kind, ev.worker), (EventKind::WorkerStopped, Some(1)));
        // The second worker was never admitted.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancelled_before_start_runs_nothing() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        token.cancel();

        WorkerActor::new(bus, Arc::new(Hold(1)), None).run(token).await;
        assert!(rx.try_recv().is_err());
    }
}
