//! # Supervisor: dispatches push workers and drives shutdown.
//!
//! The [`Supervisor`] reads the destination list, launches one [`PushWorker`]
//! per non-blank address (staggered by [`Config::stagger`]), then blocks until a
//! shutdown signal arrives and stops every worker it launched.
//!
//! ## Phases
//! ```text
//! Idle ──run()──► Dispatching ──┬── launched > 0 ──► WaitingForSignal ──signal──► Done
//!                               └── launched = 0 ──────────────────────────────► Done
//! ```
//! Dispatching ends when the list is exhausted or fails to read. A read error
//! does not touch the workers already launched: the supervisor still waits for
//! the signal, and reports the error only once they have been stopped.
//!
//! ## Dispatch loop
//! ```text
//! for line in DestinationSource:
//!   ├─ ""            → skip (no launch, no delay)
//!   ├─ Err(e)        → publish ListFailed, stop dispatching
//!   └─ destination   → set.spawn(WorkerActor::run(runtime_token.child_token()))
//!                      publish WorkerLaunched
//!                      sleep(cfg.stagger)
//! ```
//! Launching is fire-and-forget: the loop never waits on a worker. Outcomes
//! travel over the [`Bus`] instead.
//!
//! ## Shutdown path
//! ```text
//! shutdown future resolves (SIGINT/SIGTERM/SIGQUIT)
//!   └─► Bus.publish(ShutdownRequested)
//!   └─► runtime_token.cancel()   → every encoder is killed
//!   └─► wait_all_with_grace(cfg.grace):
//!          ├─ all joined   → Bus.publish(AllStoppedWithin)
//!          └─ timed out    → Bus.publish(GraceExceeded { stuck }), abort the rest
//! ```
//! An overrun grace period is reported, not returned: the run still ends `Ok`
//! unless the list failed.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use pushvisor::{Config, LogWriter, Subscribe, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sup = Supervisor::new(Config::default(), subs);
//!
//!     let summary = sup.run("rtmp.txt", "clip.mp4").await?;
//!     println!("pushed to {} destinations", summary.launched());
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncBufRead;
use tokio::sync::{
    broadcast::error::{RecvError, TryRecvError},
    watch, Semaphore,
};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::core::{
    actor::WorkerActor,
    shutdown::{self, ShutdownSignal},
    Config,
};
use crate::destinations::DestinationSource;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::push::PushWorker;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Supervisor lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dispatching,
    WaitingForSignal,
    Done,
}

/// One launched worker.
#[derive(Debug, Clone)]
pub struct Launch {
    /// Launch ordinal (1-based), also the worker id in events.
    pub id: u32,
    pub destination: String,
    /// When the worker was handed to the runtime.
    pub at: Instant,
}

/// What a run dispatched.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Launched workers, in list order.
    pub launches: Vec<Launch>,
}

impl RunSummary {
    /// Number of workers launched.
    pub fn launched(&self) -> usize {
        self.launches.len()
    }
}

/// Coordinates push workers, event delivery and graceful shutdown.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    phase: watch::Sender<Phase>,
}

impl Supervisor {
    /// Creates a supervisor; `subscribers` receive every runtime event of the run.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            cfg,
            bus,
            subscribers,
            phase,
        }
    }

    /// Event bus shared with all workers.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Receiver that observes phase changes.
    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Pushes `source` to every destination in `list` until an OS termination signal arrives.
    ///
    /// Returns immediately when the list holds no destination.
    pub async fn run(
        &self,
        list: impl AsRef<Path>,
        source: impl AsRef<Path>,
    ) -> Result<RunSummary, RuntimeError> {
        self.run_until(list, source, shutdown::wait_for_shutdown_signal())
            .await
    }

    /// Like [`run`](Self::run), but `shutdown` decides when to stop.
    ///
    /// `shutdown` is only polled if at least one worker was launched.
    pub async fn run_until<F>(
        &self,
        list: impl AsRef<Path>,
        source: impl AsRef<Path>,
        shutdown: F,
    ) -> Result<RunSummary, RuntimeError>
    where
        F: Future<Output = io::Result<ShutdownSignal>>,
    {
        let list = list.as_ref();
        self.supervise(async {
            match DestinationSource::open(list).await {
                Ok(destinations) => self.drive(destinations, source.as_ref(), shutdown).await,
                Err(e) => {
                    let err = RuntimeError::ListRead {
                        path: list.to_path_buf(),
                        source: e,
                    };
                    self.bus.publish(
                        Event::new(EventKind::ListFailed)
                            .with_reason(err.to_string())
                            .with_count(0),
                    );
                    Err(err)
                }
            }
        })
        .await
    }

    /// Runs `body` as the single run of this supervisor, with events flowing to subscribers.
    async fn supervise<B>(&self, body: B) -> Result<RunSummary, RuntimeError>
    where
        B: Future<Output = Result<RunSummary, RuntimeError>>,
    {
        let started = self.phase.send_if_modified(|p| {
            if *p == Phase::Idle {
                *p = Phase::Dispatching;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(RuntimeError::AlreadyStarted);
        }

        let stop_listener = CancellationToken::new();
        let listener = self.subscriber_listener(stop_listener.clone());

        let res = body.await;
        self.phase.send_replace(Phase::Done);

        stop_listener.cancel();
        let _ = listener.await;
        res
    }

    /// Forwards bus events to the subscriber set.
    ///
    /// On `stop`, drains what is already queued and shuts the subscriber set down.
    fn subscriber_listener(&self, stop: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let subs = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => subs.emit(&ev),
                                Err(TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            subs.shutdown().await;
        })
    }

    async fn drive<R, F>(
        &self,
        mut destinations: DestinationSource<R>,
        source: &Path,
        shutdown: F,
    ) -> Result<RunSummary, RuntimeError>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = io::Result<ShutdownSignal>>,
    {
        let source: Arc<Path> = Arc::from(source);
        let runtime_token = CancellationToken::new();
        let semaphore = self
            .cfg
            .concurrency_limit()
            .map(Semaphore::new)
            .map(Arc::new);

        let mut set = JoinSet::new();
        let mut summary = RunSummary::default();

        let dispatched = self
            .dispatch(
                &mut destinations,
                &source,
                &runtime_token,
                &semaphore,
                &mut set,
                &mut summary,
            )
            .await;

        match &dispatched {
            Ok(()) if summary.launched() == 0 => {
                self.bus.publish(Event::new(EventKind::NoDestinations));
            }
            Ok(()) => self.bus.publish(
                Event::new(EventKind::DispatchFinished).with_count(summary.launched()),
            ),
            Err(e) => self.bus.publish(
                Event::new(EventKind::ListFailed)
                    .with_reason(e.to_string())
                    .with_count(summary.launched()),
            ),
        }
        if summary.launched() == 0 {
            return dispatched.map(|()| summary);
        }

        self.phase.send_replace(Phase::WaitingForSignal);

        let signaled = shutdown.await;
        if let Ok(sig) = &signaled {
            self.bus
                .publish(Event::new(EventKind::ShutdownRequested).with_reason(sig.to_string()));
        }
        runtime_token.cancel();
        self.wait_all_with_grace(&mut set, &summary).await;

        dispatched?;
        signaled.map_err(|source| RuntimeError::Signal { source })?;
        Ok(summary)
    }

    /// Launches one actor per non-blank destination, pausing `cfg.stagger` after each.
    async fn dispatch<R>(
        &self,
        destinations: &mut DestinationSource<R>,
        source: &Arc<Path>,
        runtime_token: &CancellationToken,
        semaphore: &Option<Arc<Semaphore>>,
        set: &mut JoinSet<u32>,
        summary: &mut RunSummary,
    ) -> Result<(), RuntimeError>
    where
        R: AsyncBufRead + Unpin,
    {
        while let Some(line) = destinations.next_line().await {
            let destination = line.map_err(|source| RuntimeError::ListRead {
                path: destinations.path().to_path_buf(),
                source,
            })?;
            if destination.is_empty() {
                continue;
            }

            let id = u32::try_from(summary.launches.len() + 1).unwrap_or(u32::MAX);
            let worker = PushWorker::new(id, destination.as_str(), Arc::clone(source), &self.cfg);
            let actor = WorkerActor::new(self.bus.clone(), Arc::new(worker), semaphore.clone());
            let token = runtime_token.child_token();
            set.spawn(async move {
                actor.run(token).await;
                id
            });

            self.bus
                .publish(Event::new(EventKind::WorkerLaunched).with_worker(id, destination.as_str()));
            summary.launches.push(Launch {
                id,
                destination,
                at: Instant::now(),
            });

            tokio::time::sleep(self.cfg.stagger).await;
        }
        Ok(())
    }

    /// Waits for all actors to finish within the configured grace period.
    ///
    /// Actors still running when it runs out are aborted and named in `GraceExceeded`.
    async fn wait_all_with_grace(&self, set: &mut JoinSet<u32>, summary: &RunSummary) {
        let grace = self.cfg.grace;
        let mut pending: BTreeMap<u32, &str> = summary
            .launches
            .iter()
            .map(|l| (l.id, l.destination.as_str()))
            .collect();

        let done = async {
            while let Some(joined) = set.join_next().await {
                if let Ok(id) = joined {
                    pending.remove(&id);
                }
            }
        };

        match tokio::time::timeout(grace, done).await {
            Ok(()) => self.bus.publish(Event::new(EventKind::AllStoppedWithin)),
            Err(_) => {
                set.abort_all();
                let stuck: Vec<&str> = pending.into_values().collect();
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_grace(grace)
                        .with_reason(stuck.join(", ")),
                );
            }
        }
    }
}
