//! # pushvisor
//!
//! **Pushvisor** fans a single media source out to many streaming destinations.
//! For every address in a destination list it launches an independent worker
//! that drives an external encoder (`ffmpeg` by default) pushing the source, in
//! a loop, to that address.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   rtmp.txt ──► DestinationSource (one trimmed line at a time)
//!                        │
//!                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - skips blank lines, launches one WorkerActor per destination    │
//! │  - sleeps Config::stagger after each launch                       │
//! │  - waits for SIGINT/SIGTERM/SIGQUIT, then cancels and joins       │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │ WorkerActor  │   │ WorkerActor  │   │ WorkerActor  │   │
//!     │ (admission)  │   │ (admission)  │   │ (admission)  │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ PushWorker       │ PushWorker       │ PushWorker      │
//!      │ ffmpeg → dest 1  │ ffmpeg → dest 2  │ ffmpeg → dest N │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ──► Dispatching ──┬──► WaitingForSignal ──signal──► cancel workers ──► Done
//!                        └──(nothing launched)──────────────────────────────► Done
//! ```
//!
//! Workers never retry. A failed or finished worker simply ends; its outcome is
//! published as an [`Event`] and the other workers keep running.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pushvisor::{Config, LogWriter, Subscribe, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         stagger: Duration::from_millis(500),
//!         max_concurrent: 16,
//!         ..Config::default()
//!     };
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!
//!     Supervisor::new(cfg, subs).run("rtmp.txt", "clip.mp4").await?;
//!     Ok(())
//! }
//! ```

mod core;
mod destinations;
mod error;
mod events;
mod subscribers;

pub mod push;

// ---- Public re-exports ----

pub use crate::core::{
    wait_for_shutdown_signal, Config, Launch, Phase, RunSummary, ShutdownSignal, Supervisor,
};
pub use destinations::DestinationSource;
pub use error::{PushError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use push::{PushWorker, Worker, WorkerRef};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
