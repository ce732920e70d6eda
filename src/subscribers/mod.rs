//! # Event subscribers for the push supervisor.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor / WorkerActor ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                              │
//!                                                              └──► SubscriberSet::emit(&Event)
//!                                                                        │
//!                                                                   ┌────┴────┬─────────┐
//!                                                                   ▼         ▼         ▼
//!                                                                LogWriter  Custom    ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use pushvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::WorkerFailed {
//!             // increment failure counter
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
