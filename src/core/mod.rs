//! Runtime core: dispatch and lifecycle.
//!
//! The public API from this module is [`Supervisor`] (with its [`Config`] and
//! run results) and the signal helper [`wait_for_shutdown_signal`].
//!
//! Internal modules:
//! - [`supervisor`]: reads the destination list, launches actors, handles shutdown;
//! - [`actor`]: admits and runs a single push worker;
//! - [`runner`]: runs a worker once and publishes its outcome;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod actor;
mod config;
mod runner;
mod shutdown;
mod supervisor;

pub use config::Config;
pub use shutdown::{wait_for_shutdown_signal, ShutdownSignal};
pub use supervisor::{Launch, Phase, RunSummary, Supervisor};
