//! # Push workers.
//!
//! - [`Worker`] - trait for a cancelable unit bound to one destination
//! - [`PushWorker`] - runs the encoder for one destination
//! - [`command`] - the fixed encoder argument template
//! - `capture` - bounded combined stdout/stderr buffer

pub mod command;

mod capture;
mod task;
mod worker;

pub use task::{Worker, WorkerRef};
pub use worker::PushWorker;
