//! Error types used by the push supervisor and its workers.
//!
//! This module defines two enums:
//!
//! - [`RuntimeError`]: errors raised by the supervisor itself (destination list,
//!   signal registration, reuse).
//! - [`PushError`]: the outcome of a single push worker that did not exit cleanly.
//!
//! Both provide `as_label` for logs.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// # Errors produced by the supervisor.
///
/// Worker failures never show up here: they are contained in the worker and
/// reported as events.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The destination list could not be opened or read.
    #[error("read destination list {}: {source}", .path.display())]
    ListRead {
        /// Path of the destination list.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Shutdown signal handlers could not be registered.
    #[error("register shutdown signal handlers: {source}")]
    Signal {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The supervisor was already run; a supervisor dispatches once.
    #[error("supervisor already started")]
    AlreadyStarted,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use pushvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::AlreadyStarted.as_label(), "runtime_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::ListRead { .. } => "runtime_list_read",
            RuntimeError::Signal { .. } => "runtime_signal",
            RuntimeError::AlreadyStarted => "runtime_already_started",
        }
    }
}

/// # Outcome of a push worker that did not exit cleanly.
///
/// Every variant names the destination. Variants raised after the encoder was
/// started also carry the captured combined stdout/stderr.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PushError {
    /// The encoder process could not be started.
    #[error("push {destination} failed: launch encoder: {source}")]
    Spawn {
        destination: String,
        source: std::io::Error,
    },

    /// Waiting on the encoder process failed.
    #[error("push {destination} failed: wait for encoder: {source}")]
    Wait {
        destination: String,
        source: std::io::Error,
        output: String,
    },

    /// The encoder exited with a non-zero status.
    #[error("push {destination} failed: encoder {status}")]
    Exited {
        destination: String,
        status: ExitStatus,
        output: String,
    },

    /// The worker's cancellation context fired; the encoder was killed.
    #[error("push {destination} cancelled")]
    Canceled { destination: String },
}

impl PushError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PushError::Spawn { .. } => "push_spawn",
            PushError::Wait { .. } => "push_wait",
            PushError::Exited { .. } => "push_exited",
            PushError::Canceled { .. } => "push_canceled",
        }
    }

    /// Destination the failed worker was pushing to.
    pub fn destination(&self) -> &str {
        match self {
            PushError::Spawn { destination, .. }
            | PushError::Wait { destination, .. }
            | PushError::Exited { destination, .. }
            | PushError::Canceled { destination } => destination,
        }
    }

    /// Captured encoder output, if the encoder got far enough to produce any.
    pub fn output(&self) -> Option<&str> {
        match self {
            PushError::Wait { output, .. } | PushError::Exited { output, .. } => Some(output),
            PushError::Spawn { .. } | PushError::Canceled { .. } => None,
        }
    }

    /// `Canceled` is a graceful stop, everything else is a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, PushError::Canceled { .. })
    }
}
