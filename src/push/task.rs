//! # Worker abstraction.
//!
//! The supervisor and its actors only see [`Worker`]: something bound to one
//! destination that runs until completion or cancellation. [`PushWorker`](crate::PushWorker)
//! is the encoder-driving implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::PushError;

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;

/// # Asynchronous, cancelable unit bound to one destination.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use pushvisor::{PushError, Worker};
///
/// struct Noop(String);
///
/// #[async_trait]
/// impl Worker for Noop {
///     fn id(&self) -> u32 { 1 }
///     fn destination(&self) -> &str { &self.0 }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), PushError> {
///         if ctx.is_cancelled() {
///             return Err(PushError::Canceled { destination: self.0.clone() });
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Launch ordinal assigned by the supervisor (1-based).
    fn id(&self) -> u32;

    /// Destination address this worker pushes to.
    fn destination(&self) -> &str;

    /// Runs until the work completes or `ctx` is cancelled.
    ///
    /// Returns `Err(PushError::Canceled)` when stopped through `ctx`.
    async fn run(&self, ctx: CancellationToken) -> Result<(), PushError>;
}
