//! # Global runtime configuration.
//!
//! Provides [`Config`], the centralized settings for the push supervisor and
//! every worker it launches.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no admission semaphore created)
//! - `output_limit = 0` → keep all captured encoder output

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `stagger`: pause after each launch before reading the next destination
/// - `grace`: maximum wait for workers to stop once cancelled
/// - `max_concurrent`: running encoder limit (`0` = unlimited)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `encoder`: encoder program, resolved through `PATH` when not absolute
/// - `encoder_args`: arguments placed before the fixed push template
/// - `output_limit`: bytes of combined encoder output kept per worker (`0` = all)
#[derive(Clone, Debug)]
pub struct Config {
    /// Delay between successive worker launches.
    ///
    /// Spreads startup load when many destinations are configured.
    pub stagger: Duration,

    /// Maximum time to wait for workers after cancellation.
    ///
    /// When a shutdown signal is received:
    /// - every worker's cancellation token fires and its encoder is killed
    /// - the supervisor waits up to `grace` for the workers to exit
    /// - if the wait times out, the rest are aborted and `GraceExceeded` is published
    pub grace: Duration,

    /// Maximum number of encoder processes running at once.
    ///
    /// Launching is unaffected: a launched worker waits for a permit before
    /// starting its encoder.
    pub max_concurrent: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Encoder program.
    pub encoder: PathBuf,

    /// Arguments passed to the encoder ahead of the push template.
    pub encoder_args: Vec<OsString>,

    /// Bytes of combined stdout/stderr retained per worker for diagnostics.
    pub output_limit: usize,
}

impl Config {
    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` encoders run at once
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `stagger = 1s`
    /// - `grace = 10s`
    /// - `max_concurrent = 0` (unlimited)
    /// - `bus_capacity = 1024`
    /// - `encoder = "ffmpeg"`, no leading arguments
    /// - `output_limit = 64 KiB`
    fn default() -> Self {
        Self {
            stagger: Duration::from_secs(1),
            grace: Duration::from_secs(10),
            max_concurrent: 0,
            bus_capacity: 1024,
            encoder: PathBuf::from("ffmpeg"),
            encoder_args: Vec::new(),
            output_limit: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_stagger_one_second_unlimited() {
        let cfg = Config::default();
        assert_eq!(cfg.stagger, Duration::from_secs(1));
        assert_eq!(cfg.concurrency_limit(), None);
        assert_eq!(cfg.encoder, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn sentinels() {
        let cfg = Config {
            max_concurrent: 3,
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.concurrency_limit(), Some(3));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
