//! # Push worker: one encoder process for one destination.
//!
//! ## Flow
//! ```text
//! run(ctx)
//!   ├─► spawn encoder (fixed template, stdout+stderr piped, kill_on_drop)
//!   │     └─ spawn error ──► Err(Spawn)
//!   ├─► select:
//!   │     ├─ encoder exit (pipes drained into OutputBuffer)
//!   │     │     ├─ status 0     ──► Ok(())
//!   │     │     ├─ status != 0  ──► Err(Exited { status, output })
//!   │     │     └─ wait error   ──► Err(Wait { output })
//!   │     └─ ctx cancelled ──► kill encoder, reap ──► Err(Canceled)
//! ```
//!
//! A worker never retries. A clean exit is not an error: the encoder may stop
//! on its own.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::error::PushError;
use crate::push::capture::{capture, OutputBuffer};
use crate::push::command::encoder_command;
use crate::push::task::Worker;

/// Drives the encoder for one destination.
#[derive(Debug, Clone)]
pub struct PushWorker {
    id: u32,
    destination: String,
    source: Arc<Path>,
    encoder: PathBuf,
    encoder_args: Vec<OsString>,
    output_limit: usize,
}

impl PushWorker {
    /// Creates a worker pushing `source` to `destination` with the encoder settings from `cfg`.
    pub fn new(id: u32, destination: impl Into<String>, source: Arc<Path>, cfg: &Config) -> Self {
        Self {
            id,
            destination: destination.into(),
            source,
            encoder: cfg.encoder.clone(),
            encoder_args: cfg.encoder_args.clone(),
            output_limit: cfg.output_limit,
        }
    }

    /// Source file this worker reads.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Runs the encoder to completion, or until `ctx` is cancelled.
    pub async fn push(&self, ctx: CancellationToken) -> Result<(), PushError> {
        let mut cmd = encoder_command(
            &self.encoder,
            &self.encoder_args,
            &self.source,
            &self.destination,
        );
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| PushError::Spawn {
            destination: self.destination.clone(),
            source,
        })?;

        let output = OutputBuffer::new(self.output_limit);
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let exited = {
            let run = async {
                let (status, (), ()) = tokio::join!(
                    child.wait(),
                    capture(stdout, &output),
                    capture(stderr, &output)
                );
                status
            };
            tokio::select! {
                status = run => Some(status),
                _ = ctx.cancelled() => None,
            }
        };

        let Some(status) = exited else {
            let _ = child.start_kill();
            let _ = child.wait().await;
            return Err(PushError::Canceled {
                destination: self.destination.clone(),
            });
        };

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(PushError::Exited {
                destination: self.destination.clone(),
                status,
                output: output.contents(),
            }),
            Err(source) => Err(PushError::Wait {
                destination: self.destination.clone(),
                source,
                output: output.contents(),
            }),
        }
    }
}

#[async_trait]
impl Worker for PushWorker {
    fn id(&self) -> u32 {
        self.id
    }

    fn destination(&self) -> &str {
        &self.destination
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), PushError> {
        self.push(ctx).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Config running `/bin/sh -c <script>` in place of the encoder.
    ///
    /// `sh -c` binds the push template to `$0..$13`, so the script sees the
    /// source as `$4` and the destination as `${13}`.
    fn fake_encoder(script: &str) -> Config {
        Config {
            encoder: PathBuf::from("/bin/sh"),
            encoder_args: vec!["-c".into(), script.into()],
            ..Config::default()
        }
    }

    fn worker(cfg: &Config) -> PushWorker {
        PushWorker::new(1, "rtmp://live/a", Arc::from(Path::new("clip.mp4")), cfg)
    }

    #[tokio::test]
    async fn clean_exit_is_success() {
        let cfg = fake_encoder("exit 0");
        worker(&cfg)
            .push(CancellationToken::new())
            .await
            .expect("clean exit");
    }

    #[tokio::test]
    async fn encoder_sees_template_arguments() {
        let cfg = fake_encoder(r#"printf '%s %s %s %s\n' "$0" "$3" "$4" "${13}"; exit 1"#);
        let err = worker(&cfg)
            .push(CancellationToken::new())
            .await
            .expect_err("non-zero exit");
        assert_eq!(err.output(), Some("-re -i clip.mp4 rtmp://live/a\n"));
    }

    #[tokio::test]
    async fn non_zero_exit_carries_combined_output() {
        let cfg = fake_encoder("echo progress; echo 'clip.mp4: No such file or directory' >&2; exit 1");
        let err = worker(&cfg)
            .push(CancellationToken::new())
            .await
            .expect_err("non-zero exit");

        assert_eq!(err.as_label(), "push_exited");
        assert_eq!(err.destination(), "rtmp://live/a");
        let output = err.output().expect("captured output");
        assert!(output.contains("progress"));
        assert!(output.contains("No such file or directory"));
        match err {
            PushError::Exited { status, .. } => assert_eq!(status.code(), Some(1)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_encoder_is_spawn_error() {
        let cfg = Config {
            encoder: PathBuf::from("/nonexistent/encoder"),
            ..Config::default()
        };
        let err = worker(&cfg)
            .push(CancellationToken::new())
            .await
            .expect_err("spawn failure");
        assert_eq!(err.as_label(), "push_spawn");
        assert!(err.output().is_none());
    }

    #[tokio::test]
    async fn cancellation_kills_encoder() {
        let cfg = fake_encoder("exec sleep 30");
        let ctx = CancellationToken::new();
        let cancel = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });

        let err = tokio::time::timeout(Duration::from_secs(5), worker(&cfg).push(ctx))
            .await
            .expect("worker stops on cancel")
            .expect_err("cancelled");
        assert!(!err.is_failure());
    }

    #[tokio::test]
    async fn output_is_bounded() {
        let cfg = Config {
            output_limit: 4,
            ..fake_encoder("printf 'frame=1 frame=2'; exit 1")
        };
        let err = worker(&cfg)
            .push(CancellationToken::new())
            .await
            .expect_err("non-zero exit");
        assert_eq!(err.output(), Some("me=2"));
    }
}
