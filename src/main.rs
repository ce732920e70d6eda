//! pushvisor - push one video to every destination in a list
//!
//! # Examples
//!
//! ```bash
//! # Push clip.mp4 to every address in rtmp.txt, one second apart
//! pushvisor --rtmp rtmp.txt --video clip.mp4
//!
//! # At most 8 encoders at once, logs appended to /var/log/pushvisor/main.log
//! LOG_PATH=/var/log/pushvisor pushvisor -r rtmp.txt -v clip.mp4 --max-concurrent 8
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{builder::NonEmptyStringValueParser, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pushvisor::{Config, LogWriter, Subscribe, Supervisor};

/// Push a video file to many streaming destinations at once
#[derive(Parser, Debug)]
#[command(name = "pushvisor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Destination list: one address per line, blank lines ignored
    #[arg(short, long, value_name = "FILE", value_parser = NonEmptyStringValueParser::new())]
    rtmp: String,

    /// Media file pushed to every destination
    #[arg(short, long, value_name = "FILE", value_parser = NonEmptyStringValueParser::new())]
    video: String,

    /// Delay between two worker launches, in milliseconds
    #[arg(long, default_value_t = 1000)]
    stagger_ms: u64,

    /// Maximum number of encoders running at once (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_concurrent: usize,

    /// Seconds to wait for encoders to stop after a shutdown signal
    #[arg(long, default_value_t = 10)]
    grace_secs: u64,

    /// Encoder program
    #[arg(long, env = "PUSHVISOR_ENCODER", default_value = "ffmpeg")]
    encoder: PathBuf,

    /// Directory for main.log; logs go to stderr when unset
    #[arg(long, env = "LOG_PATH")]
    log_dir: Option<PathBuf>,

    /// Increase verbosity (can be used multiple times)
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            stagger: Duration::from_millis(self.stagger_ms),
            grace: Duration::from_secs(self.grace_secs),
            max_concurrent: self.max_concurrent,
            encoder: self.encoder.clone(),
            ..Config::default()
        }
    }
}

fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    match log_dir {
        Some(dir) => {
            let path = dir.join("main.log");
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_dir.as_deref())?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = Supervisor::new(cli.config(), subs);

    let summary = sup.run(&cli.rtmp, &cli.video).await.map_err(|e| {
        tracing::error!(label = e.as_label(), "run error: {e}");
        e
    })?;
    tracing::info!(launched = summary.launched(), "exit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_both_flags() {
        let cli = Cli::try_parse_from(["pushvisor", "-r", "rtmp.txt", "--video", "clip.mp4"])
            .expect("valid args");
        assert_eq!(cli.rtmp, "rtmp.txt");
        assert_eq!(cli.video, "clip.mp4");
        let cfg = cli.config();
        assert_eq!(cfg.stagger, Duration::from_secs(1));
        assert_eq!(cfg.concurrency_limit(), None);
    }

    #[test]
    fn missing_video_is_rejected() {
        let err = Cli::try_parse_from(["pushvisor", "--rtmp", "rtmp.txt"]).expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_rtmp_is_rejected() {
        let err = Cli::try_parse_from(["pushvisor", "--rtmp", "", "--video", "clip.mp4"])
            .expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn tuning_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "pushvisor",
            "-r",
            "rtmp.txt",
            "-v",
            "clip.mp4",
            "--stagger-ms",
            "250",
            "--max-concurrent",
            "4",
            "--grace-secs",
            "3",
            "--encoder",
            "/opt/ffmpeg/bin/ffmpeg",
        ])
        .expect("valid args");
        let cfg = cli.config();
        assert_eq!(cfg.stagger, Duration::from_millis(250));
        assert_eq!(cfg.max_concurrent, 4);
        assert_eq!(cfg.grace, Duration::from_secs(3));
        assert_eq!(cfg.encoder, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
    }
}
