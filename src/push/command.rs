//! # Encoder invocation template.
//!
//! Every push worker runs the encoder with the same fixed argument shape:
//!
//! ```text
//! <encoder> [encoder_args..] -re -stream_loop -1 -i <source>
//!           -vcodec copy -acodec aac -ar 44100 -f flv <destination>
//! ```
//!
//! - `-re`: read the input at its native frame rate (real-time pacing)
//! - `-stream_loop -1`: loop the input forever
//! - `-vcodec copy`: pass video through untouched
//! - `-acodec aac -ar 44100`: transcode audio to 44.1 kHz AAC
//! - `-f flv <destination>`: mux as FLV and push to the destination

use std::ffi::OsString;
use std::path::Path;

use tokio::process::Command;

/// Audio codec every stream is transcoded to.
pub const AUDIO_CODEC: &str = "aac";
/// Audio sample rate every stream is resampled to.
pub const AUDIO_SAMPLE_RATE: &str = "44100";
/// Container used on the wire.
pub const OUTPUT_FORMAT: &str = "flv";

/// Builds the fixed push argument list for one destination.
pub fn push_args(source: &Path, destination: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(14);
    for a in ["-re", "-stream_loop", "-1", "-i"] {
        args.push(a.into());
    }
    args.push(source.as_os_str().to_owned());
    for a in [
        "-vcodec",
        "copy",
        "-acodec",
        AUDIO_CODEC,
        "-ar",
        AUDIO_SAMPLE_RATE,
        "-f",
        OUTPUT_FORMAT,
    ] {
        args.push(a.into());
    }
    args.push(destination.into());
    args
}

/// Builds the encoder command: program, its leading arguments, then the push template.
pub fn encoder_command(
    program: &Path,
    leading: &[OsString],
    source: &Path,
    destination: &str,
) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(leading).args(push_args(source, destination));
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn template_matches_encoder_contract() {
        let args = push_args(Path::new("clip.mp4"), "rtmp://live/app/key");
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            args,
            vec![
                "-re",
                "-stream_loop",
                "-1",
                "-i",
                "clip.mp4",
                "-vcodec",
                "copy",
                "-acodec",
                "aac",
                "-ar",
                "44100",
                "-f",
                "flv",
                "rtmp://live/app/key",
            ]
        );
    }

    #[test]
    fn leading_args_come_before_template() {
        let cmd = encoder_command(
            Path::new("nice"),
            &["-n".into(), "10".into(), "ffmpeg".into()],
            Path::new("clip.mp4"),
            "rtmp://a",
        );
        let std = cmd.as_std();
        assert_eq!(std.get_program(), "nice");
        let args: Vec<&OsStr> = std.get_args().collect();
        assert_eq!(&args[..4], &["-n", "10", "ffmpeg", "-re"]);
        assert_eq!(args.last().copied(), Some(OsStr::new("rtmp://a")));
    }
}
