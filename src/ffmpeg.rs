use crate::config::VideoSettings;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// First bytes of an MP4 `ftyp` box; stands in for a video ffmpeg could not
/// produce.
pub const MP4_STUB: [u8; 8] = [0x00, 0x00, 0x00, 0x20, 0x66, 0x74, 0x79, 0x70];

const STDERR_TAIL: usize = 600;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} timed out after {secs}s and was killed")]
    TimedOut { program: String, secs: u64 },

    #[error("{program} finished but wrote nothing to {path}")]
    MissingOutput { program: String, path: String },
}

/// Runs `args[0]` with the remaining arguments, killing it when `timeout`
/// elapses.
pub async fn run_cmd(args: &[String], timeout: Duration) -> Result<(), ToolError> {
    let Some((program, rest)) = args.split_first() else {
        return Err(ToolError::EmptyCommand);
    };

    debug!(program = %program, args = ?rest, "running external tool");

    let mut cmd = Command::new(program);
    cmd.args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?,
        Err(_) => {
            return Err(ToolError::TimedOut {
                program: program.clone(),
                secs: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let skip = stderr.chars().count().saturating_sub(STDERR_TAIL);
        return Err(ToolError::NonZeroExit {
            program: program.clone(),
            status: output.status.to_string(),
            stderr: stderr.chars().skip(skip).collect::<String>().trim().to_string(),
        });
    }

    Ok(())
}

pub async fn check_ffmpeg() -> bool {
    let args = vec!["ffmpeg".to_string(), "-version".to_string()];
    run_cmd(&args, Duration::from_secs(5)).await.is_ok()
}

pub fn background_args(video: &VideoSettings, out_mp4: &Path) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-nostdin".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!(
            "color=c={}:s={}:r={}",
            video.color,
            video.resolution(),
            video.fps
        ),
        "-t".to_string(),
        video.duration_secs.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        out_mp4.display().to_string(),
    ]
}

/// Blank colour clip at the reel resolution.
pub async fn ffmpeg_make_background(
    video: &VideoSettings,
    out_mp4: &Path,
    timeout: Duration,
) -> Result<(), ToolError> {
    run_cmd(&background_args(video, out_mp4), timeout).await
}

pub fn mux_args(video_in: &Path, audio_in: &Path, out_mp4: &Path) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-nostdin".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        video_in.display().to_string(),
        "-i".to_string(),
        audio_in.display().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-shortest".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        out_mp4.display().to_string(),
    ]
}

pub async fn ffmpeg_mux(
    video_in: &Path,
    audio_in: &Path,
    out_mp4: &Path,
    timeout: Duration,
) -> Result<(), ToolError> {
    run_cmd(&mux_args(video_in, audio_in, out_mp4), timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn background_uses_reel_geometry() {
        let args = background_args(&VideoSettings::default(), &PathBuf::from("bg.mp4"));
        assert_eq!(args[0], "ffmpeg");
        assert!(args.contains(&"color=c=black:s=1080x1920:r=30".to_string()));
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "30");
        assert_eq!(args.last().map(String::as_str), Some("bg.mp4"));
    }

    #[test]
    fn mux_takes_video_then_audio() {
        let args = mux_args(
            &PathBuf::from("bg.mp4"),
            &PathBuf::from("voice.wav"),
            &PathBuf::from("out.mp4"),
        );
        let inputs: Vec<_> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-i")
            .map(|(i, _)| args[i + 1].as_str())
            .collect();
        assert_eq!(inputs, vec!["bg.mp4", "voice.wav"]);
        assert!(args.contains(&"-shortest".to_string()));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let err = run_cmd(&[], Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ToolError::EmptyCommand));
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let args = vec!["reelgen-no-such-binary-xyz".to_string()];
        let err = run_cmd(&args, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_tool_is_killed_at_timeout() {
        let args = vec!["sleep".to_string(), "5".to_string()];
        let started = std::time::Instant::now();
        let err = run_cmd(&args, Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, ToolError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let args = vec!["false".to_string()];
        let err = run_cmd(&args, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, ToolError::NonZeroExit { .. }));
    }
}
