use crate::ffmpeg::{ToolError, run_cmd};
use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

const PLACEHOLDER_SAMPLE_RATE: u32 = 16_000;
const ESPEAK_PITCH: &str = "50";

/// Host speech facilities, one per supported OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechBackend {
    /// System.Speech via PowerShell.
    WindowsSapi,
    MacSay,
    EspeakNg,
}

impl SpeechBackend {
    pub fn for_host() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(SpeechBackend::WindowsSapi)
        } else if cfg!(target_os = "macos") {
            Some(SpeechBackend::MacSay)
        } else if cfg!(target_os = "linux") {
            Some(SpeechBackend::EspeakNg)
        } else {
            None
        }
    }

    /// Container the backend writes natively.
    pub fn extension(self) -> &'static str {
        match self {
            SpeechBackend::MacSay => "aiff",
            SpeechBackend::WindowsSapi | SpeechBackend::EspeakNg => "wav",
        }
    }

    /// The narration travels as a process argument; nothing goes through a
    /// shell except the PowerShell script, where single quotes are doubled.
    pub fn command(self, narration: &str, out: &Path, rate_wpm: u32) -> Vec<String> {
        let out = out.display().to_string();
        match self {
            SpeechBackend::WindowsSapi => {
                let script = format!(
                    "Add-Type -AssemblyName System.Speech; \
                     $speak = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
                     $speak.Rate = 0; $speak.Volume = 100; \
                     $speak.SetOutputToWaveFile('{}'); \
                     $speak.Speak('{}'); $speak.Dispose()",
                    ps_quote(&out),
                    ps_quote(narration)
                );
                vec![
                    "powershell.exe".to_string(),
                    "-NoProfile".to_string(),
                    "-NonInteractive".to_string(),
                    "-Command".to_string(),
                    script,
                ]
            }
            SpeechBackend::MacSay => vec![
                "say".to_string(),
                "-o".to_string(),
                out,
                "-r".to_string(),
                rate_wpm.to_string(),
                narration.to_string(),
            ],
            SpeechBackend::EspeakNg => vec![
                "espeak-ng".to_string(),
                "-w".to_string(),
                out,
                "-s".to_string(),
                rate_wpm.to_string(),
                "-p".to_string(),
                ESPEAK_PITCH.to_string(),
                narration.to_string(),
            ],
        }
    }
}

fn ps_quote(text: &str) -> String {
    text.replace('\'', "''")
}

/// Staging path for the voiceover, named after the backend's container.
pub fn voiceover_path(temp_dir: &Path, backend: Option<SpeechBackend>, stamp: &str) -> PathBuf {
    let ext = backend.map(SpeechBackend::extension).unwrap_or("wav");
    temp_dir.join(format!("voiceover_{}.{}", stamp, ext))
}

pub async fn synthesize(
    backend: SpeechBackend,
    narration: &str,
    out: &Path,
    rate_wpm: u32,
    timeout: Duration,
) -> Result<(), ToolError> {
    let args = backend.command(narration, out, rate_wpm);
    run_cmd(&args, timeout).await?;

    let written = fs::metadata(out).await.map(|m| m.len() > 0).unwrap_or(false);
    if !written {
        return Err(ToolError::MissingOutput {
            program: args[0].clone(),
            path: out.display().to_string(),
        });
    }
    Ok(())
}

/// Mono 16-bit silence, long enough to cover the reel.
pub async fn write_silent_wav(path: &Path, duration_secs: u32) -> Result<()> {
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: PLACEHOLDER_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&target, spec)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        let samples = PLACEHOLDER_SAMPLE_RATE as u64 * duration_secs as u64;
        for _ in 0..samples {
            writer.write_sample(0i16)?;
        }
        writer.finalize()?;
        Ok(())
    })
    .await
    .context("silent audio task panicked")?
}
