//! Five sequential stages: script, audio, background, overlay, final mux.
//!
//! Tool failures never abort a run: each stage that shells out writes a
//! placeholder at its declared path instead.

use crate::api::Provider;
use crate::chain::ScriptGenerator;
use crate::config::{Config, VideoSettings};
use crate::ffmpeg::{self, MP4_STUB};
use crate::overlay;
use crate::script::Script;
use crate::tts::{self, SpeechBackend};
use crate::{file_stamp, logi, logok, logw};
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub placeholder: bool,
}

impl Artifact {
    fn real(path: PathBuf) -> Self {
        Self {
            path,
            placeholder: false,
        }
    }

    fn stub(path: PathBuf) -> Self {
        Self {
            path,
            placeholder: true,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct ReelArtifacts {
    pub script: Script,
    pub provider: Provider,
    pub audio: Artifact,
    pub background: Artifact,
    pub overlay: Artifact,
    pub video: Artifact,
    /// Sidecar written when the final mux fails.
    pub metadata: Option<PathBuf>,
    /// Copy of the overlay next to the final video.
    pub subtitles: Option<PathBuf>,
}

pub async fn run_pipeline(
    cfg: &Config,
    generator: &mut ScriptGenerator,
    topic: &str,
) -> Result<ReelArtifacts> {
    let settings = &cfg.settings;
    let video = &settings.video;
    let stamp = file_stamp();

    logi("[1/5] Generating script with AI...");
    let (script, provider) = generator.generate_with_fallback(topic).await;
    logok(format!(
        "Script ready ({} characters, used: {})",
        script.narration().chars().count(),
        provider
    ));

    logi("[2/5] Generating voiceover audio...");
    let audio = stage_audio(cfg, &script, &stamp).await?;
    logok(format!("Audio ready: {}", audio.file_name()));

    logi("[3/5] Creating background video...");
    let background = stage_background(cfg, &stamp).await?;
    logok(format!("Background ready: {}", background.file_name()));

    logi("[4/5] Creating text overlay...");
    let overlay_path = settings.temp_dir.join(format!("overlay_{}.srt", stamp));
    overlay::write_overlay(&script, video.duration_secs, &overlay_path).await?;
    let overlay = Artifact::real(overlay_path);
    logok(format!("Overlay ready: {}", overlay.file_name()));

    logi("[5/5] Assembling final MP4 video...");
    let final_path = settings
        .output_dir
        .join(format!("{}_{}.mp4", safe_file_stem(topic)?, stamp));

    let (video_artifact, metadata) = match ffmpeg::ffmpeg_mux(
        &background.path,
        &audio.path,
        &final_path,
        cfg.tool_timeout(),
    )
    .await
    {
        Ok(()) => (Artifact::real(final_path), None),
        Err(err) => {
            logw(format!("Video assembly failed: {}", err));
            write_stub(&final_path).await?;
            let sidecar = final_path.with_extension("txt");
            fs::write(&sidecar, metadata_text(&script, video, &err.to_string()))
                .await
                .with_context(|| format!("write metadata {}", sidecar.display()))?;
            (Artifact::stub(final_path), Some(sidecar))
        }
    };

    let srt_copy = video_artifact.path.with_extension("srt");
    let subtitles = match fs::copy(&overlay.path, &srt_copy).await {
        Ok(_) => Some(srt_copy),
        Err(err) => {
            logw(format!("Could not copy overlay next to video: {}", err));
            None
        }
    };
    logok("Video complete!");

    Ok(ReelArtifacts {
        script,
        provider,
        audio,
        background,
        overlay,
        video: video_artifact,
        metadata,
        subtitles,
    })
}

async fn stage_audio(cfg: &Config, script: &Script, stamp: &str) -> Result<Artifact> {
    let settings = &cfg.settings;
    let backend = SpeechBackend::for_host();
    let path = tts::voiceover_path(&settings.temp_dir, backend, stamp);

    let outcome = match backend {
        Some(backend) => tts::synthesize(
            backend,
            script.narration(),
            &path,
            settings.speech_rate,
            cfg.tool_timeout(),
        )
        .await
        .map_err(|err| err.to_string()),
        None => Err("no speech facility on this platform".to_string()),
    };

    match outcome {
        Ok(()) => Ok(Artifact::real(path)),
        Err(reason) => {
            logw(format!("TTS not available ({}) - creating silent audio", reason));
            let silent = path.with_extension("wav");
            tts::write_silent_wav(&silent, settings.video.duration_secs).await?;
            Ok(Artifact::stub(silent))
        }
    }
}

async fn stage_background(cfg: &Config, stamp: &str) -> Result<Artifact> {
    let settings = &cfg.settings;
    let path = settings.temp_dir.join(format!("background_{}.mp4", stamp));

    match ffmpeg::ffmpeg_make_background(&settings.video, &path, cfg.tool_timeout()).await {
        Ok(()) => Ok(Artifact::real(path)),
        Err(err) => {
            logw(format!("Background render failed: {}", err));
            write_stub(&path).await?;
            Ok(Artifact::stub(path))
        }
    }
}

async fn write_stub(path: &Path) -> Result<()> {
    fs::write(path, MP4_STUB)
        .await
        .with_context(|| format!("write stub {}", path.display()))
}

fn invalid_filename_regex() -> Result<&'static Regex> {
    static INVALID_RE: OnceCell<Regex> = OnceCell::new();
    INVALID_RE.get_or_try_init(|| {
        Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).context("failed to compile filename regex")
    })
}

/// Topic with filename-hostile characters dropped.
pub fn safe_file_stem(topic: &str) -> Result<String> {
    let cleaned = invalid_filename_regex()?.replace_all(topic, "");
    let cleaned = cleaned.trim().trim_end_matches('.').trim();
    if cleaned.is_empty() {
        return Ok("reel".to_string());
    }
    Ok(cleaned.to_string())
}

pub fn metadata_text(script: &Script, video: &VideoSettings, reason: &str) -> String {
    format!(
        "REEL METADATA\nTopic: {}\nCreated: {}\nDuration: {} seconds\nFormat: {}\nStatus: Video assembly failed - {}\nScript: {}\n",
        script.topic(),
        script.created_at().format("%Y-%m-%d %H:%M"),
        video.duration_secs,
        video.resolution(),
        reason,
        script.narration()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;

    #[test]
    fn stem_drops_invalid_characters() {
        assert_eq!(
            safe_file_stem("Docker for .NET Applications").unwrap(),
            "Docker for .NET Applications"
        );
        assert_eq!(safe_file_stem("A/B: \"C\"? <D>|E*").unwrap(), "AB C DE");
        assert_eq!(safe_file_stem("???").unwrap(), "reel");
    }

    #[test]
    fn metadata_carries_topic_format_and_script() {
        let script = Script::build("Records", "Records are neat.").unwrap();
        let text = metadata_text(&script, &VideoSettings::default(), "ffmpeg missing");
        assert!(text.starts_with("REEL METADATA\nTopic: Records\n"));
        assert!(text.contains("Format: 1080x1920"));
        assert!(text.contains("Duration: 30 seconds"));
        assert!(text.contains("Status: Video assembly failed - ffmpeg missing"));
        assert!(text.ends_with("Script: Records are neat.\n"));
    }

    #[tokio::test]
    async fn pipeline_always_leaves_a_file_at_the_declared_path() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.settings.output_dir = root.path().join("out");
        cfg.settings.temp_dir = root.path().join("tmp");
        cfg.settings.tool_timeout_secs = 30;
        cfg.settings.video.width = 108;
        cfg.settings.video.height = 192;
        cfg.settings.video.duration_secs = 4;
        crate::init::ensure_directories(&cfg.settings).await.unwrap();

        let mut generator = ScriptGenerator::with_providers(Vec::new(), Credentials::default());
        let reel = run_pipeline(&cfg, &mut generator, "Quantum Widgets").await.unwrap();

        assert_eq!(reel.provider, Provider::Local);
        for artifact in [&reel.audio, &reel.background, &reel.overlay, &reel.video] {
            assert!(artifact.path.is_file(), "missing {}", artifact.path.display());
        }
        assert!(reel.video.path.starts_with(&cfg.settings.output_dir));
        assert!(reel.video.file_name().starts_with("Quantum Widgets_"));
        assert_eq!(reel.metadata.is_some(), reel.video.placeholder);
        assert!(reel.subtitles.as_ref().is_some_and(|p| p.is_file()));
    }
}
