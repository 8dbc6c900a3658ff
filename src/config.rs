use crate::api::Provider;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub const SETTINGS_FILE: &str = "reelgen.json";

/// Provider secrets, read once from the process environment.
///
/// An empty string means the provider is not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub grok: String,
    pub gemini: String,
    pub openai: String,
    pub claude: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        let read = |provider: Provider| {
            provider
                .env_var()
                .and_then(|name| std::env::var(name).ok())
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        Self {
            grok: read(Provider::Grok),
            gemini: read(Provider::Gemini),
            openai: read(Provider::OpenAi),
            claude: read(Provider::Claude),
        }
    }

    pub fn key_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Grok => &self.grok,
            Provider::Gemini => &self.gemini,
            Provider::OpenAi => &self.openai,
            Provider::Claude => &self.claude,
            Provider::Local => "",
        }
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        !self.key_for(provider).is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub grok_model: String,
    pub grok_url: String,
    pub gemini_model: String,
    /// Base of the Gemini models endpoint; `/{model}:generateContent` is appended.
    pub gemini_url: String,
    pub openai_model: String,
    pub openai_url: String,
    pub claude_model: String,
    pub claude_url: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            grok_model: "grok-beta".to_string(),
            grok_url: "https://api.x.ai/v1/chat/completions".to_string(),
            gemini_model: "gemini-pro".to_string(),
            gemini_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_url: "https://api.openai.com/v1/chat/completions".to_string(),
            claude_model: "claude-opus-4-5-20251101".to_string(),
            claude_url: "https://api.anthropic.com/v1/messages".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub duration_secs: u32,
    pub fps: u32,
    pub color: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            duration_secs: 30,
            fps: 30,
            color: "black".to_string(),
        }
    }
}

impl VideoSettings {
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub http_timeout_secs: u64,
    /// Honour `HTTP(S)_PROXY` for provider calls.
    pub use_system_proxy: bool,
    pub tool_timeout_secs: u64,
    /// Words per minute handed to the speech backend.
    pub speech_rate: u32,
    pub video: VideoSettings,
    pub providers: ProviderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output_reels"),
            temp_dir: PathBuf::from("temp_reel_assets"),
            http_timeout_secs: 30,
            use_system_proxy: true,
            tool_timeout_secs: 60,
            speech_rate: 150,
            video: VideoSettings::default(),
            providers: ProviderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: Settings,
    pub credentials: Credentials,
}

impl Config {
    /// Reads `path` if it exists (missing file means defaults) and resolves
    /// credentials from the environment.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Settings::load(path).await?;
        Ok(Self {
            settings,
            credentials: Credentials::from_env(),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.http_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.tool_timeout_secs)
    }
}

impl Settings {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if fs::metadata(path).await.is_err() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;

        if settings.video.width == 0 || settings.video.height == 0 {
            anyhow::bail!("{}: video width/height must be non-zero", path.display());
        }
        if settings.video.duration_secs < 4 {
            anyhow::bail!("{}: video duration_secs must be at least 4", path.display());
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_settings_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("nope.json")).await.unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("output_reels"));
        assert_eq!(settings.temp_dir, PathBuf::from("temp_reel_assets"));
        assert_eq!(settings.video.resolution(), "1080x1920");
        assert_eq!(settings.video.duration_secs, 30);
        assert_eq!(settings.http_timeout_secs, 30);
    }

    #[tokio::test]
    async fn partial_settings_keep_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelgen.json");
        fs::write(&path, r#"{"tool_timeout_secs": 5, "video": {"color": "navy"}}"#)
            .await
            .unwrap();

        let settings = Settings::load(&path).await.unwrap();
        assert_eq!(settings.tool_timeout_secs, 5);
        assert_eq!(settings.video.color, "navy");
        assert_eq!(settings.video.width, 1080);
        assert_eq!(settings.providers.grok_model, "grok-beta");
    }

    #[tokio::test]
    async fn malformed_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelgen.json");
        fs::write(&path, "{ not json").await.unwrap();
        assert!(Settings::load(&path).await.is_err());
    }

    #[test]
    fn empty_key_means_not_configured() {
        let creds = Credentials {
            gemini: "g-key".to_string(),
            ..Credentials::default()
        };
        assert!(!creds.is_configured(Provider::Grok));
        assert!(creds.is_configured(Provider::Gemini));
        assert_eq!(creds.key_for(Provider::Gemini), "g-key");
        assert!(!creds.is_configured(Provider::Local));
    }
}
