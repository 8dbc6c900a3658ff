use chrono::{DateTime, Local};
use thiserror::Error;

const MAX_KEY_POINTS: usize = 3;
const MIN_KEY_POINT_CHARS: usize = 10;
const KEY_POINT_FALLBACK_CHARS: usize = 50;
const MIN_DURATION_SECS: usize = 30;

pub const BACKGROUND_STYLE: &str = "Tech minimal with modern animations";
pub const MUSIC_THEME: &str = "Upbeat tech background (royalty-free)";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Generated narration is empty")]
    EmptyNarration,
}

/// Trimmed, non-empty narration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration(String);

impl Narration {
    pub fn parse(raw: &str) -> Result<Self, ScriptError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScriptError::EmptyNarration);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// For text the crate composes itself and knows to be non-blank.
    pub(crate) fn composed(text: String) -> Self {
        debug_assert!(!text.trim().is_empty());
        Self(text.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct Script {
    topic: String,
    narration: String,
    key_points: Vec<String>,
    call_to_action: String,
    background_style: &'static str,
    music_theme: &'static str,
    created_at: DateTime<Local>,
}

impl Script {
    /// Builds a script from raw provider output, with the call-to-action
    /// templated on the topic.
    pub fn build(topic: &str, raw_narration: &str) -> Result<Self, ScriptError> {
        let narration = Narration::parse(raw_narration)?;
        Ok(Self::from_narration(
            topic,
            narration,
            templated_call_to_action(topic),
        ))
    }

    pub fn from_narration(topic: &str, narration: Narration, call_to_action: String) -> Self {
        let key_points = extract_key_points(narration.as_str());
        Self {
            topic: topic.to_string(),
            narration: narration.0,
            key_points,
            call_to_action,
            background_style: BACKGROUND_STYLE,
            music_theme: MUSIC_THEME,
            created_at: Local::now(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn narration(&self) -> &str {
        &self.narration
    }

    pub fn key_points(&self) -> &[String] {
        &self.key_points
    }

    pub fn call_to_action(&self) -> &str {
        &self.call_to_action
    }

    pub fn background_style(&self) -> &str {
        self.background_style
    }

    pub fn music_theme(&self) -> &str {
        self.music_theme
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.narration)
    }

    pub fn estimated_duration_secs(&self) -> usize {
        estimated_duration_secs(self.word_count())
    }
}

pub fn templated_call_to_action(topic: &str) -> String {
    format!("Follow for more {} tips daily! 👍", topic.trim())
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Roughly 120 words per minute, never below the reel length.
pub fn estimated_duration_secs(word_count: usize) -> usize {
    (word_count / 2).max(MIN_DURATION_SECS)
}

/// Up to three sentences longer than ten characters; when none qualify, the
/// first fifty characters of the narration.
pub fn extract_key_points(narration: &str) -> Vec<String> {
    let points: Vec<String> = narration
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_KEY_POINT_CHARS)
        .take(MAX_KEY_POINTS)
        .map(str::to_string)
        .collect();

    if points.is_empty() {
        return vec![narration.chars().take(KEY_POINT_FALLBACK_CHARS).collect()];
    }
    points
}
