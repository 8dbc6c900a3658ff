use super::{
    MAX_OUTPUT_TOKENS, NarrationProvider, Provider, ProviderError, TEMPERATURE, narration_from,
    require_key, send_for_json,
};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: Client, cfg: &Config) -> Self {
        Self {
            http,
            api_key: cfg.credentials.gemini.clone(),
            model: cfg.settings.providers.gemini_model.clone(),
            base_url: cfg.settings.providers.gemini_url.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

pub(crate) fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [
            {"parts": [{"text": prompt}]},
        ],
        "generationConfig": {
            "temperature": TEMPERATURE,
            "maxOutputTokens": MAX_OUTPUT_TOKENS,
        },
    })
}

/// `candidates[0].content.parts[0].text`
pub(crate) fn extract(root: &Value) -> Option<&str> {
    root.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

#[async_trait]
impl NarrationProvider for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate(&self, topic: &str, prompt: &str) -> Result<String, ProviderError> {
        let key = require_key(Provider::Gemini, &self.api_key)?;
        debug!(topic, model = %self.model, "requesting Gemini narration");

        let request = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&request_body(prompt));

        let root = send_for_json(Provider::Gemini, request).await?;
        narration_from(Provider::Gemini, &root, extract)
    }
}
