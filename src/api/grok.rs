use super::{
    MAX_OUTPUT_TOKENS, NarrationProvider, Provider, ProviderError, TEMPERATURE,
    extract_chat_choice, narration_from, require_key, send_for_json,
};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

pub struct GrokClient {
    http: Client,
    api_key: String,
    model: String,
    url: String,
}

impl GrokClient {
    pub fn new(http: Client, cfg: &Config) -> Self {
        Self {
            http,
            api_key: cfg.credentials.grok.clone(),
            model: cfg.settings.providers.grok_model.clone(),
            url: cfg.settings.providers.grok_url.clone(),
        }
    }
}

pub(crate) fn request_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "user", "content": prompt},
        ],
        "temperature": TEMPERATURE,
        "max_tokens": MAX_OUTPUT_TOKENS,
    })
}

#[async_trait]
impl NarrationProvider for GrokClient {
    fn provider(&self) -> Provider {
        Provider::Grok
    }

    async fn generate(&self, topic: &str, prompt: &str) -> Result<String, ProviderError> {
        let key = require_key(Provider::Grok, &self.api_key)?;
        debug!(topic, model = %self.model, "requesting Grok narration");

        let request = self
            .http
            .post(&self.url)
            .bearer_auth(key)
            .json(&request_body(&self.model, prompt));

        let root = send_for_json(Provider::Grok, request).await?;
        narration_from(Provider::Grok, &root, extract_chat_choice)
    }
}
