use super::{
    MAX_OUTPUT_TOKENS, NarrationProvider, Provider, ProviderError, narration_from, require_key,
    send_for_json,
};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeClient {
    http: Client,
    api_key: String,
    model: String,
    url: String,
}

impl ClaudeClient {
    pub fn new(http: Client, cfg: &Config) -> Self {
        Self {
            http,
            api_key: cfg.credentials.claude.clone(),
            model: cfg.settings.providers.claude_model.clone(),
            url: cfg.settings.providers.claude_url.clone(),
        }
    }
}

pub(crate) fn request_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "max_tokens": MAX_OUTPUT_TOKENS,
        "messages": [
            {"role": "user", "content": prompt},
        ],
    })
}

/// `content[0].text`
pub(crate) fn extract(root: &Value) -> Option<&str> {
    root.get("content")?.get(0)?.get("text")?.as_str()
}

#[async_trait]
impl NarrationProvider for ClaudeClient {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    async fn generate(&self, topic: &str, prompt: &str) -> Result<String, ProviderError> {
        let key = require_key(Provider::Claude, &self.api_key)?;
        debug!(topic, model = %self.model, "requesting Claude narration");

        let request = self
            .http
            .post(&self.url)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body(&self.model, prompt));

        let root = send_for_json(Provider::Claude, request).await?;
        narration_from(Provider::Claude, &root, extract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_content_block() {
        let root = json!({
            "id": "msg_01",
            "type": "message",
            "content": [{"type": "text", "text": "Minimal APIs cut ceremony."}]
        });
        assert_eq!(extract(&root), Some("Minimal APIs cut ceremony."));
    }

    #[test]
    fn error_body_is_reported() {
        let root = json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        });
        let err = narration_from(Provider::Claude, &root, extract).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to parse Claude response: error envelope: Overloaded"
        );
    }
}
