//! Remote narration providers.
//!
//! Every remote service is reached through [`NarrationProvider`]; the
//! concrete clients differ only in their request envelope, authentication
//! header and the JSON path that holds the narration.

pub mod claude;
pub mod gemini;
pub mod grok;
pub mod openai;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

const MAX_BODY_SNIPPET: usize = 800;

pub(crate) const TEMPERATURE: f64 = 0.7;
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Grok,
    Gemini,
    OpenAi,
    Claude,
    Local,
}

impl Provider {
    /// Remote providers in the order the chain tries them.
    pub const REMOTE: [Provider; 4] = [
        Provider::Grok,
        Provider::Gemini,
        Provider::OpenAi,
        Provider::Claude,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Provider::Grok => "Grok (X.AI)",
            Provider::Gemini => "Google Gemini",
            Provider::OpenAi => "OpenAI GPT",
            Provider::Claude => "Claude (Anthropic)",
            Provider::Local => "Fallback (Hardcoded)",
        }
    }

    pub fn env_var(self) -> Option<&'static str> {
        match self {
            Provider::Grok => Some("GROK_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Claude => Some("CLAUDE_API_KEY"),
            Provider::Local => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Grok => "Grok",
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
            Provider::Local => "Local",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{var} not set. Set environment variable: {var}")]
    CredentialMissing {
        provider: Provider,
        var: &'static str,
    },

    #[error("{provider} API error: {}", describe_call(.status, .detail))]
    RemoteCallFailed {
        provider: Provider,
        status: Option<u16>,
        detail: String,
    },

    #[error("Failed to parse {provider} response: {detail}")]
    ResponseParseFailed { provider: Provider, detail: String },
}

impl ProviderError {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderError::CredentialMissing { provider, .. }
            | ProviderError::RemoteCallFailed { provider, .. }
            | ProviderError::ResponseParseFailed { provider, .. } => *provider,
        }
    }
}

fn describe_call(status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("HTTP {} - {}", code, detail),
        None => detail.to_string(),
    }
}

/// One remote text-generation service.
///
/// Implementations perform exactly one outbound request per call and never
/// retry.
#[async_trait]
pub trait NarrationProvider: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate(&self, topic: &str, prompt: &str) -> Result<String, ProviderError>;
}

pub fn build_prompt(topic: &str) -> String {
    format!(
        "You are a professional .NET educator creating a 30-second Instagram Reel script.\n\nTopic: {}\n\nRequirements:\n1. Write EXACTLY 60-75 words (crucial for 30-second timing)\n2. Start with a hook that grabs attention immediately\n3. Explain ONE key concept clearly and concisely\n4. Include one practical, actionable example\n5. End with a clear call to action\n6. Use conversational, energetic tone\n7. Include relevant technical terms but keep it accessible\n8. Make it memorable and shareable\n\nFormat your response as just the narration text, nothing else. No preamble, no explanation, just the script.",
        topic
    )
}

/// Fails fast when the provider has no credential configured.
pub(crate) fn require_key(provider: Provider, key: &str) -> Result<&str, ProviderError> {
    if key.is_empty() {
        let var = provider.env_var().unwrap_or("API key");
        return Err(ProviderError::CredentialMissing { provider, var });
    }
    Ok(key)
}

fn snippet(raw: &str) -> String {
    raw.chars().take(MAX_BODY_SNIPPET).collect()
}

/// Sends the request and decodes the body as JSON. Non-2xx statuses are
/// reported with the status code and the head of the raw body.
pub(crate) async fn send_for_json(
    provider: Provider,
    request: RequestBuilder,
) -> Result<Value, ProviderError> {
    let resp = request
        .send()
        .await
        .map_err(|err| ProviderError::RemoteCallFailed {
            provider,
            status: None,
            detail: err.to_string(),
        })?;

    let status = resp.status();
    let raw = resp
        .text()
        .await
        .map_err(|err| ProviderError::RemoteCallFailed {
            provider,
            status: Some(status.as_u16()),
            detail: format!("failed to read response body: {}", err),
        })?;
    debug!(%provider, status = status.as_u16(), bytes = raw.len(), "provider response");

    if !status.is_success() {
        return Err(ProviderError::RemoteCallFailed {
            provider,
            status: Some(status.as_u16()),
            detail: snippet(&raw),
        });
    }

    serde_json::from_str(&raw).map_err(|err| ProviderError::ResponseParseFailed {
        provider,
        detail: err.to_string(),
    })
}

/// Pulls the narration out of a decoded response with the provider's
/// `extract` path.
pub(crate) fn narration_from(
    provider: Provider,
    root: &Value,
    extract: fn(&Value) -> Option<&str>,
) -> Result<String, ProviderError> {
    if let Some(text) = extract(root) {
        return Ok(text.to_string());
    }

    let detail = match root
        .get("error")
        .and_then(|err| err.get("message"))
        .and_then(Value::as_str)
    {
        Some(msg) => format!("error envelope: {}", msg),
        None => "narration field missing from response".to_string(),
    };
    Err(ProviderError::ResponseParseFailed { provider, detail })
}

/// `choices[0].message.content`, shared by the chat-completion style APIs.
pub(crate) fn extract_chat_choice(root: &Value) -> Option<&str> {
    root.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}
