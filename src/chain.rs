use crate::api::claude::ClaudeClient;
use crate::api::gemini::GeminiClient;
use crate::api::grok::GrokClient;
use crate::api::openai::OpenAiClient;
use crate::api::{NarrationProvider, Provider, build_prompt};
use crate::config::{Config, Credentials};
use crate::local::{self, LocalGenerator};
use crate::script::Script;
use crate::{logi, logok, logw};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::warn;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CONSOLE_ERROR_CHARS: usize = 40;
const REPORT_TAIL: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success { topic: String },
    Failure { message: String },
}

/// One provider invocation, as recorded by the chain.
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub at: DateTime<Local>,
    pub provider: Provider,
    pub outcome: AttemptOutcome,
}

impl ProviderAttempt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success { .. })
    }
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stamp = self.at.format("%H:%M:%S");
        match &self.outcome {
            AttemptOutcome::Success { topic } => {
                write!(f, "[{}] {} - Topic: {}", stamp, self.provider.label(), topic)
            }
            AttemptOutcome::Failure { message } => {
                write!(f, "[{}] {} - {}", stamp, self.provider.label(), message)
            }
        }
    }
}

/// Tries the remote providers in fixed order and falls back to the local
/// table, so every call yields a script.
pub struct ScriptGenerator {
    providers: Vec<Box<dyn NarrationProvider>>,
    local: LocalGenerator,
    credentials: Credentials,
    attempts: Vec<ProviderAttempt>,
}

impl ScriptGenerator {
    pub fn new(cfg: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(cfg.http_timeout())
            .connect_timeout(CONNECT_TIMEOUT);
        if !cfg.settings.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        let providers: Vec<Box<dyn NarrationProvider>> = vec![
            Box::new(GrokClient::new(http.clone(), cfg)),
            Box::new(GeminiClient::new(http.clone(), cfg)),
            Box::new(OpenAiClient::new(http.clone(), cfg)),
            Box::new(ClaudeClient::new(http, cfg)),
        ];

        Ok(Self::with_providers(providers, cfg.credentials.clone()))
    }

    /// `providers` are tried in the order given, before the local table.
    pub fn with_providers(
        providers: Vec<Box<dyn NarrationProvider>>,
        credentials: Credentials,
    ) -> Self {
        Self {
            providers,
            local: LocalGenerator::new(),
            credentials,
            attempts: Vec::new(),
        }
    }

    pub async fn generate_with_fallback(&mut self, topic: &str) -> (Script, Provider) {
        logi(format!("Attempting to generate script for: '{}'", topic));
        let prompt = build_prompt(topic);

        for entry in &self.providers {
            let provider = entry.provider();
            let built = match entry.generate(topic, &prompt).await {
                Ok(raw) => Script::build(topic, &raw).map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            };

            match built {
                Ok(script) => {
                    logok(format!("{} SUCCESS", provider.label()));
                    record(&mut self.attempts, provider, AttemptOutcome::Success {
                        topic: topic.to_string(),
                    });
                    return (script, provider);
                }
                Err(message) => {
                    let short: String = message.chars().take(CONSOLE_ERROR_CHARS).collect();
                    logw(format!("{} failed ({})", provider.label(), short));
                    warn!(%provider, error = %message, "provider attempt failed");
                    record(&mut self.attempts, provider, AttemptOutcome::Failure { message });
                }
            }
        }

        let narration = self.local.generate(topic);
        let script =
            Script::from_narration(topic, narration, local::CALL_TO_ACTION.to_string());
        logok(format!("{} SUCCESS", Provider::Local.label()));
        record(&mut self.attempts, Provider::Local, AttemptOutcome::Success {
            topic: topic.to_string(),
        });
        (script, Provider::Local)
    }

    pub fn attempts(&self) -> &[ProviderAttempt] {
        &self.attempts
    }

    pub fn status_report(&self) -> String {
        let mut out = String::from("AI PROVIDER STATUS REPORT\n\n");
        for provider in Provider::REMOTE {
            let status = if self.credentials.is_configured(provider) {
                "Ready"
            } else {
                "Not configured"
            };
            out.push_str(&format!("  {:<25} {}\n", provider.label(), status));
        }

        out.push_str("\nSuccess Log:\n");
        let successes = self.attempts.iter().filter(|a| a.is_success());
        push_tail(&mut out, successes, "(No successes yet)");

        out.push_str("\nFailure Log:\n");
        let failures = self.attempts.iter().filter(|a| !a.is_success());
        push_tail(&mut out, failures, "(No failures)");

        out
    }
}

fn record(log: &mut Vec<ProviderAttempt>, provider: Provider, outcome: AttemptOutcome) {
    log.push(ProviderAttempt {
        at: Local::now(),
        provider,
        outcome,
    });
}

fn push_tail<'a>(
    out: &mut String,
    entries: impl Iterator<Item = &'a ProviderAttempt>,
    empty: &str,
) {
    let entries: Vec<_> = entries.collect();
    if entries.is_empty() {
        out.push_str(&format!("  {}\n", empty));
        return;
    }
    let skip = entries.len().saturating_sub(REPORT_TAIL);
    for entry in entries.into_iter().skip(skip) {
        out.push_str(&format!("  {}\n", entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ProviderError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        provider: Provider,
        reply: Result<&'static str, u16>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl NarrationProvider for Scripted {
        fn provider(&self) -> Provider {
            self.provider
        }

        async fn generate(&self, _topic: &str, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(ProviderError::RemoteCallFailed {
                    provider: self.provider,
                    status: Some(status),
                    detail: "nope".to_string(),
                }),
            }
        }
    }

    fn scripted(
        provider: Provider,
        reply: Result<&'static str, u16>,
    ) -> (Box<dyn NarrationProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let boxed: Box<dyn NarrationProvider> = Box::new(Scripted {
            provider,
            reply,
            calls: Arc::clone(&calls),
        });
        (boxed, calls)
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let (grok, grok_calls) = scripted(Provider::Grok, Err(503));
        let (gemini, gemini_calls) = scripted(Provider::Gemini, Ok("Spans avoid allocations."));
        let (openai, openai_calls) = scripted(Provider::OpenAi, Ok("never used"));

        let mut chain =
            ScriptGenerator::with_providers(vec![grok, gemini, openai], Credentials::default());
        let (script, provider) = chain.generate_with_fallback("Span<T>").await;

        assert_eq!(provider, Provider::Gemini);
        assert_eq!(script.narration(), "Spans avoid allocations.");
        assert_eq!(grok_calls.load(Ordering::SeqCst), 1);
        assert_eq!(gemini_calls.load(Ordering::SeqCst), 1);
        assert_eq!(openai_calls.load(Ordering::SeqCst), 0);

        let attempts = chain.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].provider, Provider::Grok);
        assert!(matches!(
            &attempts[0].outcome,
            AttemptOutcome::Failure { message } if message.contains("503")
        ));
        assert_eq!(attempts[1].outcome, AttemptOutcome::Success {
            topic: "Span<T>".to_string()
        });
    }

    #[tokio::test]
    async fn blank_remote_narration_moves_on() {
        let (grok, _) = scripted(Provider::Grok, Ok("   \n"));
        let mut chain = ScriptGenerator::with_providers(vec![grok], Credentials::default());
        let (script, provider) = chain.generate_with_fallback("LINQ Performance Tips").await;

        assert_eq!(provider, Provider::Local);
        assert_eq!(script.call_to_action(), local::CALL_TO_ACTION);
        assert!(matches!(
            &chain.attempts()[0].outcome,
            AttemptOutcome::Failure { message } if message == "Generated narration is empty"
        ));
    }

    #[tokio::test]
    async fn empty_chain_still_produces_script() {
        let mut chain = ScriptGenerator::with_providers(Vec::new(), Credentials::default());
        let (script, provider) = chain.generate_with_fallback("Quantum Widgets").await;
        assert_eq!(provider, Provider::Local);
        assert!(!script.narration().is_empty());
        assert_eq!(chain.attempts().len(), 1);
        assert!(chain.attempts()[0].is_success());
    }

    #[tokio::test]
    async fn status_report_lists_providers_and_logs() {
        let creds = Credentials {
            openai: "sk-test".to_string(),
            ..Credentials::default()
        };
        let (grok, _) = scripted(Provider::Grok, Err(401));
        let mut chain = ScriptGenerator::with_providers(vec![grok], creds);

        let before = chain.status_report();
        assert!(before.contains("(No successes yet)"));
        assert!(before.contains("(No failures)"));

        chain.generate_with_fallback("Records").await;
        let report = chain.status_report();
        assert!(report.contains("OpenAI GPT"));
        assert!(report.contains("Ready"));
        assert!(report.contains("Not configured"));
        assert!(report.contains("Fallback (Hardcoded) - Topic: Records"));
        assert!(report.contains("Grok (X.AI) - Grok API error: HTTP 401 - nope"));
    }

    #[tokio::test]
    async fn report_keeps_only_last_five_failures() {
        let providers = (0..7)
            .map(|_| scripted(Provider::Claude, Err(500)).0)
            .collect();
        let mut chain = ScriptGenerator::with_providers(providers, Credentials::default());
        chain.generate_with_fallback("x").await;

        let report = chain.status_report();
        let failures = report.lines().filter(|l| l.contains("HTTP 500")).count();
        assert_eq!(failures, 5);
        assert_eq!(chain.attempts().len(), 8);
    }
}
