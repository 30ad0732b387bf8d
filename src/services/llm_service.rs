use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A single hosted LLM endpoint. `LlmService` layers the primary/secondary
/// fallback on top; providers themselves do one attempt, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String>;
}

/// Primary provider. The Gemini REST API takes a single prompt, so the
/// system and user prompts are combined into one text part.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        let combined = format!("{}\n\nUser Request: {}", system_prompt, user_prompt);
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            GEMINI_MODEL
        );
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": combined }] }]
        });

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Gemini API error {}: {}", status, text));
        }

        let body: JsonValue = res.json().await?;
        body.get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response format"))
    }
}

/// Secondary provider. Groq exposes an OpenAI-compatible chat completions
/// API, so the request shape mirrors the standard messages array.
pub struct GroqProvider {
    client: Client,
    api_key: String,
}

impl GroqProvider {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        let payload = serde_json::json!({
            "model": GROQ_MODEL,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": 0.4
        });

        let res = self
            .client
            .post(format!("{}/chat/completions", GROQ_BASE_URL))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Groq API error {}: {}", status, text));
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid Groq response format"))
    }
}

/// Text generator with a primary and a single fallback provider. Either may
/// be absent depending on configuration; a call fails only once every
/// configured provider has failed (or none is configured at all).
#[derive(Clone)]
pub struct LlmService {
    primary: Option<Arc<dyn LlmProvider>>,
    secondary: Option<Arc<dyn LlmProvider>>,
}

impl LlmService {
    pub fn from_config(config: &crate::config::Config, client: Client) -> Self {
        let primary = config
            .gemini_api_key
            .clone()
            .map(|key| Arc::new(GeminiProvider::new(key, client.clone())) as Arc<dyn LlmProvider>);
        let secondary = config
            .groq_api_key
            .clone()
            .map(|key| Arc::new(GroqProvider::new(key, client)) as Arc<dyn LlmProvider>);

        if primary.is_none() && secondary.is_none() {
            tracing::warn!("No LLM provider configured; generation requests will fail");
        }

        Self { primary, secondary }
    }

    pub fn with_providers(
        primary: Option<Arc<dyn LlmProvider>>,
        secondary: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }

    pub async fn generate_text(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        if let Some(primary) = &self.primary {
            match primary.generate(system_prompt, user_prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::error!(provider = primary.name(), error = ?e, "Primary LLM provider failed");
                    if self.secondary.is_none() {
                        return Err(Error::Provider(format!(
                            "{} failed and no fallback provider is configured: {}",
                            primary.name(),
                            e
                        )));
                    }
                }
            }
        }

        if let Some(secondary) = &self.secondary {
            tracing::info!(provider = secondary.name(), "Switching to fallback LLM provider");
            return secondary
                .generate(system_prompt, user_prompt)
                .await
                .map_err(|e| {
                    tracing::error!(provider = secondary.name(), error = ?e, "Fallback LLM provider failed");
                    Error::Provider(format!("{} failed: {}", secondary.name(), e))
                });
        }

        Err(Error::Provider(
            "No LLM provider configured or available".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_provider(name: &'static str) -> MockLlmProvider {
        let mut mock = MockLlmProvider::new();
        mock.expect_name().return_const(name);
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("boom")));
        mock
    }

    fn succeeding_provider(name: &'static str, reply: &'static str) -> MockLlmProvider {
        let mut mock = MockLlmProvider::new();
        mock.expect_name().return_const(name);
        mock.expect_generate()
            .times(1)
            .returning(move |_, _| Ok(reply.to_string()));
        mock
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let primary = succeeding_provider("gemini", "hello");
        let mut secondary = MockLlmProvider::new();
        secondary.expect_generate().times(0);

        let svc = LlmService::with_providers(Some(Arc::new(primary)), Some(Arc::new(secondary)));
        let out = svc.generate_text("sys", "user").await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn primary_failure_falls_through_to_secondary() {
        let primary = failing_provider("gemini");
        let secondary = succeeding_provider("groq", "fallback reply");

        let svc = LlmService::with_providers(Some(Arc::new(primary)), Some(Arc::new(secondary)));
        let out = svc.generate_text("sys", "user").await.unwrap();
        assert_eq!(out, "fallback reply");
    }

    #[tokio::test]
    async fn secondary_only_configuration_works() {
        let secondary = succeeding_provider("groq", "solo");

        let svc = LlmService::with_providers(None, Some(Arc::new(secondary)));
        let out = svc.generate_text("sys", "user").await.unwrap();
        assert_eq!(out, "solo");
    }

    #[tokio::test]
    async fn primary_failure_without_secondary_is_fatal() {
        let primary = failing_provider("gemini");

        let svc = LlmService::with_providers(Some(Arc::new(primary)), None);
        let err = svc.generate_text("sys", "user").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn both_failing_surfaces_secondary_error() {
        let primary = failing_provider("gemini");
        let secondary = failing_provider("groq");

        let svc = LlmService::with_providers(Some(Arc::new(primary)), Some(Arc::new(secondary)));
        let err = svc.generate_text("sys", "user").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn no_providers_configured_fails() {
        let svc = LlmService::with_providers(None, None);
        let err = svc.generate_text("sys", "user").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }
}
