//! Perplexity chat-completions provider (fallback).
//!
//! The API key is optional configuration; without one every call fails with
//! [`ProviderErrorKind::MissingApiKey`], which the orchestrator treats like any
//! other provider failure.

use super::{GenerationProvider, status_error, transport_error};
use crate::error::{ProviderError, ProviderErrorKind};
use crate::prompt::Prompt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_MODEL: &str = "sonar-pro";

const NAME: &str = "perplexity";
const TOP_P: f32 = 0.9;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PerplexityProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl PerplexityProvider {
    pub fn new(client: Client, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl GenerationProvider for PerplexityProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(level = "info", skip_all, fields(provider = NAME, model = %self.model, escalated = prompt.escalated))]
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Perplexity API key not set");
            return Err(ProviderError::new(NAME, ProviderErrorKind::MissingApiKey));
        };

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.text,
                },
            ],
            max_tokens: prompt.max_output_tokens,
            temperature: prompt.temperature,
            top_p: TOP_P,
        };

        let t0 = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(api_key)
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(NAME, e))?;

        if !response.status().is_success() {
            let err = status_error(NAME, response).await;
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %err, "Perplexity call failed");
            return Err(err);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(NAME, ProviderErrorKind::Decode(e.to_string())))?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            choices = parsed.choices.len(),
            "Perplexity responded"
        );

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::new(NAME, ProviderErrorKind::NoCandidates))
    }
}
