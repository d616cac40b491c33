//! Google Gemini `generateContent` provider (primary).

use super::{GenerationProvider, status_error, transport_error};
use crate::error::{ProviderError, ProviderErrorKind};
use crate::prompt::Prompt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

const NAME: &str = "gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.text)
    }
}

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(level = "info", skip_all, fields(provider = NAME, model = %self.model, escalated = prompt.escalated))]
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &prompt.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt.text }],
            }],
            generation_config: GenerationConfig {
                temperature: prompt.temperature,
                max_output_tokens: prompt.max_output_tokens,
            },
        };

        let t0 = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(NAME, e))?;

        if !response.status().is_success() {
            let err = status_error(NAME, response).await;
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %err, "Gemini call failed");
            return Err(err);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(NAME, ProviderErrorKind::Decode(e.to_string())))?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            candidates = parsed.candidates.len(),
            "Gemini responded"
        );

        parsed
            .first_text()
            .ok_or_else(|| ProviderError::new(NAME, ProviderErrorKind::NoCandidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::LengthLimits;
    use crate::prompt::PromptBuilder;
    use crate::models::{HistoryTheme, Topic};
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt() -> Prompt {
        PromptBuilder::new(
            LengthLimits::default(),
            NaiveDate::from_ymd_opt(2025, 5, 25).unwrap(),
            0,
        )
        .build(
            &Topic::ClubHistory {
                theme: HistoryTheme::OnThisDay,
            },
            None,
            false,
        )
    }

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(Client::new(), "test-key".to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_returns_first_candidate_text_raw() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-flash-latest:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "maxOutputTokens": 150 },
                "contents": [{ "role": "user" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    { "content": { "parts": [{ "text": "  \"On this day in 2005...\"  " }] } },
                    { "content": { "parts": [{ "text": "second" }] } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server).generate(&prompt()).await.unwrap();
        assert_eq!(text, "  \"On this day in 2005...\"  ");
    }

    #[tokio::test]
    async fn test_zero_candidates_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&prompt()).await.unwrap_err();
        assert_eq!(err.provider, "gemini");
        assert_eq!(err.kind, ProviderErrorKind::NoCandidates);
    }

    #[tokio::test]
    async fn test_candidate_without_parts_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&prompt()).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::NoCandidates);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&prompt()).await.unwrap_err();
        assert_eq!(
            err.kind,
            ProviderErrorKind::Status {
                status: 429,
                body: "quota exhausted".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(500))
                    .set_body_json(json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap();
        let provider = GeminiProvider::new(client, "k".to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri());

        let err = provider.generate(&prompt()).await.unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::Transport(_)));
    }
}
