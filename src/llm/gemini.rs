//! Gemini `generateContent` REST client.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::GenerateError;

use super::retry::{RetryPolicy, retry_with_backoff};
use super::{GenerationRequest, MAX_OUTPUT_TOKENS, TEMPERATURE, TOP_P, TextGenerator};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable to override the API base URL.
pub const API_BASE_ENV_VAR: &str = "AI_COMMIT_API_BASE";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    candidate_count: u8,
    max_output_tokens: u32,
}

/// Response body of `generateContent`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl Candidate {
    /// All text parts of this candidate, concatenated.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

impl GenerateContentResponse {
    /// Text of each candidate, in response order.
    pub fn candidate_texts(&self) -> Vec<String> {
        self.candidates.iter().filter_map(Candidate::text).collect()
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for one model with one API key.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_ms: Option<u64>,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, GenerateError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ai-commit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_ms: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Client for the configured model, honouring `timeout` and
    /// `AI_COMMIT_API_BASE`.
    pub fn from_config(config: &Config, api_key: &str) -> Result<Self, GenerateError> {
        let mut client = Self::new(api_key, config.model.clone())?;
        client.timeout_ms = config.timeout;
        if let Ok(base) = env::var(API_BASE_ENV_VAR)
            && !base.is_empty()
        {
            client.base_url = base;
        }
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn send_once(
        &self,
        body: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, GenerateError> {
        let mut request = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body);
        if let Some(ms) = self.timeout_ms {
            request = request.timeout(Duration::from_millis(ms));
        }

        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| text.trim().to_string());
            return Err(GenerateError::Api {
                status: status.as_u16(),
                message: format!("[{}] {}", status, detail),
            });
        }

        serde_json::from_str(&text).map_err(|e| GenerateError::InvalidResponse(e.to_string()))
    }

    fn map_transport(&self, err: reqwest::Error) -> GenerateError {
        if err.is_timeout() {
            GenerateError::Timeout(self.timeout_ms.unwrap_or_default())
        } else {
            GenerateError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerateError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part {
                        text: &request.instructions,
                    },
                    Part {
                        text: &request.diff,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                candidate_count: request.candidate_count,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!(
            "Requesting {} candidate(s) from {} ({} prompt chars, {} diff chars)",
            request.candidate_count,
            self.model,
            request.instructions.len(),
            request.diff.len()
        );

        let response = retry_with_backoff(
            self.retry,
            || self.send_once(&body),
            GenerateError::is_transient,
            |e| GenerateError::RetriesExhausted(Box::new(e)),
        )
        .await?;

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            debug!("Prompt blocked by model: {}", reason);
        }

        let texts = response.candidate_texts();
        debug!("Received {} candidate text(s)", texts.len());
        Ok(texts)
    }
}
