//! Gemini API client implementation.

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::error::AiError;

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API request content part.
#[derive(Serialize)]
struct Part {
    text: String,
}

/// Gemini API request content.
#[derive(Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

/// Gemini API request body.
#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

/// Gemini API response content part.
#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini API response content.
#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

/// Gemini API response candidate.
#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

/// Gemini API response body.
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Client for the Gemini text-generation API.
///
/// The core treats the service as opaque: one prompt string in, one block of
/// analysis text back, and any failure is fatal to report generation.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client with the key from `GEMINI_API_KEY` (with settings
    /// fallback) and the given model, defaulting to [`DEFAULT_MODEL`].
    pub fn new(model: Option<String>) -> Result<Self> {
        let api_key = crate::utils::get_env_var("GEMINI_API_KEY")
            .map_err(|_| AiError::ApiKeyNotFound)?;

        Ok(Self::with_base_url(
            api_key,
            model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            DEFAULT_BASE_URL.to_string(),
        ))
    }

    /// Creates a client against an explicit endpoint. Used by tests to point
    /// at a mock server.
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    /// The model this client sends requests to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one blocking generation request and returns the response text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        info!(model = %self.model, "Sending generation request to Gemini API");
        debug!(prompt_bytes = prompt.len(), "Prompt assembled");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiError::RequestFailed(format!("HTTP {status}: {error_text}")).into());
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponseFormat(e.to_string()))?;

        // The analysis text is the concatenation of all text parts of the
        // first candidate.
        let text: String = body
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(
                AiError::InvalidResponseFormat("no text content in response".to_string()).into(),
            );
        }

        Ok(text)
    }
}
