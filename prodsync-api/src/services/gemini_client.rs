//! Gemini generative text client
//!
//! Single-operation client for the Google generative-language REST API.
//! Callers treat it as best-effort: every use in the pipeline has a
//! deterministic fallback.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::types::{GenerateError, TextGenerator};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const USER_AGENT: &str = "prodsync/0.1.0 (product field resolution)";

/// Pull the answer text out of a generateContent response:
/// `candidates[0].content.parts[0].text`
fn extract_text(body: &Value) -> Option<&str> {
    body.get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, GenerateError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        tracing::debug!(model = %self.model, "Querying Gemini API");

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GenerateError::Parse(e.to_string()))?;

        let text = extract_text(&body).ok_or(GenerateError::Empty)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerateError::Empty);
        }

        Ok(text.to_string())
    }
}
