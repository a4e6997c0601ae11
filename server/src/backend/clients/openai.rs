//! OpenAI chat completions client used for AI-written notes.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{TextGenerationError, TextGenerator};
use crate::backend::config::OpenAiSettings;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano-2025-04-14";

pub struct OpenAiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(settings: &OpenAiSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Both classic and project-scoped keys start with "sk-"
    fn checked_key(&self) -> Result<&str, TextGenerationError> {
        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => Err(TextGenerationError::NotConfigured),
            Some(key) if !key.starts_with("sk-") => Err(TextGenerationError::InvalidKeyFormat),
            Some(key) => Ok(key),
        }
    }
}

pub(crate) fn build_request_body(model: &str, system: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": prompt },
        ],
    })
}

pub(crate) fn parse_completion(body: &Value) -> Result<String, TextGenerationError> {
    let text = body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or_default();

    if text.is_empty() {
        return Err(TextGenerationError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Map a non-success response to an error, preferring the API's own message
pub(crate) fn parse_error(status: u16, body: &str) -> TextGenerationError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("request failed with status {}", status));

    TextGenerationError::Api { status, message }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, TextGenerationError> {
        let key = self.checked_key()?;
        debug!("Requesting completion from model {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(key)
            .json(&build_request_body(&self.model, system, prompt))
            .send()
            .await
            .map_err(|e| TextGenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = parse_error(status.as_u16(), &body);
            error!("OpenAI API error: {}", err);
            return Err(err);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TextGenerationError::Transport(e.to_string()))?;
        parse_completion(&body)
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}
