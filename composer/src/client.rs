//! Client for the generative-language API.

use crate::error::ComposerError;
use serde_json::{Value as JsonValue, json};
use std::time::Duration;

/// Generation is a single long-poll request; no streaming.
const GENERATE_TIMEOUT: Duration = Duration::from_secs(90);

/// Client for the generative-language API's `generateContent` endpoint.
#[derive(Clone)]
pub struct ComposerClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl ComposerClient {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        ComposerClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Send a prompt and return the first candidate's text.
    ///
    /// # Errors
    /// Returns `ComposerError::Reqwest` on transport failure or a non-2xx
    /// status, and `ComposerError::NoContent` when the response carries no
    /// usable candidate text.
    pub async fn generate(&self, prompt: &str) -> Result<String, ComposerError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let payload = json!({"contents": [{"parts": [{"text": prompt}]}]});

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&payload)
            .timeout(GENERATE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: JsonValue = response.json().await?;

        let text = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(JsonValue::as_str)
            .unwrap_or("");

        if text.is_empty() {
            tracing::warn!("generative-language response carried no candidate text");
            return Err(ComposerError::NoContent);
        }

        Ok(text.to_string())
    }
}
