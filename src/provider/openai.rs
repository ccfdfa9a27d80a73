use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{first_choice_content, transport_error};
use crate::errors::{DesignError, Result};

pub const DEFAULT_BASE: &str = "https://api.openai.com/v1";

/// OpenAI chat-completions provider. Asks for a JSON object response so the
/// schema check usually sees clean output.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(model: String, api_key: String, api_base: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DesignError::Config(format!("openai client: {e}")))?;
        Ok(Self { model, api_key, api_base, client })
    }
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": "You design wedding websites and answer only with JSON." },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.7,
            "response_format": { "type": "json_object" }
        });

        debug!(%url, model = %self.model, "openai: POST chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("openai", e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error("openai", e))?;
        debug!(%status, bytes = text.len(), "openai: response received");

        if !status.is_success() {
            return Err(DesignError::ProviderUnavailable(format!(
                "openai API error ({status}): {text}"
            )));
        }

        first_choice_content("openai", &text)
    }
}
