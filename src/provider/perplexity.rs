use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::{first_choice_content, transport_error, Provider};
use crate::errors::{DesignError, Result};

pub const DEFAULT_BASE: &str = "https://api.perplexity.ai";

pub struct Perplexity {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

impl Perplexity {
    pub fn new(model: String, api_key: String, api_base: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DesignError::Config(format!("perplexity client: {e}")))?;
        Ok(Self { model, api_key, api_base, client })
    }
}

#[async_trait]
impl Provider for Perplexity {
    fn name(&self) -> &'static str {
        "perplexity"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Msg { role: "system", content: "Be precise. Reply with a single JSON object only." },
                Msg { role: "user", content: prompt },
            ],
            temperature: 0.2,
        };

        debug!(%url, model = %self.model, "perplexity: POST chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("perplexity", e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error("perplexity", e))?;
        debug!(%status, bytes = text.len(), "perplexity: response received");

        if !status.is_success() {
            return Err(DesignError::ProviderUnavailable(format!(
                "perplexity API error ({status}): {text}"
            )));
        }

        // Perplexity has no JSON mode; the schema check extracts the object.
        first_choice_content("perplexity", &text)
    }
}
