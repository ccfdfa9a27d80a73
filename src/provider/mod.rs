use async_trait::async_trait;
use serde::Deserialize;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::{DesignError, Result};

pub mod openai;
pub mod perplexity;

/// A generative text backend: prompt in, free text out.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

/// Build the configured provider. The API key is read from the environment
/// here, once, and handed to the client.
pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    let key_env = cfg.key_env();
    let api_key = std::env::var(key_env)
        .map_err(|_| DesignError::Config(format!("{key_env} env var is not set")))?;
    let base = cfg.api_base.clone();

    match cfg.provider {
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(
            cfg.model().to_string(),
            api_key,
            base.unwrap_or_else(|| openai::DEFAULT_BASE.to_string()),
            cfg.timeout_secs,
        )?)),
        ProviderKind::Perplexity => Ok(Box::new(perplexity::Perplexity::new(
            cfg.model().to_string(),
            api_key,
            base.unwrap_or_else(|| perplexity::DEFAULT_BASE.to_string()),
            cfg.timeout_secs,
        )?)),
    }
}

/// Chat-completions response shape shared by OpenAI-compatible APIs.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's text out of a chat-completions body.
fn first_choice_content(provider: &str, body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        DesignError::ProviderUnavailable(format!("{provider}: unexpected response body: {e}"))
    })?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}

fn transport_error(provider: &str, e: reqwest::Error) -> DesignError {
    if e.is_timeout() {
        DesignError::ProviderUnavailable(format!("{provider}: request timed out"))
    } else {
        DesignError::ProviderUnavailable(format!("{provider}: {e}"))
    }
}
