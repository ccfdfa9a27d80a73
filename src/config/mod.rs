use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::{Args, ProviderKind};
use crate::errors::{DesignError, Result};
use crate::guardrails::ContrastRepair;

/// Config layout this build understands.
pub const SCHEMA_VERSION: &str = "2026-10-01";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    pub store_path: String,
    pub provider: ProviderKind,
    /// Model name; defaults per provider.
    pub model: Option<String>,
    /// Overrides the provider's public endpoint (proxies, tests).
    pub api_base: Option<String>,
    /// Name of the environment variable holding the API key; defaults per
    /// provider.
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
    pub contrast_repair: ContrastRepair,
    pub artifacts_dir: String,
    pub save_artifacts: bool,
    /// Refuse a second concurrent regeneration for the same wedding.
    pub guard_concurrent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.into(),
            store_path: "weddings.json".into(),
            provider: ProviderKind::OpenAI,
            model: None,
            api_base: None,
            api_key_env: None,
            timeout_secs: 30,
            contrast_repair: ContrastRepair::SinglePass,
            artifacts_dir: ".wedding-design/runs".into(),
            save_artifacts: false,
            guard_concurrent: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| DesignError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml(&text)
            .map_err(|e| DesignError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Layer explicit CLI flags over file/default values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(s) = &args.store {
            self.store_path = s.clone();
        }
        if let Some(p) = args.provider {
            self.provider = p;
        }
        if let Some(m) = &args.model {
            self.model = Some(m.clone());
        }
        if let Some(b) = &args.api_base {
            self.api_base = Some(b.clone());
        }
        if let Some(t) = args.timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(c) = args.contrast_repair {
            self.contrast_repair = c;
        }
        if let Some(d) = &args.artifacts_dir {
            self.artifacts_dir = d.clone();
        }
        if args.save_artifacts {
            self.save_artifacts = true;
        }
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| default_model(self.provider))
    }

    pub fn key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| default_key_env(self.provider))
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(DesignError::Config(format!(
                "unsupported schema_version {:?} (expected {SCHEMA_VERSION:?})",
                self.schema_version
            )));
        }
        if self.model().trim().is_empty() {
            return Err(DesignError::Config("model must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(DesignError::Config("timeout_secs must be at least 1".into()));
        }
        if self.store_path.trim().is_empty() {
            return Err(DesignError::Config("store_path must not be empty".into()));
        }
        Ok(())
    }
}

pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAI => "gpt-4o-mini",
        ProviderKind::Perplexity => "sonar",
    }
}

pub fn default_key_env(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAI => "OPENAI_API_KEY",
        ProviderKind::Perplexity => "PERPLEXITY_API_KEY",
    }
}
