use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::guardrails::ContrastRepair;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    #[value(alias = "pplx")]
    Perplexity,
}

#[derive(Parser, Debug, Default)]
#[command(name = "wedding-design", version, about = "Generate and store the design recipe for a wedding website")]
pub struct Args {
    /// Wedding identifier to (re)generate a design for
    #[arg(long)]
    pub wedding: String,

    /// TOML config file; flags below override it
    #[arg(long)]
    pub config: Option<String>,

    /// JSON wedding store file
    #[arg(long)]
    pub store: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub api_base: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, value_enum)]
    pub contrast_repair: Option<ContrastRepair>,

    /// Skip the provider and use the keyword fallback
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Compute and print the recipe without writing it back
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[arg(long)]
    pub artifacts_dir: Option<String>,

    #[arg(long, default_value_t = false)]
    pub save_artifacts: bool,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[arg(long, default_value_t = false)]
    pub json_logs: bool,
}
