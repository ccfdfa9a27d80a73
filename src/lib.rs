pub mod cli;
pub mod color;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod generator;
pub mod guardrails;
pub mod log;
pub mod prompt;
pub mod provider;
pub mod schema;
pub mod store;
pub mod ux;
pub mod wire;

pub use config::Config;
pub use errors::{DesignError, Result};
pub use generator::{DesignGenerator, Generation, Stage};
pub use guardrails::{ContrastRepair, Correction, GuardRails};
pub use schema::{RecipeVerdict, Rejection};
pub use store::{JsonFileStore, MemoryStore, WeddingStore};
pub use wire::{DesignRecipe, RecipeSource, Wedding};
