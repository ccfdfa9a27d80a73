use thiserror::Error;

use crate::wire::DesignRecipe;

#[derive(Error, Debug)]
pub enum DesignError {
    /// Network failure, timeout or non-2xx from the text generator.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("malformed recipe: {0}")]
    MalformedRecipe(String),
    /// The write failed after a recipe was computed. The recipe rides along so
    /// the caller can retry the write without asking the provider again.
    #[error("failed to persist design for wedding {wedding_id}: {message}")]
    Persistence {
        wedding_id: String,
        recipe: Box<DesignRecipe>,
        message: String,
    },
    #[error("wedding not found: {0}")]
    InputMissing(String),
    #[error("design generation already in progress for wedding {0}")]
    GenerationInProgress(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("config error: {0}")]
    Config(String),
}

impl DesignError {
    /// Provider and parse failures never reach the user; a fallback recipe
    /// always exists for them.
    pub fn is_absorbed(&self) -> bool {
        matches!(
            self,
            DesignError::ProviderUnavailable(_) | DesignError::MalformedRecipe(_)
        )
    }

    /// The recipe computed before a failed write, if any.
    pub fn unsaved_recipe(&self) -> Option<&DesignRecipe> {
        match self {
            DesignError::Persistence { recipe, .. } => Some(recipe.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DesignError>;
