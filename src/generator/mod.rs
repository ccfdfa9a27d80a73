//! Drives one wedding from "no recipe" to a persisted, guard-railed design.
//!
//! The provider is optional and every provider or parse failure ends in the
//! keyword fallback, so a recipe is always produced. Only store failures
//! reach the caller.

use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{DesignError, Result};
use crate::fallback;
use crate::guardrails::{Correction, GuardRails};
use crate::log::ArtifactSink;
use crate::prompt::recipe_prompt;
use crate::provider::DynProvider;
use crate::schema::{self, RecipeVerdict};
use crate::store::WeddingStore;
use crate::wire::{DesignRecipe, RecipeSource, Wedding};

pub mod inflight;

pub use inflight::{InFlight, InFlightToken};

/// Steps a generation passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    NoRecipe,
    Requesting,
    Validated,
    Rejected,
    Fallback,
    GuardRailed,
    Persisted,
}

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub id: Uuid,
    pub wedding_id: String,
    pub recipe: DesignRecipe,
    pub source: RecipeSource,
    /// Why the provider's answer was not used, when it wasn't.
    pub rejection: Option<String>,
    pub corrections: Vec<Correction>,
    pub stages: Vec<Stage>,
}

impl Generation {
    pub fn persisted(&self) -> bool {
        self.stages.last() == Some(&Stage::Persisted)
    }
}

/// What `draft` produced plus the exchange that led to it.
struct Draft {
    generation: Generation,
    prompt: Option<String>,
    raw: Option<String>,
}

pub struct DesignGenerator<S: WeddingStore> {
    store: S,
    provider: Option<DynProvider>,
    guard_rails: GuardRails,
    timeout: Duration,
    in_flight: Option<InFlight>,
    artifacts: Option<ArtifactSink>,
}

impl<S: WeddingStore> DesignGenerator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            provider: None,
            guard_rails: GuardRails::default(),
            timeout: Duration::from_secs(30),
            in_flight: Some(InFlight::new()),
            artifacts: None,
        }
    }

    pub fn with_provider(mut self, provider: DynProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_guard_rails(mut self, guard_rails: GuardRails) -> Self {
        self.guard_rails = guard_rails;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share an in-flight set with other generators, or pass `None` to allow
    /// overlapping regenerations (last write wins).
    pub fn with_in_flight(mut self, in_flight: Option<InFlight>) -> Self {
        self.in_flight = in_flight;
        self
    }

    pub fn with_artifacts(mut self, sink: ArtifactSink) -> Self {
        self.artifacts = Some(sink);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch, design and persist. A failed write returns `Persistence` with
    /// the computed recipe attached.
    pub async fn regenerate(&self, wedding_id: &str) -> Result<Generation> {
        let _token = self.claim(wedding_id)?;
        let wedding = self.store.fetch(wedding_id).await?;
        let mut generation = self.run(&wedding).await;
        self.persist(wedding_id, &generation.recipe).await?;
        generation.stages.push(Stage::Persisted);
        info!(wedding_id, run = %generation.id, "design persisted");
        Ok(generation)
    }

    /// Fetch and design without writing anything back.
    pub async fn preview(&self, wedding_id: &str) -> Result<Generation> {
        let _token = self.claim(wedding_id)?;
        let wedding = self.store.fetch(wedding_id).await?;
        Ok(self.run(&wedding).await)
    }

    /// Write an already computed recipe; used to retry after `Persistence`.
    pub async fn persist(&self, wedding_id: &str, recipe: &DesignRecipe) -> Result<()> {
        self.store
            .write_design(wedding_id, recipe)
            .await
            .map_err(|e| match e {
                DesignError::InputMissing(_) => e,
                other => DesignError::Persistence {
                    wedding_id: wedding_id.to_string(),
                    recipe: Box::new(recipe.clone()),
                    message: other.to_string(),
                },
            })
    }

    /// Design for a wedding already in hand. Never fails.
    pub async fn design_for(&self, wedding: &Wedding) -> Generation {
        self.run(wedding).await
    }

    fn claim(&self, wedding_id: &str) -> Result<Option<InFlightToken>> {
        match &self.in_flight {
            None => Ok(None),
            Some(f) => f
                .try_acquire(wedding_id)
                .map(Some)
                .ok_or_else(|| DesignError::GenerationInProgress(wedding_id.to_string())),
        }
    }

    async fn run(&self, wedding: &Wedding) -> Generation {
        let draft = self.draft(wedding).await;
        if let Some(sink) = &self.artifacts {
            match sink.save(&draft.generation, draft.prompt.as_deref(), draft.raw.as_deref()) {
                Ok(dir) => info!(dir = %dir.display(), "artifacts saved"),
                Err(e) => warn!(error = %e, "could not save artifacts"),
            }
        }
        draft.generation
    }

    async fn draft(&self, wedding: &Wedding) -> Draft {
        let id = Uuid::new_v4();
        let photo_count = wedding.photo_count();
        let mut stages = vec![Stage::NoRecipe];
        let mut prompt = None;
        let mut raw = None;

        let candidate = match &self.provider {
            None => Err(DesignError::ProviderUnavailable("no provider configured".into())),
            Some(provider) => {
                stages.push(Stage::Requesting);
                let text = recipe_prompt(wedding);
                info!(wedding_id = %wedding.id, provider = provider.name(), "requesting design recipe");
                let reply = tokio::time::timeout(self.timeout, provider.complete(&text)).await;
                prompt = Some(text);
                match reply {
                    Err(_) => Err(DesignError::ProviderUnavailable(format!(
                        "{}: no reply within {:?}",
                        provider.name(),
                        self.timeout
                    ))),
                    Ok(Err(e)) => Err(e),
                    Ok(Ok(body)) => {
                        let verdict = schema::validate(&body);
                        raw = Some(body);
                        match verdict {
                            RecipeVerdict::Valid(r) => Ok(r),
                            RecipeVerdict::Rejected(why) => {
                                Err(DesignError::MalformedRecipe(why.to_string()))
                            }
                        }
                    }
                }
            }
        };

        let (recipe, source, rejection) = match candidate {
            Ok(recipe) => {
                stages.push(Stage::Validated);
                (recipe, RecipeSource::Ai, None)
            }
            Err(e) => {
                if stages.contains(&Stage::Requesting) {
                    stages.push(Stage::Rejected);
                }
                stages.push(Stage::Fallback);
                info!(wedding_id = %wedding.id, reason = %e, "using fallback design");
                (fallback::synthesize(&wedding.theme, photo_count), RecipeSource::Fallback, Some(e.to_string()))
            }
        };

        let (recipe, corrections) = self.guard_rails.apply(recipe, photo_count);
        stages.push(Stage::GuardRailed);
        if !corrections.is_empty() {
            info!(wedding_id = %wedding.id, count = corrections.len(), "guard-rails corrected recipe");
        }

        Draft {
            generation: Generation {
                id,
                wedding_id: wedding.id.clone(),
                recipe,
                source,
                rejection,
                corrections,
                stages,
            },
            prompt,
            raw,
        }
    }
}
