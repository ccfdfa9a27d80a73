use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wedding_design::fallback::synthesize;
use wedding_design::guardrails::enforce;
use wedding_design::provider::Provider;
use wedding_design::wire::{AccentPreset, HeroStyle, Section};
use wedding_design::{
    DesignError, DesignGenerator, DesignRecipe, MemoryStore, RecipeSource, Stage, Wedding,
    WeddingStore,
};

enum Reply {
    Text(String),
    Fail,
    Slow(Duration, String),
}

struct StubProvider {
    reply: Reply,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    fn boxed(reply: Reply) -> (Box<dyn Provider + Send + Sync>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Box::new(Self { reply, calls: calls.clone() }), calls)
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn complete(&self, _prompt: &str) -> wedding_design::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Text(t) => Ok(t.clone()),
            Reply::Fail => Err(DesignError::ProviderUnavailable("connection refused".into())),
            Reply::Slow(d, t) => {
                tokio::time::sleep(*d).await;
                Ok(t.clone())
            }
        }
    }
}

fn wedding(id: &str, theme: &str, photos: usize) -> Wedding {
    Wedding {
        id: id.into(),
        theme: theme.into(),
        photos: (0..photos).map(|i| format!("https://cdn.example/{id}/{i}.jpg")).collect(),
        partner1_name: "Sam".into(),
        partner2_name: "Alex".into(),
        wedding_date: None,
        city: "Lisbon".into(),
        guest_count: 90,
        design: None,
    }
}

fn ai_recipe(primary: &str, bg: &str, style: &str, layout: &[&str]) -> String {
    json!({
        "palette": { "bg": bg, "primary": primary, "accent": "#c05621" },
        "fonts": { "heading": "Cinzel", "body": "Lato" },
        "hero": { "style": style },
        "accent": { "preset": "starfield" },
        "layout": layout
    })
    .to_string()
}

#[tokio::test]
async fn offline_modern_minimalist_without_photos() {
    let store = MemoryStore::with_weddings([wedding("w1", "Modern minimalist", 0)]);
    let generator = DesignGenerator::new(store);

    let g = generator.regenerate("w1").await.unwrap();

    assert_eq!(g.source, RecipeSource::Fallback);
    assert_eq!(g.recipe.palette.bg, "#ffffff");
    assert_eq!(g.recipe.palette.primary, "#2d3748");
    assert_eq!(g.recipe.palette.accent, "#4299e1");
    assert_eq!(g.recipe.hero.style, HeroStyle::Solid);
    assert_eq!(g.recipe.accent.preset, AccentPreset::Geometric);
    assert!(!g.recipe.layout.contains(&Section::Gallery));
    assert_eq!(
        g.stages,
        vec![Stage::NoRecipe, Stage::Fallback, Stage::GuardRailed, Stage::Persisted]
    );
    assert_eq!(generator.store().get("w1").unwrap().design, Some(g.recipe));
}

#[tokio::test]
async fn offline_romantic_garden_with_photos_keeps_gallery() {
    let store = MemoryStore::with_weddings([wedding("w2", "Romantic garden", 3)]);
    let g = DesignGenerator::new(store).regenerate("w2").await.unwrap();

    assert_eq!(g.recipe.hero.style, HeroStyle::PhotoOverlay);
    assert_eq!(g.recipe.accent.preset, AccentPreset::Florals);
    assert!(g.recipe.layout.contains(&Section::Gallery));
    assert!(g.corrections.is_empty());
}

#[tokio::test]
async fn valid_ai_recipe_is_used_and_light_primary_darkened_once() {
    let (provider, calls) = StubProvider::boxed(Reply::Text(ai_recipe(
        "#dddddd",
        "#ffffff",
        "split",
        &["hero", "story", "details"],
    )));
    let store = MemoryStore::with_weddings([wedding("w3", "Celestial", 2)]);
    let g = DesignGenerator::new(store)
        .with_provider(provider)
        .regenerate("w3")
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(g.source, RecipeSource::Ai);
    assert_eq!(g.recipe.palette.primary, "#bcbcbc");
    assert_eq!(g.recipe.hero.style, HeroStyle::Split);
    assert_eq!(
        g.stages,
        vec![
            Stage::NoRecipe,
            Stage::Requesting,
            Stage::Validated,
            Stage::GuardRailed,
            Stage::Persisted
        ]
    );
}

#[tokio::test]
async fn invalid_json_falls_back_to_keyword_recipe() {
    let (provider, _) = StubProvider::boxed(Reply::Text("Sure! Here's a lovely design: pastel".into()));
    let store = MemoryStore::with_weddings([wedding("w4", "Elegant classic", 2)]);
    let g = DesignGenerator::new(store)
        .with_provider(provider)
        .regenerate("w4")
        .await
        .unwrap();

    assert_eq!(g.source, RecipeSource::Fallback);
    assert_eq!(g.recipe, enforce(synthesize("Elegant classic", 2), 2));
    assert!(g.rejection.as_deref().unwrap().contains("malformed recipe"));
    assert!(g.stages.contains(&Stage::Rejected));
}

#[tokio::test]
async fn schema_violation_falls_back() {
    let (provider, _) = StubProvider::boxed(Reply::Text(ai_recipe(
        "#2d3748",
        "#ffffff",
        "carousel",
        &["hero", "details"],
    )));
    let store = MemoryStore::with_weddings([wedding("w5", "", 0)]);
    let g = DesignGenerator::new(store)
        .with_provider(provider)
        .regenerate("w5")
        .await
        .unwrap();

    assert_eq!(g.source, RecipeSource::Fallback);
    assert_eq!(g.recipe, enforce(synthesize("", 0), 0));
}

#[tokio::test]
async fn photos_present_leave_solid_hero_and_gallery_alone() {
    let (provider, _) = StubProvider::boxed(Reply::Text(ai_recipe(
        "#2d3748",
        "#ffffff",
        "solid",
        &["hero", "gallery", "details", "rsvp"],
    )));
    let store = MemoryStore::with_weddings([wedding("w6", "Boho", 6)]);
    let g = DesignGenerator::new(store)
        .with_provider(provider)
        .regenerate("w6")
        .await
        .unwrap();

    assert_eq!(g.source, RecipeSource::Ai);
    assert_eq!(g.recipe.hero.style, HeroStyle::Solid);
    assert_eq!(
        g.recipe.layout,
        vec![Section::Hero, Section::Gallery, Section::Details, Section::Rsvp]
    );
    assert!(g.corrections.is_empty());
}

#[tokio::test]
async fn ai_recipe_without_photos_is_corrected() {
    let (provider, _) = StubProvider::boxed(Reply::Text(ai_recipe(
        "#2d3748",
        "#ffffff",
        "photo-overlay",
        &["story", "gallery", "rsvp"],
    )));
    let store = MemoryStore::with_weddings([wedding("w7", "Modern", 0)]);
    let g = DesignGenerator::new(store)
        .with_provider(provider)
        .regenerate("w7")
        .await
        .unwrap();

    assert_eq!(g.recipe.hero.style, HeroStyle::Solid);
    assert_eq!(
        g.recipe.layout,
        vec![Section::Hero, Section::Story, Section::Rsvp, Section::Details]
    );
}

#[tokio::test]
async fn provider_failure_is_absorbed() {
    let (provider, calls) = StubProvider::boxed(Reply::Fail);
    let store = MemoryStore::with_weddings([wedding("w8", "Rustic barn", 1)]);
    let g = DesignGenerator::new(store)
        .with_provider(provider)
        .regenerate("w8")
        .await
        .unwrap();

    // One attempt, no retries.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(g.source, RecipeSource::Fallback);
    assert!(g.rejection.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn slow_provider_times_out_into_fallback() {
    let (provider, _) = StubProvider::boxed(Reply::Slow(
        Duration::from_secs(5),
        ai_recipe("#000000", "#ffffff", "split", &["hero", "details"]),
    ));
    let store = MemoryStore::with_weddings([wedding("w9", "Romantic", 1)]);
    let g = DesignGenerator::new(store)
        .with_provider(provider)
        .with_timeout(Duration::from_millis(50))
        .regenerate("w9")
        .await
        .unwrap();

    assert_eq!(g.source, RecipeSource::Fallback);
    assert!(g.rejection.unwrap().contains("no reply within"));
}

#[tokio::test]
async fn unknown_wedding_is_input_missing() {
    let generator = DesignGenerator::new(MemoryStore::new());
    let err = generator.regenerate("nope").await.unwrap_err();
    assert!(matches!(err, DesignError::InputMissing(id) if id == "nope"));
}

#[tokio::test]
async fn preview_does_not_write() {
    let store = MemoryStore::with_weddings([wedding("w10", "Garden", 2)]);
    let generator = DesignGenerator::new(store);
    let g = generator.preview("w10").await.unwrap();
    assert!(!g.persisted());
    assert!(generator.store().get("w10").unwrap().design.is_none());
}

#[tokio::test]
async fn regeneration_replaces_previous_design() {
    let mut w = wedding("w11", "Modern", 0);
    w.design = Some(synthesize("Romantic", 4));
    let generator = DesignGenerator::new(MemoryStore::with_weddings([w]));
    let g = generator.regenerate("w11").await.unwrap();
    assert_eq!(generator.store().get("w11").unwrap().design, Some(g.recipe));
}

/// Fails the first `failures` writes, then delegates.
struct FlakyStore {
    inner: MemoryStore,
    failures: AtomicUsize,
}

#[async_trait]
impl WeddingStore for FlakyStore {
    async fn fetch(&self, wedding_id: &str) -> wedding_design::Result<Wedding> {
        self.inner.fetch(wedding_id).await
    }

    async fn write_design(&self, wedding_id: &str, recipe: &DesignRecipe) -> wedding_design::Result<()> {
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(DesignError::Store("disk full".into()));
        }
        self.inner.write_design(wedding_id, recipe).await
    }
}

#[tokio::test]
async fn failed_write_returns_recipe_for_retry_without_new_request() {
    let (provider, calls) = StubProvider::boxed(Reply::Text(ai_recipe(
        "#1a202c",
        "#ffffff",
        "split",
        &["hero", "details"],
    )));
    let store = FlakyStore {
        inner: MemoryStore::with_weddings([wedding("w12", "Classic", 1)]),
        failures: AtomicUsize::new(1),
    };
    let generator = DesignGenerator::new(store).with_provider(provider);

    let err = generator.regenerate("w12").await.unwrap_err();
    assert!(!err.is_absorbed());
    let recipe = err.unsaved_recipe().cloned().expect("recipe carried by error");
    assert_eq!(recipe.palette.primary, "#1a202c");

    generator.persist("w12", &recipe).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(generator.store().inner.get("w12").unwrap().design, Some(recipe));
}

#[tokio::test]
async fn concurrent_regeneration_of_same_wedding_is_refused() {
    let (provider, _) = StubProvider::boxed(Reply::Slow(
        Duration::from_millis(200),
        ai_recipe("#1a202c", "#ffffff", "split", &["hero", "details"]),
    ));
    let store = MemoryStore::with_weddings([wedding("w13", "Modern", 1), wedding("w14", "Modern", 1)]);
    let generator = DesignGenerator::new(store).with_provider(provider);

    let (first, second, other) = tokio::join!(
        generator.regenerate("w13"),
        generator.regenerate("w13"),
        generator.regenerate("w14"),
    );
    assert!(first.is_ok());
    assert!(matches!(second, Err(DesignError::GenerationInProgress(id)) if id == "w13"));
    assert!(other.is_ok());

    // Released once finished.
    assert!(generator.regenerate("w13").await.is_ok());
}

#[tokio::test]
async fn without_guard_overlapping_regenerations_both_complete() {
    let (provider, calls) = StubProvider::boxed(Reply::Slow(
        Duration::from_millis(50),
        ai_recipe("#1a202c", "#ffffff", "split", &["hero", "details"]),
    ));
    let store = MemoryStore::with_weddings([wedding("w15", "Modern", 1)]);
    let generator = DesignGenerator::new(store)
        .with_provider(provider)
        .with_in_flight(None);

    let (a, b) = tokio::join!(generator.regenerate("w15"), generator.regenerate("w15"));
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
