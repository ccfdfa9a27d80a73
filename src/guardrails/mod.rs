use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::color::{contrast_ratio, meets_contrast, Rgb, MIN_CONTRAST};
use crate::wire::{DesignRecipe, HeroStyle, Section};

/// How hard contrast repair tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ContrastRepair {
    /// Darken the primary color once, even if it still reads poorly.
    #[default]
    SinglePass,
    /// Keep darkening until the ratio holds or the color bottoms out.
    Converge,
}

/// A single change made by the guard-rails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum Correction {
    DarkenedPrimary { from: String, to: String },
    ForcedSolidHero,
    RemovedGallery,
    DroppedDuplicateSection { section: Section },
    InsertedHero,
    MovedHeroToTop,
    AppendedDetails,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::DarkenedPrimary { from, to } => write!(f, "darkened primary {from} -> {to}"),
            Correction::ForcedSolidHero => f.write_str("hero forced to solid (no photos)"),
            Correction::RemovedGallery => f.write_str("gallery removed (no photos)"),
            Correction::DroppedDuplicateSection { section } => {
                write!(f, "dropped duplicate {section} section")
            }
            Correction::InsertedHero => f.write_str("inserted hero at top"),
            Correction::MovedHeroToTop => f.write_str("moved hero to top"),
            Correction::AppendedDetails => f.write_str("appended details section"),
        }
    }
}

/// Deterministic post-processing that repairs a candidate recipe instead of
/// rejecting it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardRails {
    pub contrast: ContrastRepair,
}

impl GuardRails {
    pub fn new(contrast: ContrastRepair) -> Self {
        Self { contrast }
    }

    /// Apply every rule in order: contrast, hero/photo consistency, gallery,
    /// then required sections. Later rules only touch fields earlier rules
    /// have already settled in a compatible way.
    pub fn apply(&self, mut recipe: DesignRecipe, photo_count: usize) -> (DesignRecipe, Vec<Correction>) {
        let mut fixes = Vec::new();
        let has_photos = photo_count > 0;

        self.repair_contrast(&mut recipe, &mut fixes);

        if !has_photos && recipe.hero.style == HeroStyle::PhotoOverlay {
            recipe.hero.style = HeroStyle::Solid;
            fixes.push(Correction::ForcedSolidHero);
        }

        if !has_photos && recipe.layout.contains(&Section::Gallery) {
            recipe.layout.retain(|s| *s != Section::Gallery);
            fixes.push(Correction::RemovedGallery);
        }

        enforce_sections(&mut recipe.layout, &mut fixes);

        for fix in &fixes {
            debug!(%fix, "guard-rail correction");
        }
        (recipe, fixes)
    }

    fn repair_contrast(&self, recipe: &mut DesignRecipe, fixes: &mut Vec<Correction>) {
        // Schema validation guarantees both parse; a hand-built recipe with a
        // bad color is left for the caller to notice.
        let (Some(primary), Some(bg)) = (
            Rgb::parse_hex(&recipe.palette.primary),
            Rgb::parse_hex(&recipe.palette.bg),
        ) else {
            warn!(
                primary = %recipe.palette.primary,
                bg = %recipe.palette.bg,
                "skipping contrast repair: palette color is not #rrggbb"
            );
            return;
        };

        if meets_contrast(primary, bg) {
            return;
        }

        let mut fixed = primary.darkened();
        if self.contrast == ContrastRepair::Converge {
            while !meets_contrast(fixed, bg) {
                let next = fixed.darkened();
                if next == fixed {
                    break;
                }
                fixed = next;
            }
        }

        let ratio = contrast_ratio(fixed, bg);
        if ratio < MIN_CONTRAST {
            warn!(
                primary = %fixed,
                bg = %bg,
                ratio,
                "primary still below contrast threshold after repair"
            );
        }

        fixes.push(Correction::DarkenedPrimary {
            from: recipe.palette.primary.clone(),
            to: fixed.to_hex(),
        });
        recipe.palette.primary = fixed.to_hex();
    }
}

/// Drop repeats, then make sure hero leads and details is present.
fn enforce_sections(layout: &mut Vec<Section>, fixes: &mut Vec<Correction>) {
    let mut seen = Vec::with_capacity(layout.len());
    layout.retain(|s| {
        if seen.contains(s) {
            fixes.push(Correction::DroppedDuplicateSection { section: *s });
            false
        } else {
            seen.push(*s);
            true
        }
    });

    match layout.iter().position(|s| *s == Section::Hero) {
        Some(0) => {}
        Some(i) => {
            layout.remove(i);
            layout.insert(0, Section::Hero);
            fixes.push(Correction::MovedHeroToTop);
        }
        None => {
            layout.insert(0, Section::Hero);
            fixes.push(Correction::InsertedHero);
        }
    }

    if !layout.contains(&Section::Details) {
        layout.push(Section::Details);
        fixes.push(Correction::AppendedDetails);
    }
}

/// Apply the default guard-rails and discard the correction log.
pub fn enforce(recipe: DesignRecipe, photo_count: usize) -> DesignRecipe {
    GuardRails::default().apply(recipe, photo_count).0
}
