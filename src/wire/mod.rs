use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// ========================================
/// Design recipe and wedding record shapes
/// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub bg: String,
    pub primary: String,
    pub accent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fonts {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeroStyle {
    PhotoOverlay,
    Split,
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub style: HeroStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentPreset {
    Starfield,
    None,
    Florals,
    Geometric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accent {
    pub preset: AccentPreset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    Story,
    Gallery,
    Details,
    Rsvp,
}

impl Section {
    /// Canonical page order used by synthesized recipes.
    pub const CANONICAL: [Section; 5] = [
        Section::Hero,
        Section::Story,
        Section::Gallery,
        Section::Details,
        Section::Rsvp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::Story => "story",
            Section::Gallery => "gallery",
            Section::Details => "details",
            Section::Rsvp => "rsvp",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for HeroStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeroStyle::PhotoOverlay => "photo-overlay",
            HeroStyle::Split => "split",
            HeroStyle::Solid => "solid",
        })
    }
}

impl fmt::Display for AccentPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccentPreset::Starfield => "starfield",
            AccentPreset::None => "none",
            AccentPreset::Florals => "florals",
            AccentPreset::Geometric => "geometric",
        })
    }
}

/// The structured palette/font/layout description the site renderer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignRecipe {
    pub palette: Palette,
    pub fonts: Fonts,
    pub hero: Hero,
    pub accent: Accent,
    pub layout: Vec<Section>,
}

/// A wedding as the data store hands it to us.
///
/// Decoding is forgiving: `null` reads as empty, and a stored `design` or
/// date that no longer parses reads as absent. Regeneration replaces the
/// design wholesale, so a stale one must not block it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wedding {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub partner1_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub partner2_name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub wedding_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub guest_count: u32,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignRecipe>,
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(de)?;
    Ok(serde_json::from_value(raw).ok())
}

impl Wedding {
    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    pub fn has_photos(&self) -> bool {
        !self.photos.is_empty()
    }
}

/// Where the recipe that reached the guard-rails came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    Ai,
    Fallback,
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecipeSource::Ai => "ai",
            RecipeSource::Fallback => "fallback",
        })
    }
}
