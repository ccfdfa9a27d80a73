use crate::wire::{
    Accent, AccentPreset, DesignRecipe, Fonts, Hero, HeroStyle, Palette, Section,
};

/// One keyword group and the look it maps to.
struct ThemeLook {
    keywords: &'static [&'static str],
    bg: &'static str,
    primary: &'static str,
    accent: &'static str,
    heading: &'static str,
    body: &'static str,
    preset: AccentPreset,
}

/// Checked in order; the first group with a matching keyword wins.
const LOOKS: &[ThemeLook] = &[
    ThemeLook {
        keywords: &["modern", "minimalist"],
        bg: "#ffffff",
        primary: "#2d3748",
        accent: "#4299e1",
        heading: "Montserrat",
        body: "Inter",
        preset: AccentPreset::Geometric,
    },
    ThemeLook {
        keywords: &["romantic", "garden", "floral"],
        bg: "#fff8f3",
        primary: "#8c3b4a",
        accent: "#e8a0a8",
        heading: "Playfair Display",
        body: "Lora",
        preset: AccentPreset::Florals,
    },
    ThemeLook {
        keywords: &["elegant", "classic"],
        bg: "#faf7f2",
        primary: "#2b2b2b",
        accent: "#b08d57",
        heading: "Cormorant Garamond",
        body: "Raleway",
        preset: AccentPreset::Starfield,
    },
    ThemeLook {
        keywords: &["celestial", "starry", "night"],
        bg: "#0b1026",
        primary: "#f4efe1",
        accent: "#c9a227",
        heading: "Cinzel",
        body: "Lato",
        preset: AccentPreset::Starfield,
    },
    ThemeLook {
        keywords: &["rustic", "boho", "barn"],
        bg: "#f6f1e7",
        primary: "#4a3b2a",
        accent: "#8a9a5b",
        heading: "Josefin Sans",
        body: "Merriweather",
        preset: AccentPreset::Florals,
    },
];

static DEFAULT_LOOK: ThemeLook = ThemeLook {
    keywords: &[],
    bg: "#ffffff",
    primary: "#1f2937",
    accent: "#b7791f",
    heading: "Playfair Display",
    body: "Source Sans Pro",
    preset: AccentPreset::None,
};

fn look_for(theme: &str) -> &'static ThemeLook {
    let theme = theme.to_lowercase();
    LOOKS
        .iter()
        .find(|look| look.keywords.iter().any(|k| theme.contains(k)))
        .unwrap_or(&DEFAULT_LOOK)
}

/// Build a complete recipe from the theme text and photo count alone.
///
/// Pure and total: every input, including an empty theme, maps to exactly one
/// recipe. The layout is always the full canonical order; guard-rails trim it
/// afterwards.
pub fn synthesize(theme: &str, photo_count: usize) -> DesignRecipe {
    let look = look_for(theme);
    let style = if photo_count > 0 {
        HeroStyle::PhotoOverlay
    } else {
        HeroStyle::Solid
    };

    DesignRecipe {
        palette: Palette {
            bg: look.bg.to_string(),
            primary: look.primary.to_string(),
            accent: look.accent.to_string(),
        },
        fonts: Fonts {
            heading: look.heading.to_string(),
            body: look.body.to_string(),
        },
        hero: Hero { style },
        accent: Accent { preset: look.preset },
        layout: Section::CANONICAL.to_vec(),
    }
}
