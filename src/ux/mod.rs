use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::color::{contrast_ratio_hex, Rgb, MIN_CONTRAST};
use crate::generator::Generation;
use crate::log::artifact_paths;
use crate::wire::{DesignRecipe, RecipeSource};

/// Spinner shown while the provider is thinking. Hidden when `enabled` is false.
pub fn spinner(enabled: bool, msg: &str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.magenta} {msg} {elapsed}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn swatch(hex: &str) -> String {
    match Rgb::parse_hex(hex) {
        Some(c) => format!("{} {}", "    ".on_truecolor(c.r, c.g, c.b), hex),
        None => hex.to_string(),
    }
}

pub fn show_generation(gen: &Generation) {
    let source = match gen.source {
        RecipeSource::Ai => "[AI]".green().bold(),
        RecipeSource::Fallback => "[FALLBACK]".yellow().bold(),
    };

    println!("\n=== DESIGN RECIPE === {}  {}", source, gen.wedding_id.bold());
    if let Some(why) = &gen.rejection {
        println!("{} {}", "provider output not used:".dimmed(), why);
    }
    print_recipe(&gen.recipe);

    if !gen.corrections.is_empty() {
        println!("{}", "Guard-rail corrections:".bold());
        for c in &gen.corrections {
            println!(" - {}", c);
        }
    }

    let state = if gen.persisted() { "saved".green() } else { "not saved".yellow() };
    println!("{} {}\n", "Status".bold(), state);
}

/// Bare recipe view, used when only the recipe survived (write retry).
pub fn show_recipe(wedding_id: &str, recipe: &DesignRecipe) {
    println!("\n=== DESIGN RECIPE === {}", wedding_id.bold());
    print_recipe(recipe);
    println!("{} {}\n", "Status".bold(), "saved on retry".green());
}

fn print_recipe(r: &DesignRecipe) {
    println!("{}", "Palette".bold());
    println!("  bg       {}", swatch(&r.palette.bg));
    println!("  primary  {}", swatch(&r.palette.primary));
    println!("  accent   {}", swatch(&r.palette.accent));
    if let Some(ratio) = contrast_ratio_hex(&r.palette.primary, &r.palette.bg) {
        let label = format!("{ratio:.2}:1");
        let label = if ratio >= MIN_CONTRAST { label.green() } else { label.red() };
        println!("  contrast {}", label);
    }

    println!("{}  {} / {}", "Fonts".bold(), r.fonts.heading, r.fonts.body);
    println!("{}   {}", "Hero".bold(), r.hero.style.to_string().cyan());
    println!("{} {}", "Accent".bold(), r.accent.preset.to_string().magenta());
    let layout: Vec<&str> = r.layout.iter().map(|s| s.as_str()).collect();
    println!("{} {}", "Layout".bold(), layout.join(" -> "));
}

pub fn show_artifacts(dir: &Path) {
    println!("{} {}", "artifacts:".dimmed(), dir.display());
    for p in artifact_paths(dir) {
        if p.exists() {
            println!("  {}", p.display());
        }
    }
}
