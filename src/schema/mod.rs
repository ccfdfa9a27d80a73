use serde_json::{Map, Value};
use std::fmt;

use crate::color::is_hex_color;
use crate::wire::DesignRecipe;

const HERO_STYLES: &[&str] = &["photo-overlay", "split", "solid"];
const ACCENT_PRESETS: &[&str] = &["starfield", "none", "florals", "geometric"];
const SECTIONS: &[&str] = &["hero", "story", "gallery", "details", "rsvp"];

/// Outcome of checking provider text against the recipe shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeVerdict {
    Valid(DesignRecipe),
    Rejected(Rejection),
}

impl RecipeVerdict {
    pub fn into_recipe(self) -> Option<DesignRecipe> {
        match self {
            RecipeVerdict::Valid(r) => Some(r),
            RecipeVerdict::Rejected(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, RecipeVerdict::Valid(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Empty,
    NotJson(String),
    /// Parsed as JSON but one or more fields violate the shape.
    Shape(Vec<String>),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => f.write_str("empty response"),
            Rejection::NotJson(e) => write!(f, "response is not a JSON object: {e}"),
            Rejection::Shape(v) => write!(f, "recipe shape violations: {}", v.join("; ")),
        }
    }
}

/// Parse and check raw provider output. Never fails; anything unusable comes
/// back as `Rejected`.
pub fn validate(raw: &str) -> RecipeVerdict {
    let raw = raw.trim();
    if raw.is_empty() {
        return RecipeVerdict::Rejected(Rejection::Empty);
    }

    let value = match parse_object(raw) {
        Ok(v) => v,
        Err(e) => return RecipeVerdict::Rejected(Rejection::NotJson(e)),
    };

    let violations = shape_violations(&value);
    if !violations.is_empty() {
        return RecipeVerdict::Rejected(Rejection::Shape(violations));
    }

    match serde_json::from_value::<DesignRecipe>(value) {
        Ok(recipe) => RecipeVerdict::Valid(recipe),
        Err(e) => RecipeVerdict::Rejected(Rejection::Shape(vec![e.to_string()])),
    }
}

/// Strict parse first; otherwise pull the first balanced `{...}` out of the
/// text (code fences, leading chatter).
fn parse_object(raw: &str) -> Result<Value, String> {
    let strict_err = match serde_json::from_str::<Value>(raw) {
        Ok(v @ Value::Object(_)) => return Ok(v),
        Ok(_) => "top-level value is not an object".to_string(),
        Err(e) => e.to_string(),
    };

    if let Some(obj) = extract_first_json_object(raw) {
        if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(obj) {
            return Ok(v);
        }
    }
    Err(strict_err)
}

/// Extracts the first top-level JSON object substring from a string.
/// Braces inside string literals are skipped; returns None if not found.
pub fn extract_first_json_object(s: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|st| &s[st..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn shape_violations(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    let Some(root) = value.as_object() else {
        out.push("recipe is not an object".to_string());
        return out;
    };

    if let Some(palette) = object_field(root, "palette", &mut out) {
        for key in ["bg", "primary", "accent"] {
            match palette.get(key).and_then(Value::as_str) {
                Some(c) if is_hex_color(c) => {}
                Some(c) => out.push(format!("palette.{key} {c:?} is not a #rrggbb color")),
                None => out.push(format!("palette.{key} missing or not a string")),
            }
        }
    }

    if let Some(fonts) = object_field(root, "fonts", &mut out) {
        for key in ["heading", "body"] {
            match fonts.get(key).and_then(Value::as_str) {
                Some(name) if !name.trim().is_empty() => {}
                _ => out.push(format!("fonts.{key} must be a non-empty string")),
            }
        }
    }

    if let Some(hero) = object_field(root, "hero", &mut out) {
        enum_field(hero, "hero.style", "style", HERO_STYLES, &mut out);
    }

    if let Some(accent) = object_field(root, "accent", &mut out) {
        enum_field(accent, "accent.preset", "preset", ACCENT_PRESETS, &mut out);
    }

    match root.get("layout").and_then(Value::as_array) {
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(s) if SECTIONS.contains(&s) => {}
                    _ => out.push(format!("layout[{i}] {item} is not a known section")),
                }
            }
        }
        None => out.push("layout missing or not an array".to_string()),
    }

    out
}

fn object_field<'a>(
    root: &'a Map<String, Value>,
    key: &str,
    out: &mut Vec<String>,
) -> Option<&'a Map<String, Value>> {
    let field = root.get(key).and_then(Value::as_object);
    if field.is_none() {
        out.push(format!("{key} missing or not an object"));
    }
    field
}

fn enum_field(
    obj: &Map<String, Value>,
    label: &str,
    key: &str,
    allowed: &[&str],
    out: &mut Vec<String>,
) {
    match obj.get(key).and_then(Value::as_str) {
        Some(s) if allowed.contains(&s) => {}
        Some(s) => out.push(format!("{label} {s:?} not one of {}", allowed.join("|"))),
        None => out.push(format!("{label} missing or not a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{AccentPreset, HeroStyle, Section};
    use serde_json::json;

    fn good() -> Value {
        json!({
            "palette": { "bg": "#ffffff", "primary": "#2d3748", "accent": "#4299e1" },
            "fonts": { "heading": "Montserrat", "body": "Inter" },
            "hero": { "style": "split" },
            "accent": { "preset": "geometric" },
            "layout": ["hero", "story", "details", "rsvp"]
        })
    }

    fn rejected_shape(v: Value) -> Vec<String> {
        match validate(&v.to_string()) {
            RecipeVerdict::Rejected(Rejection::Shape(v)) => v,
            other => panic!("expected shape rejection, got {other:?}"),
        }
    }

    #[test]
    fn accepts_well_formed_recipe() {
        let recipe = validate(&good().to_string()).into_recipe().unwrap();
        assert_eq!(recipe.hero.style, HeroStyle::Split);
        assert_eq!(recipe.accent.preset, AccentPreset::Geometric);
        assert_eq!(recipe.layout[0], Section::Hero);
    }

    #[test]
    fn accepts_recipe_wrapped_in_code_fence() {
        let text = format!("Here you go:\n```json\n{}\n```\nEnjoy!", good());
        assert!(validate(&text).is_valid());
    }

    #[test]
    fn ignores_braces_inside_strings_when_extracting() {
        let text = r#"note {"a": "}"} trailing"#;
        assert_eq!(extract_first_json_object(text), Some(r#"{"a": "}"}"#));
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            validate("I'd love to help with your wedding!"),
            RecipeVerdict::Rejected(Rejection::NotJson(_))
        ));
        assert!(matches!(validate("  "), RecipeVerdict::Rejected(Rejection::Empty)));
        assert!(matches!(validate("[1,2]"), RecipeVerdict::Rejected(Rejection::NotJson(_))));
    }

    #[test]
    fn rejects_unknown_enum_values() {
        let mut v = good();
        v["hero"]["style"] = json!("parallax");
        v["accent"]["preset"] = json!("confetti");
        let violations = rejected_shape(v);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("hero.style"));
        assert!(violations[1].contains("accent.preset"));
    }

    #[test]
    fn rejects_unknown_sections_and_bad_colors() {
        let mut v = good();
        v["layout"] = json!(["hero", "registry"]);
        v["palette"]["accent"] = json!("blue");
        let violations = rejected_shape(v);
        assert!(violations.iter().any(|m| m.contains("layout[1]")));
        assert!(violations.iter().any(|m| m.contains("palette.accent")));
    }

    #[test]
    fn rejects_missing_fields_and_blank_fonts() {
        let mut v = good();
        v.as_object_mut().unwrap().remove("hero");
        v["fonts"]["body"] = json!("  ");
        let violations = rejected_shape(v);
        assert!(violations.iter().any(|m| m.starts_with("hero missing")));
        assert!(violations.iter().any(|m| m.starts_with("fonts.body")));
    }

    #[test]
    fn duplicate_sections_pass_schema() {
        let mut v = good();
        v["layout"] = json!(["hero", "story", "story"]);
        assert!(validate(&v.to_string()).is_valid());
    }
}
