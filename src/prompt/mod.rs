use crate::wire::Wedding;

fn output_format() -> &'static str {
r##"Output format (return EXACTLY ONE JSON object, no markdown, no prose, no code fences):
{
  "palette": { "bg": "#ffffff", "primary": "#2d3748", "accent": "#4299e1" },
  "fonts": { "heading": "Playfair Display", "body": "Inter" },
  "hero": { "style": "photo-overlay" | "split" | "solid" },
  "accent": { "preset": "starfield" | "none" | "florals" | "geometric" },
  "layout": ["hero", "story", "gallery", "details", "rsvp"]
}"##
}

fn design_rules() -> &'static str {
r#"Design Rules:
- Colors are 6-digit hex strings with a leading '#'.
- "primary" is used for text on "bg"; keep them high-contrast (WCAG AA, ratio >= 4.5).
- Fonts must be real Google Fonts display names; pair a characterful heading font with a readable body font.
- "layout" lists sections in page order, each at most once, drawn only from: hero, story, gallery, details, rsvp.
- Always start with "hero" and include "details".
- If the couple has no photos: do not use "photo-overlay" and do not include "gallery".
- Choose the accent preset that best matches the theme's mood."#
}

/// Human phrasing of the pieces of a wedding we have; blanks are described
/// rather than left empty so the model doesn't invent names.
fn describe(wedding: &Wedding) -> String {
    let couple = match (wedding.partner1_name.trim(), wedding.partner2_name.trim()) {
        ("", "") => "the couple".to_string(),
        (a, "") | ("", a) => a.to_string(),
        (a, b) => format!("{a} & {b}"),
    };
    let theme = match wedding.theme.trim() {
        "" => "no particular theme (choose something timeless)".to_string(),
        t => format!("\"{t}\""),
    };
    let date = wedding
        .wedding_date
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "date not set".to_string());
    let city = match wedding.city.trim() {
        "" => "location not set".to_string(),
        c => c.to_string(),
    };
    let photos = match wedding.photo_count() {
        0 => "no photos uploaded".to_string(),
        1 => "1 photo uploaded".to_string(),
        n => format!("{n} photos uploaded"),
    };

    format!(
        "Couple: {couple}\nTheme: {theme}\nDate: {date}\nLocation: {city}\nPhotos: {photos}\nGuests: {}",
        wedding.guest_count
    )
}

/// The full instruction sent to the text provider for one wedding.
pub fn recipe_prompt(wedding: &Wedding) -> String {
    format!(
        "You are a wedding website designer. Create a design recipe for this wedding website.\n\n{}\n\n{}\n\n{}",
        describe(wedding),
        design_rules(),
        output_format()
    )
}
