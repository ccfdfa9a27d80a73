use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Minimum primary-on-background contrast the generated site must meet.
pub const MIN_CONTRAST: f64 = 4.5;

/// Per-channel multiplier applied by one darkening step.
pub const DARKEN_FACTOR: f64 = 0.85;

fn hex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("static hex pattern"))
}

/// True for `#` followed by exactly six hex digits.
pub fn is_hex_color(s: &str) -> bool {
    hex_re().is_match(s)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(s: &str) -> Option<Self> {
        if !is_hex_color(s) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::new(channel(1)?, channel(3)?, channel(5)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// WCAG relative luminance.
    pub fn relative_luminance(self) -> f64 {
        fn linear(v: u8) -> f64 {
            let c = f64::from(v) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Multiply every channel by `factor`, rounding to nearest and clamping.
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |v: u8| (f64::from(v) * factor).round().clamp(0.0, 255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    pub fn darkened(self) -> Self {
        self.scaled(DARKEN_FACTOR)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

/// Contrast of two hex strings; `None` if either does not parse.
pub fn contrast_ratio_hex(a: &str, b: &str) -> Option<f64> {
    Some(contrast_ratio(Rgb::parse_hex(a)?, Rgb::parse_hex(b)?))
}

pub fn meets_contrast(fg: Rgb, bg: Rgb) -> bool {
    contrast_ratio(fg, bg) >= MIN_CONTRAST
}
