//! Theme registry and color derivation.
//!
//! Themes are a closed set of embedded stylesheets. An optional hex override
//! is expanded into a three-color scheme and patched into the stylesheet's
//! custom-property declarations textually.

use regex::Regex;
use std::sync::OnceLock;

use crate::errors::AppError;

/// An available theme with its embedded stylesheet.
#[derive(Debug)]
pub struct Theme {
    pub name: &'static str,
    pub description: &'static str,
    pub css: &'static str,
}

pub const DEFAULT_THEME: &str = "modern";

pub const THEMES: &[Theme] = &[
    Theme {
        name: "modern",
        description: "Modern theme with blue gradient (default)",
        css: include_str!("../../assets/themes/modern.css"),
    },
    Theme {
        name: "classic",
        description: "Classic professional theme in black",
        css: include_str!("../../assets/themes/classic.css"),
    },
    Theme {
        name: "minimal",
        description: "Clean minimalist theme",
        css: include_str!("../../assets/themes/minimal.css"),
    },
    Theme {
        name: "elegant",
        description: "Elegant theme with burgundy colors",
        css: include_str!("../../assets/themes/elegant.css"),
    },
    Theme {
        name: "tech",
        description: "Tech theme with green/cyan",
        css: include_str!("../../assets/themes/tech.css"),
    },
];

pub fn theme_names() -> String {
    THEMES
        .iter()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn get_theme(name: &str) -> Result<&'static Theme, AppError> {
    THEMES
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| AppError::InvalidTheme {
            name: name.to_string(),
            available: theme_names(),
        })
}

/// Checks a `#RGB` / `#RRGGBB` hex color. The empty string is explicitly
/// valid: it means "no override".
pub fn validate_hex_color(color: &str) -> bool {
    if color.is_empty() {
        return true;
    }
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^#([0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})$").unwrap());
    re.is_match(color)
}

/// A primary color with its two derived companions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

/// Derives secondary (darkened 20%) and accent (lightened 15%) from a primary.
pub fn derive_color_scheme(primary: &str) -> ColorScheme {
    ColorScheme {
        primary: primary.to_string(),
        secondary: darken(primary, 0.2),
        accent: lighten(primary, 0.15),
    }
}

fn darken(hex: &str, factor: f64) -> String {
    let (r, g, b) = hex_to_rgb(hex);
    rgb_to_hex(
        (r as f64 * (1.0 - factor)) as i32,
        (g as f64 * (1.0 - factor)) as i32,
        (b as f64 * (1.0 - factor)) as i32,
    )
}

fn lighten(hex: &str, factor: f64) -> String {
    let (r, g, b) = hex_to_rgb(hex);
    rgb_to_hex(
        r as i32 + ((255 - r as i32) as f64 * factor) as i32,
        g as i32 + ((255 - g as i32) as f64 * factor) as i32,
        b as i32 + ((255 - b as i32) as f64 * factor) as i32,
    )
}

pub fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let expanded = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect::<String>()
    } else {
        hex.to_string()
    };

    let parse = |range| u8::from_str_radix(expanded.get(range).unwrap_or("0"), 16).unwrap_or(0);
    (parse(0..2), parse(2..4), parse(4..6))
}

pub fn rgb_to_hex(r: i32, g: i32, b: i32) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        r.clamp(0, 255),
        g.clamp(0, 255),
        b.clamp(0, 255)
    )
}

/// Returns the theme's CSS with the custom color scheme substituted in place
/// of the three custom-property declarations. No-op without an override.
pub fn theme_css_with_color(theme_name: &str, custom_color: &str) -> Result<String, AppError> {
    let theme = get_theme(theme_name)?;

    if custom_color.is_empty() {
        return Ok(theme.css.to_string());
    }
    if !validate_hex_color(custom_color) {
        return Err(AppError::InvalidColor(custom_color.to_string()));
    }

    static PRIMARY: OnceLock<Regex> = OnceLock::new();
    static SECONDARY: OnceLock<Regex> = OnceLock::new();
    static ACCENT: OnceLock<Regex> = OnceLock::new();
    let primary_re =
        PRIMARY.get_or_init(|| Regex::new(r"--primary-color:\s*#[0-9A-Fa-f]{6};").unwrap());
    let secondary_re =
        SECONDARY.get_or_init(|| Regex::new(r"--secondary-color:\s*#[0-9A-Fa-f]{6};").unwrap());
    let accent_re =
        ACCENT.get_or_init(|| Regex::new(r"--accent-color:\s*#[0-9A-Fa-f]{6};").unwrap());

    let scheme = derive_color_scheme(custom_color);
    let css = primary_re.replace(theme.css, format!("--primary-color: {};", scheme.primary));
    let css = secondary_re.replace(&css, format!("--secondary-color: {};", scheme.secondary));
    let css = accent_re.replace(&css, format!("--accent-color: {};", scheme.accent));

    Ok(css.into_owned())
}
