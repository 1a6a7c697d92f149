//! Theme registry and loader

pub(crate) mod dracula;
pub(crate) mod gruvbox;
pub(crate) mod nord;
pub(crate) mod one_dark;

use ratatui::style::Color;
use scrollsync_core::config::{ThemeColorOverrides, ThemeConfig};
use scrollsync_core::Tint;

use crate::theme::{tint_color, Theme};

/// Parse a hex color string into a ratatui Color
/// Accepts formats: "#RRGGBB", "RRGGBB", "#RGB", "RGB"
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    Tint::from_hex(hex).map(tint_color)
}

/// Load a theme by name from config
pub fn load_theme(config: &ThemeConfig) -> Theme {
    let base = match config.name.to_lowercase().as_str() {
        "gruvbox-dark" => gruvbox::dark(),
        "gruvbox-light" => gruvbox::light(),
        "nord" => nord::default(),
        "dracula" => dracula::default(),
        "one-dark" | "onedark" => one_dark::default(),
        other => {
            tracing::warn!(theme = other, "Unknown theme, falling back to gruvbox-dark");
            gruvbox::dark()
        }
    };

    apply_overrides(base, &config.colors)
}

/// Apply user color overrides to a base theme
fn apply_overrides(mut theme: Theme, overrides: &ThemeColorOverrides) -> Theme {
    let slots: [(&Option<String>, &mut Color); 6] = [
        (&overrides.bg0, &mut theme.bg0),
        (&overrides.bg2, &mut theme.bg2),
        (&overrides.fg0, &mut theme.fg0),
        (&overrides.grey, &mut theme.grey),
        (&overrides.accent, &mut theme.accent),
        (&overrides.track, &mut theme.track),
    ];
    for (hex, slot) in slots {
        if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
            *slot = color;
        }
    }

    theme
}

/// Get list of available theme names
pub fn available_themes() -> Vec<&'static str> {
    vec!["gruvbox-dark", "gruvbox-light", "nord", "dracula", "one-dark"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("0f0"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_hex_color("nope"), None);
    }

    #[test]
    fn test_load_known_and_unknown_theme() {
        let nord = load_theme(&ThemeConfig {
            name: "Nord".to_string(),
            colors: ThemeColorOverrides::default(),
        });
        assert_eq!(nord.accent, Color::Rgb(0x88, 0xc0, 0xd0));

        let fallback = load_theme(&ThemeConfig {
            name: "does-not-exist".to_string(),
            colors: ThemeColorOverrides::default(),
        });
        assert_eq!(fallback.bg0, gruvbox::dark().bg0);
    }

    #[test]
    fn test_overrides_apply_and_ignore_invalid() {
        let theme = load_theme(&ThemeConfig {
            name: "gruvbox-dark".to_string(),
            colors: ThemeColorOverrides {
                accent: Some("#123456".to_string()),
                track: Some("bogus".to_string()),
                ..Default::default()
            },
        });
        assert_eq!(theme.accent, Color::Rgb(0x12, 0x34, 0x56));
        assert_eq!(theme.track, gruvbox::dark().track);
        assert_eq!(theme.accent_tint(), Tint::rgb(0x12, 0x34, 0x56));
    }
}
