use ratatui::style::Color;
use scrollsync_core::Tint;

/// Runtime theme with configurable colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey: Color,

    // Semantic colors
    pub accent: Color,
    pub track: Color,
}

impl Default for Theme {
    fn default() -> Self {
        crate::themes::gruvbox::dark()
    }
}

impl Theme {
    /// Accent as a tint for the progress indicator
    pub fn accent_tint(&self) -> Tint {
        match self.accent {
            Color::Rgb(r, g, b) => Tint::rgb(r, g, b),
            _ => Tint::default(),
        }
    }
}

/// Convert an indicator tint into a terminal color
pub fn tint_color(tint: Tint) -> Color {
    Color::Rgb(tint.r, tint.g, tint.b)
}
