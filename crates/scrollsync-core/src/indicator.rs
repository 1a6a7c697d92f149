//! Reading position indicator geometry
//!
//! Pure mapping from a progress value to a vertical track and thumb. Drawing
//! is left to the front-end; nothing here holds state or handles input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::clamp_progress;

/// Smallest track height in logical units
pub const MIN_TRACK_HEIGHT: f64 = 60.0;
/// Thumb height in logical units
pub const THUMB_HEIGHT: f64 = 44.0;

/// RGB tint supplied by the active theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Tint {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse "#RRGGBB", "RRGGBB", "#RGB" or "RGB"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self { r, g, b })
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self { r, g, b })
            }
            _ => None,
        }
    }
}

impl Default for Tint {
    fn default() -> Self {
        // Gruvbox Material aqua
        Self::rgb(0x89, 0xb4, 0x82)
    }
}

impl fmt::Display for Tint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Tint {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| crate::Error::Config(format!("invalid color: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorStyle {
    pub min_track_height: f64,
    pub thumb_height: f64,
    pub tint: Tint,
}

impl Default for IndicatorStyle {
    fn default() -> Self {
        Self {
            min_track_height: MIN_TRACK_HEIGHT,
            thumb_height: THUMB_HEIGHT,
            tint: Tint::default(),
        }
    }
}

impl IndicatorStyle {
    pub fn with_tint(mut self, tint: Tint) -> Self {
        self.tint = tint;
        self
    }
}

/// Track and thumb placement for one progress value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorGeometry {
    pub progress: f64,
    pub track_height: f64,
    pub thumb_height: f64,
    /// Distance from the top of the track to the top of the thumb
    pub thumb_offset: f64,
    pub tint: Tint,
}

impl IndicatorGeometry {
    pub fn compute(progress: f64, available_height: f64, style: &IndicatorStyle) -> Self {
        let progress = clamp_progress(progress);
        let available = if available_height.is_finite() { available_height } else { 0.0 };
        let track_height = available.max(style.min_track_height);
        let thumb_height = style.thumb_height.max(0.0);
        let travel = (track_height - thumb_height).max(0.0);

        Self {
            progress,
            track_height,
            thumb_height,
            thumb_offset: progress * travel,
            tint: style.tint,
        }
    }

    /// Place the thumb on a grid of `rows` cells
    ///
    /// Returns `(thumb_top, thumb_rows)`; the thumb keeps its share of the
    /// track but never shrinks below one cell.
    pub fn cells(&self, rows: u16) -> (u16, u16) {
        if rows == 0 {
            return (0, 0);
        }
        let scale = rows as f64 / self.track_height;
        let thumb_rows = ((self.thumb_height * scale).round() as u16).clamp(1, rows);
        let travel = rows - thumb_rows;
        let top = (self.progress * travel as f64).round() as u16;
        (top.min(travel), thumb_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumb_offset_follows_progress() {
        let style = IndicatorStyle::default();
        let g = IndicatorGeometry::compute(0.5, 544.0, &style);
        assert!((g.track_height - 544.0).abs() < f64::EPSILON);
        assert!((g.thumb_height - 44.0).abs() < f64::EPSILON);
        assert!((g.thumb_offset - 250.0).abs() < f64::EPSILON);

        let top = IndicatorGeometry::compute(0.0, 544.0, &style);
        assert!(top.thumb_offset.abs() < f64::EPSILON);
        let bottom = IndicatorGeometry::compute(1.0, 544.0, &style);
        assert!((bottom.thumb_offset - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_track_minimum_and_clamping() {
        let style = IndicatorStyle::default();
        let g = IndicatorGeometry::compute(1.7, 10.0, &style);
        assert!((g.track_height - 60.0).abs() < f64::EPSILON);
        assert!((g.progress - 1.0).abs() < f64::EPSILON);
        assert!((g.thumb_offset - 16.0).abs() < f64::EPSILON);

        let g = IndicatorGeometry::compute(-0.3, f64::NAN, &style);
        assert!(g.thumb_offset.abs() < f64::EPSILON);
        assert!((g.track_height - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_oversized_thumb_has_no_travel() {
        let style = IndicatorStyle {
            min_track_height: 10.0,
            thumb_height: 100.0,
            ..Default::default()
        };
        let g = IndicatorGeometry::compute(0.8, 50.0, &style);
        assert!(g.thumb_offset.abs() < f64::EPSILON);
    }

    #[test]
    fn test_cells() {
        let style = IndicatorStyle::default();
        let g = IndicatorGeometry::compute(1.0, 440.0, &style);
        assert_eq!(g.cells(20), (18, 2));
        let g = IndicatorGeometry::compute(0.0, 440.0, &style);
        assert_eq!(g.cells(20), (0, 2));
        let g = IndicatorGeometry::compute(0.5, 4400.0, &style);
        assert_eq!(g.cells(10), (5, 1));
        assert_eq!(g.cells(0), (0, 0));
    }

    #[test]
    fn test_tint_parsing() {
        assert_eq!(Tint::from_hex("#89b482"), Some(Tint::rgb(0x89, 0xb4, 0x82)));
        assert_eq!(Tint::from_hex("fff"), Some(Tint::rgb(255, 255, 255)));
        assert_eq!(Tint::from_hex("#12345"), None);
        assert_eq!(Tint::from_hex("zzzzzz"), None);
        assert_eq!(Tint::from_hex("ééé"), None);
        assert_eq!(Tint::rgb(0x89, 0xb4, 0x82).to_string(), "#89b482");
        assert!("nope".parse::<Tint>().is_err());
    }
}
