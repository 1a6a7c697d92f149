//! Nord theme
//! https://www.nordtheme.com/

use ratatui::style::Color;
use crate::theme::Theme;

pub fn default() -> Theme {
    Theme {
        bg0: Color::Rgb(0x2e, 0x34, 0x40),   // nord0
        bg2: Color::Rgb(0x43, 0x4c, 0x5e),   // nord2
        fg0: Color::Rgb(0xec, 0xef, 0xf4),   // nord6
        grey: Color::Rgb(0x5e, 0x68, 0x7a),
        accent: Color::Rgb(0x88, 0xc0, 0xd0), // nord8
        track: Color::Rgb(0x4c, 0x56, 0x6a), // nord3
    }
}
