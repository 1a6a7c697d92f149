use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};
use scrollsync_core::IndicatorGeometry;

use crate::theme::tint_color;

const TRACK_SYMBOL: &str = "│";
const THUMB_SYMBOL: &str = "█";

/// Vertical reading-progress bar, one column wide
///
/// Purely presentational: the geometry is computed elsewhere from the live
/// progress and only mapped onto cells here.
pub struct ProgressIndicator {
    geometry: IndicatorGeometry,
    track: Color,
}

impl ProgressIndicator {
    pub fn new(geometry: IndicatorGeometry, track: Color) -> Self {
        Self { geometry, track }
    }
}

impl Widget for ProgressIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let (top, thumb_rows) = self.geometry.cells(area.height);
        let thumb = tint_color(self.geometry.tint);

        for row in 0..area.height {
            let (symbol, color) = if row >= top && row < top + thumb_rows {
                (THUMB_SYMBOL, thumb)
            } else {
                (TRACK_SYMBOL, self.track)
            };
            if let Some(cell) = buf.cell_mut((area.x, area.y + row)) {
                cell.set_symbol(symbol).set_fg(color);
            }
        }
    }
}
