//! Frame layout for the reader screen

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::App;
use crate::widgets::{ProgressIndicator, ReaderWidget, StatusBarWidget};

/// Areas of one frame: document block, indicator column, status line
pub fn split(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(rows[0]);
    (columns[0], columns[1], rows[1])
}

/// Lay out the document for a terminal of the given size
pub fn relayout(app: &mut App, area: Rect) {
    let (reader, _, _) = split(area);
    let text = ReaderWidget::block(app).inner(reader);
    app.layout(text.width, text.height);
}

/// Lay out the document for this frame and draw it
///
/// Runs the layout and render pass before any widget reads scroll state, so
/// the indicator and text agree within a frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let (reader, indicator, status) = split(frame.area());
    relayout(app, frame.area());
    app.render_pass();

    ReaderWidget::render(frame, reader, app);
    let geometry = app.indicator_geometry(indicator.height);
    frame.render_widget(ProgressIndicator::new(geometry, app.theme.track), indicator);
    StatusBarWidget::render(frame, status, app);
}
