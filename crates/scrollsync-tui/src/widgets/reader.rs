use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub struct ReaderWidget;

impl ReaderWidget {
    /// Block drawn around the document text
    pub fn block(app: &App) -> Block<'static> {
        Block::default()
            .title(format!(" {} ", app.document.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.grey))
            .style(Style::default().bg(app.theme.bg0))
    }

    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let block = Self::block(app);
        let inner = block.inner(area);

        let start = (app.scroll_row() as usize).min(app.rows().len());
        let end = (start + inner.height as usize).min(app.rows().len());
        let lines: Vec<Line> = app.rows()[start..end]
            .iter()
            .map(|row| Line::from(row.as_str()))
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(app.theme.fg0));
        frame.render_widget(paragraph, area);
    }
}
