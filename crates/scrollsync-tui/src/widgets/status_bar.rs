use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use scrollsync_core::RestoreState;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn status_text(app: &App) -> String {
        if let Some(msg) = &app.status_message {
            return format!(" {}", msg);
        }

        let tracking = if app.is_tracking() { "TRACKING" } else { "PAUSED" };
        let restore = match app.restore_state() {
            RestoreState::Restored => "restored",
            RestoreState::NotRestored => "pending",
        };
        format!(
            " {} | {:>3.0}% | {} | {}",
            tracking,
            app.progress() * 100.0,
            restore,
            app.document.title
        )
    }

    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let status_text = Self::status_text(app);
        let help_hint = " q:quit j/k:scroll gg/G:top/bottom t:tracking ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(
                status_text,
                Style::default().fg(app.theme.fg0).bg(app.theme.bg2),
            ),
            Span::styled(" ".repeat(padding_len), Style::default().bg(app.theme.bg2)),
            Span::styled(
                help_hint,
                Style::default().fg(app.theme.grey).bg(app.theme.bg2),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
