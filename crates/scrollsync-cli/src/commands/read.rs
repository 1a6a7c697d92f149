use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use scrollsync_core::{store::document_key, AppConfig, ProgressStore, ProgressWriter, RestoreState};
use scrollsync_tui::{
    event::{AppEvent, EventHandler},
    load_theme, ui, App, Document,
};

type Backend = CrosstermBackend<io::Stdout>;

pub async fn run(config: Arc<AppConfig>, file: &Path) -> Result<()> {
    let document = Document::load(file)?;

    let store_path = config.store_path();
    let store = ProgressStore::open(&store_path)
        .with_context(|| format!("Failed to open progress store {}", store_path.display()))?;
    let key = document_key(file);
    let mut writer = ProgressWriter::new(
        store,
        key.clone(),
        Duration::from_millis(config.sync.persist_debounce_ms),
    );
    let saved = writer.saved_progress();
    tracing::info!(document = %key, saved = ?saved, "Opening document");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        SetTitle(format!("scrollsync - {}", document.title))
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = load_theme(&config.ui.theme);
    let mut app = App::new(config.clone(), theme, document, saved);
    let events = EventHandler::new(config.ui.tick_rate_ms);

    let result = event_loop(&mut terminal, &mut app, &events, &mut writer, saved.is_some());

    // Save before teardown so a terminal error cannot lose the position
    let saved_write = persist_final(&app, &mut writer, saved.is_some());
    if let Some(progress) = writer.saved_progress() {
        tracing::info!(document = %key, progress, "Saved reading position");
    }

    // Restore terminal
    let teardown = restore_terminal(&mut terminal);

    result.and(saved_write).and(teardown)
}

/// Record the last observed progress and write the store
fn persist_final(app: &App, writer: &mut ProgressWriter, has_saved: bool) -> Result<()> {
    let restoring = has_saved && app.restore_state() == RestoreState::NotRestored;
    match app.take_progress_update() {
        Some(progress) if !restoring => writer.record(progress, Instant::now()).map(|_| ()),
        _ => Ok(()),
    }
    .and_then(|()| writer.flush())
    .context("Failed to save reading position")
}

fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    raw?;
    screen?;
    cursor?;
    Ok(())
}

fn event_loop(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    events: &EventHandler,
    writer: &mut ProgressWriter,
    has_saved: bool,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Until the saved position is applied, updates describe the top of a
        // fresh layout and would overwrite it.
        let restoring = has_saved && app.restore_state() == RestoreState::NotRestored;
        let now = Instant::now();
        match app.take_progress_update() {
            Some(progress) if !restoring => {
                writer.record(progress, now)?;
            }
            _ => {
                writer.flush_due(now)?;
            }
        }

        match events.next()? {
            Some(AppEvent::Key(key)) => app.handle_key(key),
            Some(AppEvent::Resize(width, height)) => {
                tracing::debug!(width, height, "Terminal resized");
                ui::relayout(app, Rect::new(0, 0, width, height));
            }
            Some(AppEvent::Tick) | None => {}
        }

        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}
