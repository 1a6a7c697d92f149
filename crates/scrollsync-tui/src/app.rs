use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use crossterm::event::KeyEvent;
use scrollsync_core::{
    AppConfig, IndicatorGeometry, IndicatorStyle, ProgressRestorer, RestoreDecision, RestoreState,
    ScrollSurface, ScrollSync, Tint, UiQueue, View,
};

use crate::document::Document;
use crate::input::{handle_key_event, Action};
use crate::keymap::{KeyBinding, Keymap};
use crate::theme::Theme;

/// Logical units per terminal row
pub const ROW_HEIGHT: f64 = 16.0;

/// Reader screen state for one open document
///
/// The hierarchy mirrors a graphical reader: the scrollable text and an
/// invisible anchor overlay share a stack, and the anchor drives tracking.
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    pub document: Document,
    pub queue: UiQueue,
    _window: View,
    reader: View,
    anchor: View,
    sync: ScrollSync,
    keymap: Keymap,
    pending_key: Option<KeyBinding>,
    saved_progress: Option<f64>,
    pub tracking_enabled: bool,
    wrapped: Vec<String>,
    wrap_width: u16,
    viewport_rows: u16,
    unsaved_progress: Rc<Cell<Option<f64>>>,
    indicator_style: IndicatorStyle,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme, document: Document, saved_progress: Option<f64>) -> Self {
        let queue = UiQueue::new();

        let window = View::new_window("window");
        let stack = View::new_container("reader-stack");
        let reader = View::new_scroll("document", ScrollSurface::default());
        let anchor = View::new_overlay("progress-anchor");
        window.add_child(&stack);
        stack.add_child(&reader);
        stack.add_child(&anchor);

        let unsaved_progress = Rc::new(Cell::new(None));
        let sink = Rc::clone(&unsaved_progress);
        let restorer = ProgressRestorer::with_tolerance(queue.clone(), config.sync.restore_tolerance);
        let sync = ScrollSync::with_restorer(queue.clone(), restorer, move |progress| {
            sink.set(Some(progress));
        });
        sync.set_debug_logging(config.general.debug_logging);

        let tint = config
            .ui
            .indicator
            .tint
            .as_deref()
            .and_then(Tint::from_hex)
            .unwrap_or_else(|| theme.accent_tint());
        let indicator_style = IndicatorStyle {
            min_track_height: config.ui.indicator.min_track_height,
            thumb_height: config.ui.indicator.thumb_height,
            tint,
        };

        Self {
            keymap: Keymap::from_config(&config.keymap),
            tracking_enabled: config.sync.enabled,
            config,
            theme,
            document,
            queue,
            _window: window,
            reader,
            anchor,
            sync,
            pending_key: None,
            saved_progress,
            wrapped: Vec::new(),
            wrap_width: 0,
            viewport_rows: 0,
            unsaved_progress,
            indicator_style,
            status_message: None,
            should_quit: false,
        }
    }

    fn surface(&self) -> Rc<ScrollSurface> {
        self.reader
            .surface()
            .unwrap_or_else(|| unreachable!("reader view is always scrollable"))
    }

    /// Apply a layout pass for a text area of `width` x `rows` cells
    ///
    /// On a resize the reader stays at the same progress, unless a saved
    /// position is still waiting to be restored.
    pub fn layout(&mut self, width: u16, rows: u16) {
        let _ui = self.queue.enter();
        let surface = self.surface();
        let anchor = surface.is_laid_out().then(|| surface.snapshot().progress());
        let reflow = width != self.wrap_width;

        if reflow {
            self.wrapped = self.document.wrap(width);
            self.wrap_width = width;
        }
        let resized = reflow || rows != self.viewport_rows;
        self.viewport_rows = rows;

        surface.set_content_height(self.wrapped.len() as f64 * ROW_HEIGHT);
        surface.set_viewport_height(rows as f64 * ROW_HEIGHT);

        match anchor {
            Some(progress) if resized && !self.restore_pending() => {
                let range = surface.snapshot().range();
                surface.set_content_offset_y(range.offset_for(progress));
            }
            _ => self.clamp_offset(),
        }
    }

    /// A saved position exists that the restorer has yet to apply
    fn restore_pending(&self) -> bool {
        self.saved_progress.is_some()
            && self.tracking_enabled
            && self.sync.restore_state() == RestoreState::NotRestored
    }

    /// Re-evaluate attachment and restoration; call once per rendered frame
    pub fn render_pass(&mut self) -> RestoreDecision {
        self.sync
            .on_render(&self.anchor, self.tracking_enabled, self.saved_progress)
    }

    /// Run deferred UI work
    pub fn tick(&mut self) -> usize {
        self.queue.run_tick()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = handle_key_event(key, &self.keymap, &mut self.pending_key);
        self.apply(action);
    }

    pub fn apply(&mut self, action: Action) {
        let page = self.viewport_rows.max(1) as i32;
        match action {
            Action::Quit => self.should_quit = true,
            Action::LineDown => self.scroll_by_rows(1),
            Action::LineUp => self.scroll_by_rows(-1),
            Action::ScrollHalfPageDown => self.scroll_by_rows((page / 2).max(1)),
            Action::ScrollHalfPageUp => self.scroll_by_rows(-(page / 2).max(1)),
            Action::ScrollPageDown => self.scroll_by_rows(page),
            Action::ScrollPageUp => self.scroll_by_rows(-page),
            Action::JumpToTop => self.scroll_to_progress(0.0),
            Action::JumpToBottom => self.scroll_to_progress(1.0),
            Action::ToggleTracking => {
                self.tracking_enabled = !self.tracking_enabled;
                let state = if self.tracking_enabled { "on" } else { "off" };
                self.status_message = Some(format!("Position tracking {state}"));
                tracing::info!(enabled = self.tracking_enabled, "Toggled position tracking");
            }
            Action::Pending | Action::None => {}
        }
        if !matches!(action, Action::ToggleTracking | Action::Pending | Action::None) {
            self.status_message = None;
        }
    }

    pub fn scroll_by_rows(&mut self, delta: i32) {
        let surface = self.surface();
        let target = surface.content_offset_y() + delta as f64 * ROW_HEIGHT;
        self.set_offset(target);
    }

    pub fn scroll_to_progress(&mut self, progress: f64) {
        let target = self.surface().snapshot().range().offset_for(progress);
        self.set_offset(target);
    }

    fn set_offset(&mut self, offset: f64) {
        let _ui = self.queue.enter();
        let surface = self.surface();
        let range = surface.snapshot().range();
        surface.set_content_offset_y(offset.clamp(range.min_y, range.max_y));
    }

    fn clamp_offset(&mut self) {
        let surface = self.surface();
        let range = surface.snapshot().range();
        let offset = surface.content_offset_y();
        let clamped = offset.clamp(range.min_y, range.max_y);
        if clamped != offset {
            surface.set_content_offset_y(clamped);
        }
    }

    /// Wrapped rows of the document at the current width
    pub fn rows(&self) -> &[String] {
        &self.wrapped
    }

    /// First visible row
    pub fn scroll_row(&self) -> u16 {
        let surface = self.surface();
        let range = surface.snapshot().range();
        let row = ((surface.content_offset_y() - range.min_y) / ROW_HEIGHT).round();
        row.clamp(0.0, u16::MAX as f64) as u16
    }

    pub fn progress(&self) -> f64 {
        self.sync.live_progress().unwrap_or(0.0)
    }

    /// Progress reported since the last call, for persistence
    pub fn take_progress_update(&self) -> Option<f64> {
        self.unsaved_progress.take()
    }

    pub fn indicator_geometry(&self, rows: u16) -> IndicatorGeometry {
        IndicatorGeometry::compute(self.progress(), rows as f64 * ROW_HEIGHT, &self.indicator_style)
    }

    pub fn restore_state(&self) -> RestoreState {
        self.sync.restore_state()
    }

    pub fn is_tracking(&self) -> bool {
        self.sync.is_tracking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(lines: usize, saved: Option<f64>) -> App {
        let text = (0..lines).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        App::new(
            Arc::new(AppConfig::default()),
            Theme::default(),
            Document::from_text("test", &text),
            saved,
        )
    }

    fn frame(app: &mut App, width: u16, rows: u16) -> RestoreDecision {
        app.tick();
        app.layout(width, rows);
        app.render_pass()
    }

    #[test]
    fn test_restores_saved_progress_after_first_layout() {
        let mut app = app_with(110, Some(0.5));
        assert!(matches!(frame(&mut app, 40, 10), RestoreDecision::Scheduled { .. }));
        assert_eq!(app.scroll_row(), 0);

        frame(&mut app, 40, 10);
        assert_eq!(app.restore_state(), RestoreState::Restored);
        // 110 rows, 10 visible: 100 rows of travel
        assert_eq!(app.scroll_row(), 50);
        assert!((app.progress() - 0.5).abs() < 1e-9);
        assert!((app.take_progress_update().unwrap() - 0.5).abs() < 1e-9);
        assert!(app.take_progress_update().is_none());
    }

    #[test]
    fn test_keys_scroll_and_clamp() {
        let mut app = app_with(30, None);
        frame(&mut app, 40, 10);
        app.apply(Action::LineDown);
        assert_eq!(app.scroll_row(), 1);
        app.apply(Action::ScrollPageDown);
        assert_eq!(app.scroll_row(), 11);
        app.apply(Action::ScrollPageDown);
        app.apply(Action::ScrollPageDown);
        assert_eq!(app.scroll_row(), 20);
        assert!((app.progress() - 1.0).abs() < 1e-9);
        app.apply(Action::JumpToTop);
        assert_eq!(app.scroll_row(), 0);
        app.apply(Action::LineUp);
        assert_eq!(app.scroll_row(), 0);
    }

    #[test]
    fn test_disabled_tracking_skips_restore() {
        let mut app = app_with(50, Some(0.8));
        app.apply(Action::ToggleTracking);
        assert!(!app.tracking_enabled);
        assert_eq!(frame(&mut app, 40, 10), RestoreDecision::Disabled);
        frame(&mut app, 40, 10);
        assert_eq!(app.scroll_row(), 0);
        assert!(!app.is_tracking());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_resize_keeps_position() {
        let mut app = app_with(110, Some(0.5));
        frame(&mut app, 40, 10);
        frame(&mut app, 40, 10);
        frame(&mut app, 40, 20);
        assert!((app.progress() - 0.5).abs() < 1e-9);
        assert_eq!(app.scroll_row(), 45);
    }

    #[test]
    fn test_resize_keeps_position_without_saved_progress() {
        let mut app = app_with(110, None);
        frame(&mut app, 40, 10);
        app.scroll_by_rows(50);
        assert!((app.progress() - 0.5).abs() < 1e-9);

        frame(&mut app, 40, 20);
        assert!((app.progress() - 0.5).abs() < 1e-9);
        assert_eq!(app.scroll_row(), 45);
    }

    #[test]
    fn test_resize_uses_current_offset_when_tracking_off() {
        let mut app = app_with(110, Some(0.5));
        frame(&mut app, 40, 10);
        frame(&mut app, 40, 10);
        assert_eq!(app.scroll_row(), 50);

        app.apply(Action::ToggleTracking);
        frame(&mut app, 40, 10);
        assert!(!app.is_tracking());
        app.apply(Action::JumpToBottom);
        assert_eq!(app.scroll_row(), 100);

        frame(&mut app, 40, 20);
        assert_eq!(app.scroll_row(), 90);
    }

    #[test]
    fn test_resize_before_restore_keeps_saved_target() {
        let mut app = app_with(110, Some(0.5));
        frame(&mut app, 40, 10);
        // Resized before the deferred restore ran
        app.layout(40, 20);
        frame(&mut app, 40, 20);
        assert_eq!(app.restore_state(), RestoreState::Restored);
        assert_eq!(app.scroll_row(), 45);
    }

    #[test]
    fn test_indicator_follows_progress() {
        let mut app = app_with(110, Some(1.0));
        frame(&mut app, 40, 20);
        frame(&mut app, 40, 20);
        let geometry = app.indicator_geometry(20);
        let (top, thumb) = geometry.cells(20);
        assert_eq!(top + thumb, 20);
    }
}
