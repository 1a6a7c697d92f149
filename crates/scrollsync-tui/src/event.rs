use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Application events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    /// New terminal size in cells
    Resize(u16, u16),
    /// Nothing arrived within the tick rate
    Tick,
}

impl AppEvent {
    /// Map a terminal event; key releases and mouse input are ignored
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            Event::Resize(width, height) => Some(Self::Resize(width, height)),
            _ => None,
        }
    }
}

/// Polls crossterm, turning silence into ticks
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms.max(1)),
        }
    }

    /// Wait up to one tick for input
    pub fn next(&self) -> Result<Option<AppEvent>> {
        if !event::poll(self.tick_rate)? {
            return Ok(Some(AppEvent::Tick));
        }
        Ok(AppEvent::from_terminal(event::read()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseEvent, MouseEventKind};

    #[test]
    fn test_only_presses_become_keys() {
        let press = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(AppEvent::from_terminal(Event::Key(press)), Some(AppEvent::Key(press)));

        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };
        assert_eq!(AppEvent::from_terminal(Event::Key(release)), None);
    }

    #[test]
    fn test_resize_and_ignored_events() {
        assert_eq!(
            AppEvent::from_terminal(Event::Resize(120, 40)),
            Some(AppEvent::Resize(120, 40))
        );
        let mouse = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(AppEvent::from_terminal(Event::Mouse(mouse)), None);
        assert_eq!(AppEvent::from_terminal(Event::FocusGained), None);
    }
}
