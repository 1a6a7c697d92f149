use crossterm::event::KeyEvent;

use crate::keymap::{KeyBinding, Keymap, Lookup};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    LineDown,
    LineUp,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    ScrollPageDown,
    ScrollPageUp,
    JumpToTop,
    JumpToBottom,
    ToggleTracking,
    /// First key of a sequence was pressed
    Pending,
    None,
}

/// Handle a key event and return the corresponding action
///
/// `pending` carries the first key of a sequence between calls.
pub fn handle_key_event(key: KeyEvent, keymap: &Keymap, pending: &mut Option<KeyBinding>) -> Action {
    let binding = KeyBinding::from_event(&key);
    match keymap.resolve(pending.take(), binding) {
        Lookup::Action(action) => action,
        Lookup::Prefix => {
            *pending = Some(binding);
            Action::Pending
        }
        Lookup::Unbound => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_basic_bindings() {
        let keymap = Keymap::default();
        let mut pending = None;
        assert_eq!(
            handle_key_event(press(KeyCode::Char('j'), KeyModifiers::NONE), &keymap, &mut pending),
            Action::LineDown
        );
        assert_eq!(
            handle_key_event(press(KeyCode::Char('d'), KeyModifiers::CONTROL), &keymap, &mut pending),
            Action::ScrollHalfPageDown
        );
        assert_eq!(
            handle_key_event(press(KeyCode::Char('G'), KeyModifiers::NONE), &keymap, &mut pending),
            Action::JumpToBottom
        );
        assert_eq!(
            handle_key_event(press(KeyCode::Char('z'), KeyModifiers::NONE), &keymap, &mut pending),
            Action::None
        );
    }

    #[test]
    fn test_gg_sequence() {
        let keymap = Keymap::default();
        let mut pending = None;
        let g = press(KeyCode::Char('g'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(g, &keymap, &mut pending), Action::Pending);
        assert!(pending.is_some());
        assert_eq!(handle_key_event(g, &keymap, &mut pending), Action::JumpToTop);
        assert!(pending.is_none());

        // Any other key cancels the pending prefix.
        handle_key_event(g, &keymap, &mut pending);
        assert_eq!(
            handle_key_event(press(KeyCode::Char('j'), KeyModifiers::NONE), &keymap, &mut pending),
            Action::LineDown
        );
        assert!(pending.is_none());
    }
}
