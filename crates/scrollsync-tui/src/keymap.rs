//! Configurable key bindings, including two-key sequences such as `gg`

use std::collections::HashMap;
use std::hash::Hash;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use scrollsync_core::config::KeymapConfig;

use crate::input::Action;

/// A single key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Normalize a terminal event
    ///
    /// Uppercase letters arrive with SHIFT on most terminals but not all.
    pub fn from_event(event: &KeyEvent) -> Self {
        let modifiers = match event.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => event.modifiers | KeyModifiers::SHIFT,
            _ => event.modifiers,
        };
        Self::new(event.code, modifiers)
    }
}

/// Keys that work whatever the configuration says
const FALLBACK_BINDINGS: [(KeyBinding, Action); 7] = [
    (KeyBinding::key(KeyCode::Up), Action::LineUp),
    (KeyBinding::key(KeyCode::Down), Action::LineDown),
    (KeyBinding::key(KeyCode::PageUp), Action::ScrollPageUp),
    (KeyBinding::key(KeyCode::PageDown), Action::ScrollPageDown),
    (KeyBinding::key(KeyCode::Char(' ')), Action::ScrollPageDown),
    (KeyBinding::key(KeyCode::Home), Action::JumpToTop),
    (KeyBinding::key(KeyCode::End), Action::JumpToBottom),
];

/// Result of resolving one key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Action(Action),
    /// First key of a sequence; wait for the next press
    Prefix,
    Unbound,
}

#[derive(Debug, Clone)]
pub struct Keymap {
    single: HashMap<KeyBinding, Action>,
    sequences: HashMap<(KeyBinding, KeyBinding), Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut keymap = Self {
            single: HashMap::new(),
            sequences: HashMap::new(),
        };

        let configured = [
            (&config.quit, Action::Quit),
            (&config.line_down, Action::LineDown),
            (&config.line_up, Action::LineUp),
            (&config.scroll_half_down, Action::ScrollHalfPageDown),
            (&config.scroll_half_up, Action::ScrollHalfPageUp),
            (&config.scroll_page_down, Action::ScrollPageDown),
            (&config.scroll_page_up, Action::ScrollPageUp),
            (&config.jump_to_top, Action::JumpToTop),
            (&config.jump_to_bottom, Action::JumpToBottom),
            (&config.toggle_tracking, Action::ToggleTracking),
        ];
        for (notation, action) in configured {
            keymap.bind(notation, action);
        }

        for (binding, action) in FALLBACK_BINDINGS {
            keymap.single.entry(binding).or_insert(action);
        }
        keymap.single.insert(KeyBinding::ctrl('c'), Action::Quit);

        keymap
    }

    fn bind(&mut self, notation: &str, action: Action) {
        let conflict = match parse_sequence(notation).as_deref() {
            Some([key]) => insert_new(&mut self.single, *key, action),
            Some([first, second]) => insert_new(&mut self.sequences, (*first, *second), action),
            _ => {
                tracing::warn!(binding = notation, "Invalid key binding, ignoring");
                return;
            }
        };
        if let Some(existing) = conflict {
            tracing::warn!(
                binding = notation,
                ?existing,
                ?action,
                "Key conflict, keeping the earlier binding"
            );
        }
    }

    /// Action bound to a single key
    pub fn get(&self, key: KeyBinding) -> Option<Action> {
        self.single.get(&key).copied()
    }

    pub fn is_prefix(&self, key: KeyBinding) -> bool {
        self.sequences.keys().any(|(first, _)| *first == key)
    }

    /// Resolve `key`, completing the sequence started by `pending` if possible
    ///
    /// A pending prefix that the next key does not complete is dropped and
    /// the key is looked up on its own.
    pub fn resolve(&self, pending: Option<KeyBinding>, key: KeyBinding) -> Lookup {
        if let Some(action) = pending.and_then(|first| self.sequences.get(&(first, key))) {
            return Lookup::Action(*action);
        }
        if self.is_prefix(key) {
            return Lookup::Prefix;
        }
        self.get(key).map_or(Lookup::Unbound, Lookup::Action)
    }
}

fn insert_new<K: Hash + Eq>(map: &mut HashMap<K, Action>, key: K, action: Action) -> Option<Action> {
    match map.get(&key) {
        Some(existing) => Some(*existing),
        None => {
            map.insert(key, action);
            None
        }
    }
}

/// Parse Vim-style notation into one or two key presses
///
/// Accepts plain characters (`j`, `G`), bracketed keys with optional
/// modifiers (`<C-d>`, `<S-Tab>`, `<A-j>`, `<PageDown>`, `<Space>`) and
/// two-key sequences of either form (`gg`, `g<End>`).
pub fn parse_sequence(notation: &str) -> Option<Vec<KeyBinding>> {
    let mut keys = Vec::new();
    let mut rest = notation.trim();

    while let Some(c) = rest.chars().next() {
        let bracket = rest
            .strip_prefix('<')
            .and_then(|tail| tail.find('>').map(|end| (&tail[..end], &tail[end + 1..])))
            .filter(|(inner, _)| !inner.is_empty());
        match bracket {
            Some((inner, tail)) => {
                keys.push(parse_bracketed(inner)?);
                rest = tail;
            }
            None => {
                keys.push(char_key(c, KeyModifiers::NONE));
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    matches!(keys.len(), 1 | 2).then_some(keys)
}

fn char_key(c: char, modifiers: KeyModifiers) -> KeyBinding {
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        KeyBinding::new(KeyCode::Char(c.to_ascii_lowercase()), modifiers)
    } else if c.is_ascii_uppercase() || modifiers.contains(KeyModifiers::SHIFT) {
        KeyBinding::new(KeyCode::Char(c.to_ascii_uppercase()), modifiers | KeyModifiers::SHIFT)
    } else {
        KeyBinding::new(KeyCode::Char(c), modifiers)
    }
}

fn parse_bracketed(inner: &str) -> Option<KeyBinding> {
    let mut modifiers = KeyModifiers::NONE;
    let mut name = inner;
    loop {
        let (flag, tail) = match name.get(..2) {
            Some("C-") | Some("c-") => (KeyModifiers::CONTROL, &name[2..]),
            Some("S-") | Some("s-") => (KeyModifiers::SHIFT, &name[2..]),
            Some("A-") | Some("a-") | Some("M-") | Some("m-") => (KeyModifiers::ALT, &name[2..]),
            _ => break,
        };
        if tail.is_empty() {
            break;
        }
        modifiers |= flag;
        name = tail;
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "cr" | "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "bs" | "backspace" => KeyCode::Backspace,
        "space" | "spc" => return Some(KeyBinding::new(KeyCode::Char(' '), modifiers)),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        _ => {
            let mut chars = name.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Some(char_key(c, modifiers)),
                _ => None,
            };
        }
    };
    Some(KeyBinding::new(code, modifiers))
}
