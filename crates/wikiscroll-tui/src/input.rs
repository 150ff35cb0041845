use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use wikiscroll_core::Source;

use crate::app::App;
use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    ScrollPageDown,
    ScrollPageUp,
    JumpToTop,
    JumpToBottom,
    PendingG, // First 'g' press, waiting for second 'g'
    SelectSource(Source),
    NextSource,
    Expand,
    OpenInBrowser,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App, keymap: &Keymap) -> Action {
    let binding = normalize(key);

    if keymap.is_g_prefix(&binding) {
        return if app.pending_key == Some('g') {
            keymap.get_pending_g_action().cloned().unwrap_or(Action::None)
        } else {
            Action::PendingG
        };
    }

    keymap.get(&binding).cloned().unwrap_or(Action::None)
}

/// Some terminals report uppercase letters without the Shift modifier
fn normalize(key: KeyEvent) -> KeyBinding {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => {
            KeyBinding::new(key.code, key.modifiers | KeyModifiers::SHIFT)
        }
        _ => KeyBinding::new(key.code, key.modifiers),
    }
}
