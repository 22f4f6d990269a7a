//! Key routing: terminal key events resolved to UI actions.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::model::Direction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputContext {
    pub help_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    ToggleHelp,
    CloseHelp,
    SwitchFocus,
    MoveCursor(Direction),
    /// Enter/Space: act on whatever has focus.
    Press,
    /// Draw again regardless of focus.
    Redraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputResolution {
    pub action: Option<InputAction>,
    pub consumed: bool,
}

impl InputResolution {
    const fn action(action: InputAction) -> Self {
        Self {
            action: Some(action),
            consumed: true,
        }
    }

    const fn consumed_without_action() -> Self {
        Self {
            action: None,
            consumed: true,
        }
    }

    const fn passthrough() -> Self {
        Self {
            action: None,
            consumed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

const HELP_BINDINGS: [HelpBinding; 8] = [
    HelpBinding {
        keys: "Enter / Space",
        description: "draw a prompt, or toggle the focused grid element",
    },
    HelpBinding {
        keys: "r",
        description: "draw a new prompt",
    },
    HelpBinding {
        keys: "Tab",
        description: "switch focus between prompt and grid",
    },
    HelpBinding {
        keys: "Arrows / hjkl",
        description: "move the grid cursor",
    },
    HelpBinding {
        keys: "Click cell",
        description: "toggle one category/level combination",
    },
    HelpBinding {
        keys: "Click header",
        description: "toggle a whole row or column",
    },
    HelpBinding {
        keys: "?",
        description: "show or hide this help",
    },
    HelpBinding {
        keys: "q / Esc / Ctrl-C",
        description: "quit",
    },
];

/// Key bindings listed in the help overlay.
#[must_use]
pub const fn help_bindings() -> &'static [HelpBinding] {
    &HELP_BINDINGS
}

/// Resolve a key event. The help overlay captures every key while open.
#[must_use]
pub fn resolve_key_event(key: &KeyEvent, context: InputContext) -> InputResolution {
    if key.kind == KeyEventKind::Release {
        return InputResolution::passthrough();
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputResolution::action(InputAction::Quit);
    }
    if context.help_open {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?' | 'q') => {
                InputResolution::action(InputAction::CloseHelp)
            }
            _ => InputResolution::consumed_without_action(),
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => InputResolution::action(InputAction::Quit),
        KeyCode::Char('?') => InputResolution::action(InputAction::ToggleHelp),
        KeyCode::Tab | KeyCode::BackTab => InputResolution::action(InputAction::SwitchFocus),
        KeyCode::Enter | KeyCode::Char(' ') => InputResolution::action(InputAction::Press),
        KeyCode::Char('r') => InputResolution::action(InputAction::Redraw),
        KeyCode::Up | KeyCode::Char('k') => {
            InputResolution::action(InputAction::MoveCursor(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j') => {
            InputResolution::action(InputAction::MoveCursor(Direction::Down))
        }
        KeyCode::Left | KeyCode::Char('h') => {
            InputResolution::action(InputAction::MoveCursor(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') => {
            InputResolution::action(InputAction::MoveCursor(Direction::Right))
        }
        _ => InputResolution::passthrough(),
    }
}
