//! Semantic theme tokens and `NO_COLOR` handling for the grid UI.

#![allow(missing_docs)]

use std::env;

use crossterm::style::Color;

/// Color output mode for compatibility with `NO_COLOR` and `--no-color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Enabled,
    Disabled,
}

impl ColorMode {
    /// Resolve the mode from the config flag, the CLI flag and `NO_COLOR`.
    #[must_use]
    pub fn resolve(config_color: bool, cli_no_color: bool) -> Self {
        Self::from_flags(config_color, cli_no_color, env::var_os("NO_COLOR").is_some())
    }

    #[must_use]
    pub const fn from_flags(config_color: bool, cli_no_color: bool, env_no_color: bool) -> Self {
        if config_color && !cli_no_color && !env_no_color {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    #[must_use]
    pub const fn no_color(self) -> bool {
        matches!(self, Self::Disabled)
    }
}

/// Semantic token category independent of concrete color codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticToken {
    Title,
    Prompt,
    Caption,
    Hint,
    Active,
    Inactive,
    Header,
    Warning,
    Muted,
    Neutral,
}

/// Render-facing palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    mode: ColorMode,
}

impl ThemePalette {
    #[must_use]
    pub const fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(self) -> ColorMode {
        self.mode
    }

    /// Foreground color for `token`; `None` leaves the terminal default.
    #[must_use]
    pub const fn color(self, token: SemanticToken) -> Option<Color> {
        if self.mode.no_color() {
            return None;
        }
        Some(match token {
            SemanticToken::Title | SemanticToken::Header => Color::Cyan,
            SemanticToken::Prompt | SemanticToken::Neutral => Color::White,
            SemanticToken::Caption => Color::Magenta,
            SemanticToken::Hint | SemanticToken::Muted => Color::DarkGrey,
            SemanticToken::Active => Color::Green,
            SemanticToken::Inactive => Color::Red,
            SemanticToken::Warning => Color::Yellow,
        })
    }

    /// Tokens rendered bold regardless of color mode.
    #[must_use]
    pub const fn is_bold(token: SemanticToken) -> bool {
        matches!(
            token,
            SemanticToken::Title | SemanticToken::Prompt | SemanticToken::Header
        )
    }
}
