//! Elm-style state model for the prompt grid UI.
//!
//! All display state lives in [`TuiModel`]. Input events arrive as
//! [`TuiMsg`] values; side-effects are represented as [`TuiCmd`] values
//! returned from the update function.
//!
//! The model itself performs no I/O. The controller it owns is the single
//! owner of the filter state and current selection.

use crossterm::event::{KeyEvent, MouseEvent};

use crate::catalog::{Category, ComboKey, Level};
use crate::core::config::DisplayConfig;
use crate::engine::controller::{Action, Controller};
use crate::logger::activity::ActivityEvent;

use super::layout::{ScreenLayout, build_layout};
use super::theme::ColorMode;

/// Which area receives Enter/Space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    /// The prompt surface: Enter/Space draw a new prompt.
    #[default]
    Surface,
    /// The filter grid: Enter/Space press the element under the cursor.
    Grid,
}

/// Cursor over the grid including its headers.
///
/// `col == 0` is the row-header column and `row == 0` the column-header row;
/// cells start at `(1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCursor {
    pub col: usize,
    pub row: usize,
}

impl Default for GridCursor {
    fn default() -> Self {
        Self { col: 1, row: 1 }
    }
}

/// Arrow-key direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl GridCursor {
    /// Move one step, clamped to a grid of `categories` × `levels` plus
    /// headers.
    pub fn step(&mut self, direction: Direction, categories: usize, levels: usize) {
        match direction {
            Direction::Up => self.row = self.row.saturating_sub(1),
            Direction::Down => self.row = (self.row + 1).min(levels),
            Direction::Left => self.col = self.col.saturating_sub(1),
            Direction::Right => self.col = (self.col + 1).min(categories),
        }
    }
}

/// Presentation options resolved from config and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_hints: bool,
    pub level_label: String,
    pub color: ColorMode,
}

impl DisplayOptions {
    #[must_use]
    pub fn from_config(config: &DisplayConfig, cli_no_color: bool) -> Self {
        Self {
            show_hints: config.show_hints,
            level_label: config.level_label.clone(),
            color: ColorMode::resolve(config.color, cli_no_color),
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_hints: true,
            level_label: "Level".to_string(),
            color: ColorMode::Enabled,
        }
    }
}

/// Complete UI state.
#[derive(Debug)]
pub struct TuiModel {
    pub controller: Controller,
    pub focus: Focus,
    pub cursor: GridCursor,
    pub help_open: bool,
    pub terminal_size: (u16, u16),
    pub quit: bool,
    pub display: DisplayOptions,
    /// Transient status line, e.g. why the last action was ignored.
    pub notice: Option<String>,
}

impl TuiModel {
    #[must_use]
    pub fn new(controller: Controller, display: DisplayOptions, terminal_size: (u16, u16)) -> Self {
        Self {
            controller,
            focus: Focus::default(),
            cursor: GridCursor::default(),
            help_open: false,
            terminal_size,
            quit: false,
            display,
            notice: None,
        }
    }

    /// Header label for a level row, e.g. `Level 2`.
    #[must_use]
    pub fn level_label(&self, level: Level) -> String {
        format!("{} {level}", self.display.level_label)
    }

    #[must_use]
    pub fn row_labels(&self) -> Vec<String> {
        self.controller
            .catalog()
            .levels()
            .iter()
            .map(|level| self.level_label(*level))
            .collect()
    }

    /// Layout for the current terminal size, or `None` when too small.
    #[must_use]
    pub fn layout(&self) -> Option<ScreenLayout> {
        let names: Vec<&str> = self
            .controller
            .catalog()
            .categories()
            .iter()
            .map(Category::as_str)
            .collect();
        build_layout(
            self.terminal_size.0,
            self.terminal_size.1,
            &names,
            &self.row_labels(),
        )
    }

    /// The action pressing the grid element at (`col`, `row`) maps to, in
    /// cursor coordinates. Cells without prompts and the corner map to
    /// nothing.
    #[must_use]
    pub fn grid_action(&self, col: usize, row: usize) -> Option<Action> {
        let catalog = self.controller.catalog();
        match (col, row) {
            (0, 0) => None,
            (0, row) => catalog
                .levels()
                .get(row - 1)
                .map(|level| Action::ToggleRow(*level)),
            (col, 0) => catalog
                .categories()
                .get(col - 1)
                .map(|category| Action::ToggleColumn(category.clone())),
            (col, row) => {
                let category = catalog.categories().get(col - 1)?;
                let level = *catalog.levels().get(row - 1)?;
                catalog
                    .exists(category, level)
                    .then(|| Action::ToggleCell(ComboKey::new(category.clone(), level)))
            }
        }
    }
}

/// Messages fed into [`super::update::update`].
#[derive(Debug, Clone)]
pub enum TuiMsg {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize { cols: u16, rows: u16 },
}

/// Side-effects the runtime executes after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiCmd {
    None,
    /// Terminate the event loop.
    Quit,
    /// Append events to the activity log.
    Log(Vec<ActivityEvent>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, PromptRecord};
    use crate::engine::controller::SessionOptions;

    fn model() -> TuiModel {
        let catalog = Catalog::from_records(vec![
            PromptRecord::new("T1", "question", 1),
            PromptRecord::new("T2", "question", 2),
            PromptRecord::new("T3", "physical", 1),
        ])
        .unwrap();
        let controller = Controller::start(
            catalog,
            &SessionOptions {
                seed: Some(1),
                ..SessionOptions::default()
            },
        )
        .unwrap();
        TuiModel::new(controller, DisplayOptions::default(), (80, 24))
    }

    #[test]
    fn cursor_is_clamped_to_grid() {
        let mut cursor = GridCursor::default();
        cursor.step(Direction::Up, 2, 3);
        cursor.step(Direction::Up, 2, 3);
        assert_eq!(cursor.row, 0);
        for _ in 0..10 {
            cursor.step(Direction::Right, 2, 3);
            cursor.step(Direction::Down, 2, 3);
        }
        assert_eq!(cursor, GridCursor { col: 2, row: 3 });
    }

    #[test]
    fn grid_action_maps_headers_and_cells() {
        let m = model();
        assert_eq!(m.grid_action(0, 0), None);
        assert_eq!(m.grid_action(0, 2), Some(Action::ToggleRow(Level::new(2))));
        assert_eq!(
            m.grid_action(2, 0),
            Some(Action::ToggleColumn(Category::from("physical")))
        );
        assert_eq!(
            m.grid_action(1, 1),
            Some(Action::ToggleCell(ComboKey::new("question", 1)))
        );
        // physical:2 has no prompts
        assert_eq!(m.grid_action(2, 2), None);
    }

    #[test]
    fn row_labels_use_configured_label() {
        let mut m = model();
        m.display.level_label = "Heat".to_string();
        assert_eq!(m.row_labels(), vec!["Heat 1", "Heat 2"]);
    }

    #[test]
    fn layout_is_none_when_terminal_too_small() {
        let mut m = model();
        assert!(m.layout().is_some());
        m.terminal_size = (20, 5);
        assert!(m.layout().is_none());
    }
}
