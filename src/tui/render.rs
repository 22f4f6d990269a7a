//! Frame construction for the prompt grid UI.
//!
//! [`render`] turns the model into a [`Frame`]: a list of positioned, styled
//! text runs. The runtime paints frames with crossterm; tests inspect them
//! as plain text.

#![allow(missing_docs)]

use crate::engine::controller::DeckView;
use crate::engine::filter::LineState;

use super::input::help_bindings;
use super::layout::{
    GridGeometry, MIN_USABLE_COLS, MIN_USABLE_ROWS, ScreenLayout, clamp_lines, text_width,
    wrap_text,
};
use super::model::{Focus, TuiModel};
use super::theme::SemanticToken;

pub const ACTIVE_MARK: &str = "✓";
pub const INACTIVE_MARK: &str = "✕";
pub const EMPTY_MESSAGE: &str = "No prompts available for the selected filters.";
pub const SURFACE_HINT: &str = "(Click anywhere or press Enter/Space to see another prompt)";
const KEY_HINT: &str = "Tab: grid  ·  arrows: move  ·  ?: help  ·  q: quit";

/// A styled run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub token: SemanticToken,
    /// Drawn in reverse video (grid cursor).
    pub highlight: bool,
}

impl Span {
    fn new(text: impl Into<String>, token: SemanticToken) -> Self {
        Self {
            text: text.into(),
            token,
            highlight: false,
        }
    }

    fn highlighted(mut self, on: bool) -> Self {
        self.highlight = on;
        self
    }
}

/// Spans placed at a screen position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub col: u16,
    pub row: u16,
    pub spans: Vec<Span>,
}

impl Line {
    fn single(col: u16, row: u16, span: Span) -> Self {
        Self {
            col,
            row,
            spans: vec![span],
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// One full screen of output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<Line>,
}

impl Frame {
    fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// Text of every line on `row`, left to right.
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        let mut on_row: Vec<&Line> = self.lines.iter().filter(|l| l.row == row).collect();
        on_row.sort_by_key(|l| l.col);
        on_row.iter().map(|l| l.text()).collect::<Vec<_>>().join(" ")
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.text().contains(needle))
    }
}

/// Build the frame for the current model state.
#[must_use]
pub fn render(model: &TuiModel) -> Frame {
    let mut frame = Frame::default();
    let (cols, rows) = model.terminal_size;

    let Some(layout) = model.layout() else {
        render_too_small(&mut frame, cols, rows);
        return frame;
    };

    let view = model.controller.view();
    render_title(&mut frame, &layout, cols, view.eligible);
    if model.help_open {
        render_help(&mut frame, &layout);
    } else {
        render_prompt(&mut frame, &layout, model, &view);
    }
    render_grid(&mut frame, &layout.grid, model, &view);

    if let Some(notice) = &model.notice {
        let row = layout.grid.rect.row.saturating_sub(1);
        frame.push(centered(cols, row, Span::new(notice.clone(), SemanticToken::Warning)));
    }
    if model.display.show_hints {
        frame.push(centered(
            cols,
            layout.hint_row,
            Span::new(KEY_HINT, SemanticToken::Hint),
        ));
    }
    frame
}

fn render_too_small(frame: &mut Frame, cols: u16, rows: u16) {
    let mid = rows / 2;
    frame.push(centered(
        cols,
        mid.saturating_sub(1),
        Span::new("Terminal too small", SemanticToken::Warning),
    ));
    frame.push(centered(
        cols,
        mid,
        Span::new(
            format!("need {MIN_USABLE_COLS}x{MIN_USABLE_ROWS}, have {cols}x{rows}"),
            SemanticToken::Muted,
        ),
    ));
    frame.push(centered(
        cols,
        mid.saturating_add(1),
        Span::new("q to quit", SemanticToken::Hint),
    ));
}

fn render_title(frame: &mut Frame, layout: &ScreenLayout, cols: u16, eligible: usize) {
    frame.push(Line::single(
        1,
        layout.title_row,
        Span::new("prompt-grid", SemanticToken::Title),
    ));
    let count = format!("{eligible} eligible");
    let col = cols.saturating_sub(text_width(&count) + 1);
    frame.push(Line::single(
        col,
        layout.title_row,
        Span::new(count, SemanticToken::Muted),
    ));
}

fn render_prompt(frame: &mut Frame, layout: &ScreenLayout, model: &TuiModel, view: &DeckView<'_>) {
    let area = layout.prompt;
    let width = area.col.saturating_mul(2).saturating_add(area.width);

    let Some(record) = view.current else {
        let row = area.row + area.height / 2;
        frame.push(centered(width, row, Span::new(EMPTY_MESSAGE, SemanticToken::Muted)));
        return;
    };

    let caption = format!(
        "{} · {}",
        record.category.as_str().to_uppercase(),
        model.level_label(record.level)
    );
    let mut text_lines = wrap_text(&record.text, area.width);
    let hints = usize::from(model.display.show_hints);
    // Keep caption (and hint) visible; truncate the body if the area is short.
    let budget = usize::from(area.height).saturating_sub(2 + hints * 2).max(1);
    clamp_lines(&mut text_lines, budget, area.width);

    let block = u16::try_from(text_lines.len() + 2 + hints * 2).unwrap_or(area.height);
    let mut row = area.row + area.height.saturating_sub(block) / 2;
    for text in text_lines {
        frame.push(centered(width, row, Span::new(text, SemanticToken::Prompt)));
        row += 1;
    }
    row += 1;
    frame.push(centered(width, row, Span::new(caption, SemanticToken::Caption)));
    if hints > 0 {
        frame.push(centered(width, row + 2, Span::new(SURFACE_HINT, SemanticToken::Hint)));
    }
}

fn render_help(frame: &mut Frame, layout: &ScreenLayout) {
    let area = layout.prompt;
    frame.push(Line::single(
        area.col,
        area.row,
        Span::new("Keys", SemanticToken::Title),
    ));
    let key_width = help_bindings()
        .iter()
        .map(|b| text_width(b.keys))
        .max()
        .unwrap_or(0);
    for (row, binding) in (area.row + 1..area.row + area.height).zip(help_bindings()) {
        let pad = usize::from(key_width);
        frame.push(Line {
            col: area.col,
            row,
            spans: vec![
                Span::new(format!("{:<pad$}  ", binding.keys), SemanticToken::Header),
                Span::new(binding.description, SemanticToken::Neutral),
            ],
        });
    }
}

fn render_grid(frame: &mut Frame, grid: &GridGeometry, model: &TuiModel, view: &DeckView<'_>) {
    let cursor = (model.focus == Focus::Grid).then_some(model.cursor);
    let at_cursor = |col: usize, row: usize| cursor.is_some_and(|c| c.col == col && c.row == row);
    let cell_width = usize::from(grid.cell_width);
    let header_width = usize::from(grid.header_width);

    for (idx, (category, state)) in view.columns.iter().enumerate() {
        let label = format!("{:^cell_width$}", category.as_str());
        frame.push(Line::single(
            grid.category_col(idx),
            grid.rect.row,
            Span::new(label, line_token(*state)).highlighted(at_cursor(idx + 1, 0)),
        ));
    }

    for (row_idx, (level, state)) in view.rows.iter().enumerate() {
        let row = grid.level_row(row_idx);
        let label = format!(" {:<width$}", model.level_label(*level), width = header_width - 1);
        frame.push(Line::single(
            grid.rect.col,
            row,
            Span::new(label, line_token(*state)).highlighted(at_cursor(0, row_idx + 1)),
        ));

        for (col_idx, category) in view.categories.iter().enumerate() {
            let highlight = at_cursor(col_idx + 1, row_idx + 1);
            let span = match view.cell(category, *level) {
                Some(cell) if cell.active => Span::new(
                    format!("{ACTIVE_MARK:^cell_width$}"),
                    SemanticToken::Active,
                ),
                Some(_) => Span::new(
                    format!("{INACTIVE_MARK:^cell_width$}"),
                    SemanticToken::Inactive,
                ),
                None => Span::new(" ".repeat(cell_width), SemanticToken::Muted),
            };
            frame.push(Line::single(
                grid.category_col(col_idx),
                row,
                span.highlighted(highlight),
            ));
        }
    }
}

const fn line_token(state: LineState) -> SemanticToken {
    match state {
        LineState::All | LineState::Mixed => SemanticToken::Header,
        LineState::None | LineState::Empty => SemanticToken::Muted,
    }
}

fn centered(width: u16, row: u16, span: Span) -> Line {
    let col = width.saturating_sub(text_width(&span.text)) / 2;
    Line::single(col, row, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category, Level, PromptRecord};
    use crate::engine::controller::{Controller, SessionOptions};
    use crate::tui::model::{DisplayOptions, GridCursor};

    fn model() -> TuiModel {
        let catalog = Catalog::with_enumerations(
            vec![
                PromptRecord::new("T1", "question", 1),
                PromptRecord::new("T2", "question", 2),
                PromptRecord::new("T3", "physical", 1),
            ],
            None,
            Some(vec![Level::new(1), Level::new(2), Level::new(3)]),
        )
        .unwrap();
        let controller = Controller::start(
            catalog,
            &SessionOptions {
                seed: Some(8),
                ..SessionOptions::default()
            },
        )
        .unwrap();
        TuiModel::new(controller, DisplayOptions::default(), (80, 24))
    }

    #[test]
    fn shows_prompt_caption_and_hint() {
        let m = model();
        let frame = render(&m);
        let record = m.controller.current().unwrap();
        assert!(frame.contains(&record.text));
        let caption = format!("{} · Level {}", record.category.as_str().to_uppercase(), record.level);
        assert!(frame.contains(&caption));
        assert!(frame.contains(SURFACE_HINT));
        assert!(frame.contains("3 eligible"));
    }

    #[test]
    fn empty_selection_shows_message() {
        let mut m = model();
        m.controller.toggle_row(Level::new(1));
        m.controller.toggle_row(Level::new(2));
        let frame = render(&m);
        assert!(frame.contains(EMPTY_MESSAGE));
        assert!(!frame.contains(SURFACE_HINT));
    }

    #[test]
    fn grid_marks_active_inactive_and_missing() {
        let mut m = model();
        m.controller
            .toggle_cell(&Category::from("question"), Level::new(2));
        let frame = render(&m);
        let grid = m.layout().unwrap().grid;

        let row1 = frame.row_text(grid.level_row(0));
        assert_eq!(row1.matches(ACTIVE_MARK).count(), 2);

        let row2 = frame.row_text(grid.level_row(1));
        assert_eq!(row2.matches(INACTIVE_MARK).count(), 1);
        assert_eq!(row2.matches(ACTIVE_MARK).count(), 0);

        let row3 = frame.row_text(grid.level_row(2));
        assert!(row3.contains("Level 3"));
        assert!(!row3.contains(ACTIVE_MARK) && !row3.contains(INACTIVE_MARK));

        let header = frame.row_text(grid.rect.row);
        assert!(header.contains("question") && header.contains("physical"));
    }

    #[test]
    fn cursor_highlight_only_with_grid_focus() {
        let mut m = model();
        let highlighted = |frame: &Frame| {
            frame
                .lines
                .iter()
                .flat_map(|l| &l.spans)
                .filter(|s| s.highlight)
                .count()
        };
        assert_eq!(highlighted(&render(&m)), 0);
        m.focus = Focus::Grid;
        m.cursor = GridCursor { col: 0, row: 2 };
        let frame = render(&m);
        assert_eq!(highlighted(&frame), 1);
        let span = frame
            .lines
            .iter()
            .flat_map(|l| &l.spans)
            .find(|s| s.highlight)
            .unwrap();
        assert!(span.text.contains("Level 2"));
    }

    #[test]
    fn too_small_terminal_renders_notice_only() {
        let mut m = model();
        m.terminal_size = (30, 10);
        let frame = render(&m);
        assert!(frame.contains("Terminal too small"));
        assert!(!frame.contains(ACTIVE_MARK));
    }

    #[test]
    fn help_overlay_replaces_prompt() {
        let mut m = model();
        m.help_open = true;
        let frame = render(&m);
        assert!(frame.contains("Keys"));
        assert!(frame.contains("quit"));
        assert!(!frame.contains(SURFACE_HINT));
    }

    #[test]
    fn hints_can_be_disabled() {
        let mut m = model();
        m.display.show_hints = false;
        let frame = render(&m);
        assert!(!frame.contains(SURFACE_HINT));
        assert!(!frame.contains("?: help"));
    }

    #[test]
    fn long_prompt_on_minimum_terminal_is_marked_as_cut() {
        let long = "If you could spend one whole day inside any book you have ever read, \
                    which one would you choose and what would you do first?";
        let catalog = Catalog::with_enumerations(
            vec![PromptRecord::new(long, "question", 1)],
            None,
            Some(vec![Level::new(1), Level::new(2), Level::new(3)]),
        )
        .unwrap();
        let controller = Controller::start(catalog, &SessionOptions::default()).unwrap();
        let m = TuiModel::new(controller, DisplayOptions::default(), (40, 12));
        let frame = render(&m);

        assert!(!frame.contains(long));
        assert!(frame.contains("QUESTION · Level 1"));
        let prompt_lines: Vec<&Line> = frame
            .lines
            .iter()
            .filter(|l| l.spans.iter().any(|s| s.token == SemanticToken::Prompt))
            .collect();
        assert!(!prompt_lines.is_empty());
        assert!(prompt_lines.last().unwrap().text().ends_with('…'));
        assert!(prompt_lines.iter().all(|l| text_width(&l.text()) <= 40));
    }

    #[test]
    fn notice_is_rendered_above_grid() {
        let mut m = model();
        m.notice = Some("combo physical:2 has no prompts".to_string());
        let frame = render(&m);
        let grid = m.layout().unwrap().grid;
        assert!(frame.row_text(grid.rect.row - 1).contains("has no prompts"));
    }

    #[test]
    fn custom_level_label_is_used() {
        let mut m = model();
        m.display.level_label = "Heat".to_string();
        let frame = render(&m);
        assert!(frame.contains("Heat 1"));
        assert!(frame.contains("· Heat "));
    }
}
