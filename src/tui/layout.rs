//! Screen geometry for the prompt surface and the filter grid.
//!
//! The layout is a pure function of terminal size and grid dimensions, so the
//! renderer and the mouse hit-tester always agree on where things are.

#![allow(missing_docs)]

/// Minimum terminal width below which the UI shows a "too small" message.
pub const MIN_USABLE_COLS: u16 = 40;
/// Minimum terminal height below which the UI shows a "too small" message.
pub const MIN_USABLE_ROWS: u16 = 12;

/// Narrowest cell, wide enough for a centered mark with padding.
const MIN_CELL_WIDTH: u16 = 5;

/// Returns `true` if the terminal is below the minimum usable size.
#[must_use]
pub const fn is_terminal_too_small(cols: u16, rows: u16) -> bool {
    cols < MIN_USABLE_COLS || rows < MIN_USABLE_ROWS
}

/// Minimal rectangular placement metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneRect {
    pub col: u16,
    pub row: u16,
    pub width: u16,
    pub height: u16,
}

impl PaneRect {
    #[must_use]
    pub const fn new(col: u16, row: u16, width: u16, height: u16) -> Self {
        Self {
            col,
            row,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn contains(self, col: u16, row: u16) -> bool {
        col >= self.col
            && row >= self.row
            && col < self.col.saturating_add(self.width)
            && row < self.row.saturating_add(self.height)
    }
}

/// What a screen position maps to inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Indices into the category and level enumerations.
    Cell { category: usize, level: usize },
    RowHeader(usize),
    ColumnHeader(usize),
    /// Top-left corner; inert.
    Corner,
}

/// Grid geometry: one header row, one header column, then one cell per
/// (category, level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub rect: PaneRect,
    pub header_width: u16,
    pub cell_width: u16,
    pub categories: usize,
    pub levels: usize,
}

impl GridGeometry {
    /// Column where the header of `category` (and its cells) starts.
    #[must_use]
    pub fn category_col(&self, category: usize) -> u16 {
        let offset = u16::try_from(category).unwrap_or(u16::MAX);
        self.rect
            .col
            .saturating_add(self.header_width)
            .saturating_add(offset.saturating_mul(self.cell_width))
    }

    /// Screen row of `level`'s cells.
    #[must_use]
    pub fn level_row(&self, level: usize) -> u16 {
        let offset = u16::try_from(level).unwrap_or(u16::MAX);
        self.rect.row.saturating_add(1).saturating_add(offset)
    }

    /// Map a screen position to a grid element.
    #[must_use]
    pub fn hit_test(&self, col: u16, row: u16) -> Option<HitTarget> {
        if !self.rect.contains(col, row) {
            return None;
        }
        let dx = col - self.rect.col;
        let dy = row - self.rect.row;

        let category = if dx < self.header_width {
            None
        } else {
            let idx = usize::from((dx - self.header_width) / self.cell_width.max(1));
            if idx >= self.categories {
                return None;
            }
            Some(idx)
        };
        let level = if dy == 0 {
            None
        } else {
            let idx = usize::from(dy - 1);
            if idx >= self.levels {
                return None;
            }
            Some(idx)
        };

        Some(match (category, level) {
            (Some(category), Some(level)) => HitTarget::Cell { category, level },
            (None, Some(level)) => HitTarget::RowHeader(level),
            (Some(category), None) => HitTarget::ColumnHeader(category),
            (None, None) => HitTarget::Corner,
        })
    }
}

/// Full-screen layout plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub title_row: u16,
    /// Area for the prompt text and its caption.
    pub prompt: PaneRect,
    pub grid: GridGeometry,
    pub hint_row: u16,
}

/// Build the layout for a `cols` × `rows` terminal.
///
/// `category_names` and `row_labels` are the exact header strings the
/// renderer will print. Returns `None` when the terminal is too small or the
/// grid cannot fit.
#[must_use]
pub fn build_layout(
    cols: u16,
    rows: u16,
    category_names: &[&str],
    row_labels: &[String],
) -> Option<ScreenLayout> {
    if is_terminal_too_small(cols, rows) {
        return None;
    }

    let header_width = row_labels
        .iter()
        .map(|label| text_width(label))
        .max()
        .unwrap_or(0)
        .saturating_add(2);
    let cell_width = category_names
        .iter()
        .map(|name| text_width(name))
        .max()
        .unwrap_or(0)
        .saturating_add(2)
        .max(MIN_CELL_WIDTH);

    let n_categories = u16::try_from(category_names.len()).ok()?;
    let n_levels = u16::try_from(row_labels.len()).ok()?;
    let grid_width = header_width.checked_add(n_categories.checked_mul(cell_width)?)?;
    let grid_height = n_levels.checked_add(1)?;
    if grid_width > cols {
        return None;
    }

    // title, gap, prompt (>= 3 rows), gap, grid, gap, hint
    let hint_row = rows - 1;
    let grid_row = hint_row.checked_sub(1 + grid_height)?;
    let prompt_row = 2;
    let prompt_height = grid_row.checked_sub(prompt_row + 1)?;
    if prompt_height < 3 {
        return None;
    }

    Some(ScreenLayout {
        title_row: 0,
        prompt: PaneRect::new(2, prompt_row, cols.saturating_sub(4), prompt_height),
        grid: GridGeometry {
            rect: PaneRect::new((cols - grid_width) / 2, grid_row, grid_width, grid_height),
            header_width,
            cell_width,
            categories: category_names.len(),
            levels: row_labels.len(),
        },
        hint_row,
    })
}

/// Display width of `text` in terminal columns (one per char).
#[must_use]
pub fn text_width(text: &str) -> u16 {
    u16::try_from(text.chars().count()).unwrap_or(u16::MAX)
}

/// Wrap `text` at word boundaries into lines no wider than `width`.
#[must_use]
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > width {
            // Hard-break words that cannot fit on any line.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(width).map(|c| c.iter().collect::<String>());
            let last = chunks.next_back().unwrap_or_default();
            lines.extend(chunks);
            current = last;
            continue;
        }
        let needed = if current.is_empty() {
            word_len
        } else {
            current.chars().count() + 1 + word_len
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cut `lines` to at most `max` entries, marking the cut with an ellipsis on
/// the last kept line so it still fits in `width`.
pub fn clamp_lines(lines: &mut Vec<String>, max: usize, width: u16) {
    if lines.len() <= max {
        return;
    }
    lines.truncate(max.max(1));
    if let Some(last) = lines.last_mut() {
        let keep = usize::from(width.max(1)).saturating_sub(1);
        let mut cut: String = last.chars().take(keep).collect();
        cut.truncate(cut.trim_end().len());
        cut.push('…');
        *last = cut;
    }
}
