//! Filter state: the set of enabled (category, level) combos.
//!
//! The set always stays inside the grid's universe. It starts full and is
//! mutated only through [`FilterState::toggle_cell`],
//! [`FilterState::toggle_row`] and [`FilterState::toggle_column`].
//!
//! Row and column toggles follow an "all on → clear, otherwise → set" policy
//! over the *existing* combos of that line. Each bulk toggle is two-phase:
//! the targets and the `all_on` verdict are computed first, then applied in
//! one pass, so a partially applied line is never observable.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::catalog::{Category, ComboGrid, ComboKey, Level};

/// Aggregate membership of a row or column, over existing combos only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Every existing combo in the line is active.
    All,
    /// Some but not all existing combos are active.
    Mixed,
    /// No existing combo in the line is active.
    None,
    /// The line has no existing combos at all.
    Empty,
}

/// Result of a bulk row/column toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkToggle {
    /// The line was fully on and has been cleared.
    Cleared,
    /// The line was not fully on and has been set.
    Set,
    /// The line has no existing combos; nothing changed.
    NoOp,
}

/// The set of active combos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    grid: Arc<ComboGrid>,
    active: BTreeSet<ComboKey>,
}

impl FilterState {
    /// Every combo of the universe active, including combos without prompts.
    #[must_use]
    pub fn full(grid: Arc<ComboGrid>) -> Self {
        let active = grid.universe().collect();
        Self { grid, active }
    }

    #[must_use]
    pub fn grid(&self) -> &ComboGrid {
        &self.grid
    }

    #[must_use]
    pub fn is_active(&self, key: &ComboKey) -> bool {
        self.active.contains(key)
    }

    #[must_use]
    pub fn is_cell_active(&self, category: &Category, level: Level) -> bool {
        self.active.contains(&ComboKey {
            category: category.clone(),
            level,
        })
    }

    /// Active combos, in key order.
    pub fn active(&self) -> impl Iterator<Item = &ComboKey> {
        self.active.iter()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Flip membership of one combo. Works for combos without prompts too.
    ///
    /// Returns the new membership, or `None` when the key is outside the
    /// universe (unknown category or level), in which case nothing changes.
    pub fn toggle_cell(&mut self, category: &Category, level: Level) -> Option<bool> {
        let key = ComboKey {
            category: category.clone(),
            level,
        };
        if !self.grid.contains(&key) {
            return None;
        }
        if self.active.remove(&key) {
            Some(false)
        } else {
            self.active.insert(key);
            Some(true)
        }
    }

    /// Bulk-toggle every existing combo at `level`.
    pub fn toggle_row(&mut self, level: Level) -> BulkToggle {
        let targets = self.grid.existing_in_row(level);
        self.apply_bulk(targets)
    }

    /// Bulk-toggle every existing combo in `category`.
    pub fn toggle_column(&mut self, category: &Category) -> BulkToggle {
        let targets = self.grid.existing_in_column(category);
        self.apply_bulk(targets)
    }

    #[must_use]
    pub fn row_state(&self, level: Level) -> LineState {
        self.line_state(&self.grid.existing_in_row(level))
    }

    #[must_use]
    pub fn column_state(&self, category: &Category) -> LineState {
        self.line_state(&self.grid.existing_in_column(category))
    }

    fn line_state(&self, keys: &[ComboKey]) -> LineState {
        if keys.is_empty() {
            return LineState::Empty;
        }
        let on = keys.iter().filter(|key| self.active.contains(key)).count();
        if on == keys.len() {
            LineState::All
        } else if on == 0 {
            LineState::None
        } else {
            LineState::Mixed
        }
    }

    fn apply_bulk(&mut self, targets: Vec<ComboKey>) -> BulkToggle {
        // Phase 1: decide against the untouched set.
        if targets.is_empty() {
            return BulkToggle::NoOp;
        }
        let all_on = targets.iter().all(|key| self.active.contains(key));

        // Phase 2: apply.
        if all_on {
            for key in &targets {
                self.active.remove(key);
            }
            BulkToggle::Cleared
        } else {
            self.active.extend(targets);
            BulkToggle::Set
        }
    }
}
