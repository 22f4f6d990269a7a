//! Interaction controller: the single owner of the filter state and the
//! current selection.
//!
//! Every [`Action`] is handled to completion inside [`Controller::dispatch`]:
//! the filter is mutated (if the action calls for it) and a fresh draw is made
//! over the post-mutation filter before the call returns. The current
//! selection therefore never reflects a stale filter.

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::filter::{BulkToggle, FilterState, LineState};
use super::selector::{draw, filtered_indices};
use crate::catalog::{Catalog, Category, ComboKey, Level, PromptRecord};
use crate::core::errors::{PgError, Result};

/// A discrete user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Redraw over the unchanged filter (surface click, Enter, Space).
    Activate,
    /// Flip one existing combo, then redraw.
    ToggleCell(ComboKey),
    /// Bulk-toggle a level row, then redraw.
    ToggleRow(Level),
    /// Bulk-toggle a category column, then redraw.
    ToggleColumn(Category),
}

impl Action {
    /// Stable short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::ToggleCell(_) => "toggle_cell",
            Self::ToggleRow(_) => "toggle_row",
            Self::ToggleColumn(_) => "toggle_column",
        }
    }
}

/// What a dispatched action did to the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Activate: the filter was left as is.
    Unchanged,
    /// One combo flipped; `active` is its new membership.
    Cell { active: bool },
    /// A row or column toggle set or cleared its line.
    Bulk(BulkToggle),
}

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// The combo is in the universe but has no prompts; such cells are not
    /// interactive.
    MissingCombo(ComboKey),
    /// The category or level is not part of the grid at all.
    OutsideGrid(ComboKey),
    /// Row toggle for a level the grid does not have.
    UnknownLevel(Level),
    /// Column toggle for a category the grid does not have.
    UnknownCategory(Category),
}

impl Refusal {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::MissingCombo(key) => format!("combo {key} has no prompts"),
            Self::OutsideGrid(key) => format!("combo {key} is not on the grid"),
            Self::UnknownLevel(level) => format!("level {level} is not on the grid"),
            Self::UnknownCategory(category) => format!("category {category} is not on the grid"),
        }
    }
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The filter was (possibly) mutated and a new draw was made.
    Redrawn {
        mutation: Mutation,
        eligible: usize,
        selected: Option<usize>,
    },
    /// The action violated the controller contract; nothing changed.
    Refused(Refusal),
}

/// Startup knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Combos switched off before the startup draw.
    pub initially_disabled: Vec<ComboKey>,
}

/// Counters for the end-of-session summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Draws made, the startup draw included.
    pub draws: u64,
    /// Accepted cell, row and column toggles.
    pub toggles: u64,
    /// Draws that found no eligible prompt.
    pub empty_draws: u64,
    /// Actions refused without touching the filter.
    pub refused: u64,
}

/// Per-cell presentation data for an existing combo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    /// The combo this cell shows.
    pub key: ComboKey,
    /// Whether the combo is in the filter.
    pub active: bool,
    /// Number of prompts filed under the combo.
    pub prompts: usize,
}

/// Everything presentation needs for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckView<'a> {
    /// Column order.
    pub categories: &'a [Category],
    /// Row order.
    pub levels: &'a [Level],
    /// Existing combos only, category-major.
    pub cells: Vec<CellView>,
    /// Aggregate state of each level row, in row order.
    pub rows: Vec<(Level, LineState)>,
    /// Aggregate state of each category column, in column order.
    pub columns: Vec<(Category, LineState)>,
    /// The selected prompt, `None` when nothing is eligible.
    pub current: Option<&'a PromptRecord>,
    /// Prompts passing the filter.
    pub eligible: usize,
}

impl DeckView<'_> {
    /// Cell data for `(category, level)`; `None` for combos without prompts.
    #[must_use]
    pub fn cell(&self, category: &Category, level: Level) -> Option<&CellView> {
        self.cells
            .iter()
            .find(|cell| cell.key.category == *category && cell.key.level == level)
    }
}

/// Owner of the filter state and the current selection.
#[derive(Debug)]
pub struct Controller {
    catalog: Catalog,
    filter: FilterState,
    current: Option<usize>,
    eligible: usize,
    rng: StdRng,
    stats: SessionStats,
}

impl Controller {
    /// Startup transition: full filter (minus `initially_disabled`), then one
    /// draw.
    pub fn start(catalog: Catalog, options: &SessionOptions) -> Result<Self> {
        let rng = options
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let mut filter = FilterState::full(catalog.shared_grid());
        for key in &options.initially_disabled {
            if !filter.grid().contains(key) {
                return Err(PgError::InvalidConfig {
                    details: format!("initially disabled combo {key} is not on the grid"),
                });
            }
            if filter.is_active(key) {
                filter.toggle_cell(&key.category, key.level);
            }
        }

        let mut controller = Self {
            catalog,
            filter,
            current: None,
            eligible: 0,
            rng,
            stats: SessionStats::default(),
        };
        controller.redraw();
        Ok(controller)
    }

    /// Apply one action and redraw.
    pub fn dispatch(&mut self, action: Action) -> Dispatch {
        let mutation = match &action {
            Action::Activate => Mutation::Unchanged,
            Action::ToggleCell(key) => {
                let grid = self.filter.grid();
                if !grid.contains(key) {
                    return self.refuse(Refusal::OutsideGrid(key.clone()));
                }
                if !grid.exists(&key.category, key.level) {
                    return self.refuse(Refusal::MissingCombo(key.clone()));
                }
                match self.filter.toggle_cell(&key.category, key.level) {
                    Some(active) => Mutation::Cell { active },
                    None => return self.refuse(Refusal::OutsideGrid(key.clone())),
                }
            }
            Action::ToggleRow(level) => {
                if !self.filter.grid().has_level(*level) {
                    return self.refuse(Refusal::UnknownLevel(*level));
                }
                Mutation::Bulk(self.filter.toggle_row(*level))
            }
            Action::ToggleColumn(category) => {
                if !self.filter.grid().has_category(category) {
                    return self.refuse(Refusal::UnknownCategory(category.clone()));
                }
                Mutation::Bulk(self.filter.toggle_column(category))
            }
        };

        if mutation != Mutation::Unchanged {
            self.stats.toggles += 1;
        }
        self.redraw();
        Dispatch::Redrawn {
            mutation,
            eligible: self.eligible,
            selected: self.current,
        }
    }

    /// Shorthand for dispatching [`Action::Activate`].
    pub fn activate(&mut self) -> Dispatch {
        self.dispatch(Action::Activate)
    }

    /// Shorthand for dispatching [`Action::ToggleCell`].
    pub fn toggle_cell(&mut self, category: &Category, level: Level) -> Dispatch {
        self.dispatch(Action::ToggleCell(ComboKey {
            category: category.clone(),
            level,
        }))
    }

    /// Shorthand for dispatching [`Action::ToggleRow`].
    pub fn toggle_row(&mut self, level: Level) -> Dispatch {
        self.dispatch(Action::ToggleRow(level))
    }

    /// Shorthand for dispatching [`Action::ToggleColumn`].
    pub fn toggle_column(&mut self, category: &Category) -> Dispatch {
        self.dispatch(Action::ToggleColumn(category.clone()))
    }

    /// The current selection, or `None` when no prompt is eligible.
    #[must_use]
    pub fn current(&self) -> Option<&PromptRecord> {
        self.current.and_then(|idx| self.catalog.get(idx))
    }

    /// Catalog index of the current selection.
    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Number of prompts eligible under the current filter.
    #[must_use]
    pub const fn eligible_count(&self) -> usize {
        self.eligible
    }

    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Snapshot for presentation.
    #[must_use]
    pub fn view(&self) -> DeckView<'_> {
        let grid = self.filter.grid();
        let cells = grid
            .existing()
            .map(|key| CellView {
                active: self.filter.is_active(&key),
                prompts: grid.count(&key.category, key.level),
                key,
            })
            .collect();
        DeckView {
            categories: self.catalog.categories(),
            levels: self.catalog.levels(),
            cells,
            rows: grid
                .levels()
                .iter()
                .map(|level| (*level, self.filter.row_state(*level)))
                .collect(),
            columns: grid
                .categories()
                .iter()
                .map(|category| (category.clone(), self.filter.column_state(category)))
                .collect(),
            current: self.current(),
            eligible: self.eligible,
        }
    }

    fn redraw(&mut self) {
        let eligible = filtered_indices(&self.catalog, &self.filter);
        self.eligible = eligible.len();
        self.current = draw(&mut self.rng, &eligible).copied();
        self.stats.draws += 1;
        if self.current.is_none() {
            self.stats.empty_draws += 1;
        }
    }

    fn refuse(&mut self, refusal: Refusal) -> Dispatch {
        self.stats.refused += 1;
        Dispatch::Refused(refusal)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::catalog::PromptRecord;

    fn scenario_catalog() -> Catalog {
        Catalog::with_enumerations(
            vec![
                PromptRecord::new("T1", "question", 1),
                PromptRecord::new("T2", "question", 2),
                PromptRecord::new("T3", "physical", 1),
            ],
            None,
            Some(vec![Level::new(1), Level::new(2), Level::new(3)]),
        )
        .unwrap()
    }

    fn seeded(seed: u64) -> Controller {
        Controller::start(
            scenario_catalog(),
            &SessionOptions {
                seed: Some(seed),
                ..SessionOptions::default()
            },
        )
        .unwrap()
    }

    fn current_text(controller: &Controller) -> Option<&str> {
        controller.current().map(|r| r.text.as_str())
    }

    fn q() -> Category {
        Category::from("question")
    }

    fn p() -> Category {
        Category::from("physical")
    }

    #[test]
    fn scenario_a_startup_draws_from_full_catalog() {
        let controller = seeded(1);
        assert_eq!(controller.filter().active_count(), 6);
        assert!(matches!(current_text(&controller), Some("T1" | "T2" | "T3")));
        assert_eq!(controller.stats().draws, 1);
        assert_eq!(controller.eligible_count(), 3);
    }

    #[test]
    fn scenario_b_and_c_narrow_to_t3_then_none() {
        for seed in 0..20 {
            let mut controller = seeded(seed);
            controller.toggle_cell(&q(), Level::new(1));
            controller.toggle_cell(&q(), Level::new(2));
            assert_eq!(current_text(&controller), Some("T3"));
            for _ in 0..5 {
                controller.activate();
                assert_eq!(current_text(&controller), Some("T3"));
            }

            let outcome = controller.toggle_cell(&p(), Level::new(1));
            assert_eq!(
                outcome,
                Dispatch::Redrawn {
                    mutation: Mutation::Cell { active: false },
                    eligible: 0,
                    selected: None,
                }
            );
            assert!(controller.current().is_none());
            controller.activate();
            assert!(controller.current().is_none());
        }
    }

    #[test]
    fn scenario_d_column_toggle_is_one_step() {
        let mut controller = seeded(3);
        let outcome = controller.toggle_column(&q());
        assert!(matches!(
            outcome,
            Dispatch::Redrawn {
                mutation: Mutation::Bulk(BulkToggle::Cleared),
                eligible: 1,
                ..
            }
        ));
        assert!(!controller.filter().is_cell_active(&q(), Level::new(1)));
        assert!(!controller.filter().is_cell_active(&q(), Level::new(2)));
        assert_eq!(current_text(&controller), Some("T3"));
    }

    #[test]
    fn selection_recovers_after_empty_state() {
        let mut controller = seeded(5);
        controller.toggle_row(Level::new(1));
        controller.toggle_row(Level::new(2));
        assert!(controller.current().is_none());
        controller.toggle_row(Level::new(2));
        assert_eq!(current_text(&controller), Some("T2"));
    }

    #[test]
    fn missing_combo_toggle_is_refused_without_redraw() {
        let mut controller = seeded(9);
        let before_filter = controller.filter().clone();
        let before_draws = controller.stats().draws;
        let outcome = controller.toggle_cell(&p(), Level::new(2));
        assert_eq!(
            outcome,
            Dispatch::Refused(Refusal::MissingCombo(ComboKey::new("physical", 2)))
        );
        assert_eq!(controller.filter(), &before_filter);
        assert_eq!(controller.stats().draws, before_draws);
        assert_eq!(controller.stats().refused, 1);
    }

    #[test]
    fn unknown_row_and_column_are_refused() {
        let mut controller = seeded(9);
        assert!(matches!(
            controller.toggle_row(Level::new(7)),
            Dispatch::Refused(Refusal::UnknownLevel(_))
        ));
        assert!(matches!(
            controller.toggle_column(&Category::from("dare")),
            Dispatch::Refused(Refusal::UnknownCategory(_))
        ));
        assert!(matches!(
            controller.dispatch(Action::ToggleCell(ComboKey::new("dare", 1))),
            Dispatch::Refused(Refusal::OutsideGrid(_))
        ));
    }

    #[test]
    fn every_toggle_redraws_even_when_selection_still_valid() {
        let mut controller = seeded(11);
        let before = controller.stats().draws;
        // Toggling a row with no prompts changes nothing but still redraws.
        controller.toggle_row(Level::new(3));
        assert_eq!(controller.stats().draws, before + 1);
    }

    #[test]
    fn activate_covers_all_eligible_prompts() {
        let mut controller = seeded(13);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            controller.activate();
            seen.insert(current_text(&controller).unwrap().to_string());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn initially_disabled_applied_before_startup_draw() {
        let controller = Controller::start(
            scenario_catalog(),
            &SessionOptions {
                seed: Some(2),
                initially_disabled: vec![ComboKey::new("question", 1), ComboKey::new("question", 2)],
            },
        )
        .unwrap();
        assert_eq!(current_text(&controller), Some("T3"));
        assert_eq!(controller.stats().draws, 1);
    }

    #[test]
    fn initially_disabled_outside_grid_rejected() {
        let err = Controller::start(
            scenario_catalog(),
            &SessionOptions {
                seed: None,
                initially_disabled: vec![ComboKey::new("dare", 1)],
            },
        )
        .unwrap_err();
        assert_eq!(err.code(), "PGR-1001");
    }

    #[test]
    fn view_lists_existing_cells_and_line_states() {
        let mut controller = seeded(4);
        controller.toggle_cell(&q(), Level::new(1));
        let view = controller.view();
        assert_eq!(view.cells.len(), 3);
        assert!(view.cell(&p(), Level::new(2)).is_none());
        assert!(!view.cell(&q(), Level::new(1)).unwrap().active);
        assert_eq!(view.rows[0], (Level::new(1), LineState::Mixed));
        assert_eq!(view.rows[2], (Level::new(3), LineState::Empty));
        assert_eq!(view.columns[0], (q(), LineState::Mixed));
        assert_eq!(view.eligible, 2);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = seeded(99);
        let mut b = seeded(99);
        for _ in 0..20 {
            a.activate();
            b.activate();
            assert_eq!(a.current_index(), b.current_index());
        }
    }
}
