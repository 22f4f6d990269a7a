//! Property-based tests for engine invariants.
//!
//! Uses `proptest` to drive arbitrary action sequences through the
//! controller and check that the filter never leaves the universe, bulk
//! toggles never leave a line mixed, and the selection always matches the
//! post-mutation filter.

use proptest::prelude::*;

use super::controller::{Action, Controller, Dispatch, SessionOptions};
use super::filter::{FilterState, LineState};
use crate::catalog::{Catalog, Category, ComboKey, Level, PromptRecord};

// ──────────────────── fixtures ────────────────────

const CATEGORIES: [&str; 3] = ["question", "physical", "creative"];
const LEVELS: [u32; 3] = [1, 2, 3];

/// 3 × 3 grid with two holes (physical:3, creative:1).
fn catalog() -> Catalog {
    let mut records = Vec::new();
    for category in CATEGORIES {
        for level in LEVELS {
            if (category, level) == ("physical", 3) || (category, level) == ("creative", 1) {
                continue;
            }
            for n in 0..2 {
                records.push(PromptRecord::new(
                    format!("{category}-{level}-{n}"),
                    category,
                    level,
                ));
            }
        }
    }
    Catalog::with_enumerations(
        records,
        Some(CATEGORIES.iter().map(|c| Category::from(*c)).collect()),
        Some(LEVELS.iter().map(|l| Level::new(*l)).collect()),
    )
    .unwrap()
}

// ──────────────────── strategies ────────────────────

fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(CATEGORIES.to_vec()).prop_map(Category::from)
}

fn arb_level() -> impl Strategy<Value = Level> {
    prop::sample::select(LEVELS.to_vec()).prop_map(Level::new)
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Activate),
        (arb_category(), arb_level())
            .prop_map(|(category, level)| Action::ToggleCell(ComboKey { category, level })),
        arb_level().prop_map(Action::ToggleRow),
        arb_category().prop_map(Action::ToggleColumn),
    ]
}

fn controller(seed: u64) -> Controller {
    Controller::start(
        catalog(),
        &SessionOptions {
            seed: Some(seed),
            ..SessionOptions::default()
        },
    )
    .unwrap()
}

fn assert_selection_consistent(controller: &Controller) {
    let filter = controller.filter();
    let eligible = controller
        .catalog()
        .records()
        .iter()
        .filter(|r| filter.is_cell_active(&r.category, r.level))
        .count();
    assert_eq!(controller.eligible_count(), eligible);
    match controller.current() {
        Some(record) => {
            assert!(filter.is_cell_active(&record.category, record.level));
        }
        None => assert_eq!(eligible, 0),
    }
}

// ──────────────────── properties ────────────────────

proptest! {
    #[test]
    fn selection_always_matches_filter(
        seed in any::<u64>(),
        actions in prop::collection::vec(arb_action(), 0..60),
    ) {
        let mut controller = controller(seed);
        assert_selection_consistent(&controller);
        for action in actions {
            controller.dispatch(action);
            assert_selection_consistent(&controller);
        }
    }

    #[test]
    fn filter_stays_inside_universe(
        actions in prop::collection::vec(arb_action(), 0..60),
    ) {
        let mut controller = controller(0);
        for action in actions {
            controller.dispatch(action);
            let grid = controller.filter().grid();
            for key in controller.filter().active() {
                prop_assert!(grid.contains(key));
            }
        }
    }

    #[test]
    fn row_toggle_leaves_row_uniform(
        actions in prop::collection::vec(arb_action(), 0..40),
        level in arb_level(),
    ) {
        let mut controller = controller(1);
        for action in actions {
            controller.dispatch(action);
        }
        controller.toggle_row(level);
        let state = controller.filter().row_state(level);
        prop_assert!(matches!(state, LineState::All | LineState::None | LineState::Empty));
    }

    #[test]
    fn column_toggle_leaves_column_uniform(
        actions in prop::collection::vec(arb_action(), 0..40),
        category in arb_category(),
    ) {
        let mut controller = controller(2);
        for action in actions {
            controller.dispatch(action);
        }
        controller.toggle_column(&category);
        let state = controller.filter().column_state(&category);
        prop_assert!(matches!(state, LineState::All | LineState::None | LineState::Empty));
    }

    #[test]
    fn double_row_toggle_restores_uniform_row(
        actions in prop::collection::vec(arb_action(), 0..40),
        level in arb_level(),
    ) {
        let mut controller = controller(3);
        for action in actions {
            controller.dispatch(action);
        }
        // Normalize the row first so it starts uniform.
        controller.toggle_row(level);
        let before: FilterState = controller.filter().clone();
        controller.toggle_row(level);
        controller.toggle_row(level);
        prop_assert_eq!(controller.filter(), &before);
    }

    #[test]
    fn missing_combos_are_never_toggled_by_dispatch(
        actions in prop::collection::vec(arb_action(), 0..60),
    ) {
        let mut controller = controller(4);
        let holes = [ComboKey::new("physical", 3), ComboKey::new("creative", 1)];
        for action in actions {
            let outcome = controller.dispatch(action.clone());
            if let Action::ToggleCell(key) = &action
                && holes.contains(key)
            {
                prop_assert!(matches!(outcome, Dispatch::Refused(_)));
            }
            for hole in &holes {
                prop_assert!(controller.filter().is_active(hole));
            }
        }
    }
}
