//! Pure update function for the Elm-style prompt grid UI.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//!
//! Every physical event dispatches at most one controller action: a click
//! that lands on a cell or header toggles it and never also draws through the
//! surface.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::input::{InputAction, InputContext, resolve_key_event};
use super::layout::HitTarget;
use super::model::{Focus, GridCursor, TuiCmd, TuiModel, TuiMsg};
use crate::engine::controller::{Action, Dispatch};
use crate::logger::activity::events_for_dispatch;

/// Apply a message to the model and return the next command for the runtime.
pub fn update(model: &mut TuiModel, msg: TuiMsg) -> TuiCmd {
    match msg {
        TuiMsg::Key(key) => {
            let context = InputContext {
                help_open: model.help_open,
            };
            resolve_key_event(&key, context)
                .action
                .map_or(TuiCmd::None, |action| apply_input_action(model, action))
        }
        TuiMsg::Mouse(event) => handle_mouse_event(model, event),
        TuiMsg::Resize { cols, rows } => {
            model.terminal_size = (cols, rows);
            TuiCmd::None
        }
    }
}

fn apply_input_action(model: &mut TuiModel, action: InputAction) -> TuiCmd {
    match action {
        InputAction::Quit => {
            model.quit = true;
            TuiCmd::Quit
        }
        InputAction::ToggleHelp => {
            model.help_open = !model.help_open;
            TuiCmd::None
        }
        InputAction::CloseHelp => {
            model.help_open = false;
            TuiCmd::None
        }
        InputAction::SwitchFocus => {
            model.focus = match model.focus {
                Focus::Surface => Focus::Grid,
                Focus::Grid => Focus::Surface,
            };
            TuiCmd::None
        }
        InputAction::MoveCursor(direction) => {
            model.focus = Focus::Grid;
            let catalog = model.controller.catalog();
            let (categories, levels) = (catalog.categories().len(), catalog.levels().len());
            model.cursor.step(direction, categories, levels);
            TuiCmd::None
        }
        InputAction::Press => match model.focus {
            Focus::Surface => dispatch(model, Action::Activate),
            Focus::Grid => press_cursor(model),
        },
        InputAction::Redraw => dispatch(model, Action::Activate),
    }
}

fn press_cursor(model: &mut TuiModel) -> TuiCmd {
    match model.grid_action(model.cursor.col, model.cursor.row) {
        Some(action) => dispatch(model, action),
        None => TuiCmd::None,
    }
}

/// Hand one action to the controller and describe the outcome for the log.
pub fn dispatch(model: &mut TuiModel, action: Action) -> TuiCmd {
    let outcome = model.controller.dispatch(action.clone());
    model.notice = match &outcome {
        Dispatch::Refused(refusal) => Some(refusal.describe()),
        Dispatch::Redrawn { .. } => None,
    };
    TuiCmd::Log(events_for_dispatch(&action, &outcome, &model.controller))
}

fn handle_mouse_event(model: &mut TuiModel, event: MouseEvent) -> TuiCmd {
    if event.kind != MouseEventKind::Down(MouseButton::Left) {
        return TuiCmd::None;
    }
    if model.help_open {
        model.help_open = false;
        return TuiCmd::None;
    }

    let target = model
        .layout()
        .and_then(|layout| layout.grid.hit_test(event.column, event.row));
    let cursor = match target {
        None => {
            model.focus = Focus::Surface;
            return dispatch(model, Action::Activate);
        }
        Some(HitTarget::Corner) => return TuiCmd::None,
        Some(HitTarget::Cell { category, level }) => GridCursor {
            col: category + 1,
            row: level + 1,
        },
        Some(HitTarget::RowHeader(level)) => GridCursor {
            col: 0,
            row: level + 1,
        },
        Some(HitTarget::ColumnHeader(category)) => GridCursor {
            col: category + 1,
            row: 0,
        },
    };
    model.focus = Focus::Grid;
    model.cursor = cursor;
    press_cursor(model)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::catalog::{Catalog, Category, Level, PromptRecord};
    use crate::engine::controller::{Controller, SessionOptions};
    use crate::logger::activity::ActivityEvent;
    use crate::tui::model::DisplayOptions;

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
                seed: Some(42),
                ..SessionOptions::default()
            },
        )
        .unwrap();
        TuiModel::new(controller, DisplayOptions::default(), (80, 24))
    }

    fn key(code: KeyCode) -> TuiMsg {
        TuiMsg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> TuiMsg {
        TuiMsg::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn current(model: &TuiModel) -> Option<&str> {
        model.controller.current().map(|r| r.text.as_str())
    }

    #[test]
    fn enter_on_surface_draws() {
        let mut m = model();
        let cmd = update(&mut m, key(KeyCode::Enter));
        assert!(matches!(cmd, TuiCmd::Log(ref events) if events.len() == 1));
        assert_eq!(m.controller.stats().draws, 2);
    }

    #[test]
    fn quit_sets_flag() {
        let mut m = model();
        assert_eq!(update(&mut m, key(KeyCode::Char('q'))), TuiCmd::Quit);
        assert!(m.quit);
    }

    #[test]
    fn keyboard_toggles_cell_under_cursor() {
        let mut m = model();
        update(&mut m, key(KeyCode::Tab));
        assert_eq!(m.focus, Focus::Grid);
        // cursor starts on question:1
        update(&mut m, key(KeyCode::Enter));
        update(&mut m, key(KeyCode::Down));
        update(&mut m, key(KeyCode::Enter));
        assert_eq!(current(&m), Some("T3"));
    }

    #[test]
    fn keyboard_press_on_column_header_toggles_column() {
        let mut m = model();
        update(&mut m, key(KeyCode::Up));
        assert_eq!(m.cursor, GridCursor { col: 1, row: 0 });
        let cmd = update(&mut m, key(KeyCode::Enter));
        match cmd {
            TuiCmd::Log(events) => assert!(matches!(
                &events[0],
                ActivityEvent::ColumnToggled { category, .. } if category == "question"
            )),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(current(&m), Some("T3"));
    }

    #[test]
    fn pressing_missing_cell_does_nothing() {
        let mut m = model();
        m.focus = Focus::Grid;
        m.cursor = GridCursor { col: 2, row: 2 }; // physical:2
        let draws = m.controller.stats().draws;
        assert_eq!(update(&mut m, key(KeyCode::Enter)), TuiCmd::None);
        assert_eq!(m.controller.stats().draws, draws);
    }

    #[test]
    fn click_on_cell_toggles_without_activate() {
        let mut m = model();
        let grid = m.layout().unwrap().grid;
        let draws = m.controller.stats().draws;
        update(&mut m, click(grid.category_col(0) + 1, grid.level_row(0)));
        assert!(!m
            .controller
            .filter()
            .is_cell_active(&Category::from("question"), Level::new(1)));
        // exactly one redraw: the toggle's
        assert_eq!(m.controller.stats().draws, draws + 1);
        assert_eq!(m.focus, Focus::Grid);
    }

    #[test]
    fn click_on_row_header_toggles_row() {
        let mut m = model();
        let grid = m.layout().unwrap().grid;
        update(&mut m, click(grid.rect.col, grid.level_row(0)));
        assert_eq!(current(&m), Some("T2"));
    }

    #[test]
    fn click_outside_grid_activates() {
        let mut m = model();
        let draws = m.controller.stats().draws;
        let cmd = update(&mut m, click(1, 3));
        assert!(matches!(cmd, TuiCmd::Log(_)));
        assert_eq!(m.controller.stats().draws, draws + 1);
        assert_eq!(m.focus, Focus::Surface);
    }

    #[test]
    fn click_on_missing_cell_is_inert() {
        let mut m = model();
        let grid = m.layout().unwrap().grid;
        let draws = m.controller.stats().draws;
        let cmd = update(&mut m, click(grid.category_col(1) + 1, grid.level_row(1)));
        assert_eq!(cmd, TuiCmd::None);
        assert_eq!(m.controller.stats().draws, draws);
    }

    #[test]
    fn click_while_help_open_only_closes_help() {
        let mut m = model();
        update(&mut m, key(KeyCode::Char('?')));
        assert!(m.help_open);
        let draws = m.controller.stats().draws;
        assert_eq!(update(&mut m, click(1, 3)), TuiCmd::None);
        assert!(!m.help_open);
        assert_eq!(m.controller.stats().draws, draws);
    }

    #[test]
    fn non_left_clicks_are_ignored() {
        let mut m = model();
        let msg = TuiMsg::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 1,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(update(&mut m, msg), TuiCmd::None);
    }

    #[test]
    fn resize_updates_terminal_size() {
        let mut m = model();
        update(&mut m, TuiMsg::Resize { cols: 100, rows: 40 });
        assert_eq!(m.terminal_size, (100, 40));
    }

    #[test]
    fn refused_dispatch_sets_notice() {
        let mut m = model();
        let cmd = dispatch(
            &mut m,
            Action::ToggleCell(crate::catalog::ComboKey::new("physical", 2)),
        );
        assert!(matches!(
            cmd,
            TuiCmd::Log(ref events) if matches!(events[0], ActivityEvent::ActionIgnored { .. })
        ));
        assert!(m.notice.as_deref().unwrap().contains("no prompts"));
        update(&mut m, key(KeyCode::Char('r')));
        assert!(m.notice.is_none());
    }
}
