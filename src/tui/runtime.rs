//! Event loop for the interactive session.
//!
//! Each terminal event is handled to completion (update, effects, repaint)
//! before the next one is read. The poll timeout only exists so resize events
//! are noticed promptly; nothing in the engine is time-driven.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event};
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use super::model::{DisplayOptions, TuiCmd, TuiModel, TuiMsg};
use super::render::{Frame, render};
use super::terminal_guard::TerminalGuard;
use super::theme::ThemePalette;
use super::update::update;
use crate::core::errors::{PgError, Result};
use crate::engine::controller::{Controller, SessionStats};
use crate::logger::activity::ActivityLog;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Run the interactive session until the user quits.
///
/// Returns the controller's counters for the exit summary.
///
/// # Errors
/// Returns [`PgError::Terminal`] if the terminal cannot be set up, read or
/// written.
pub fn run_session(
    controller: Controller,
    display: DisplayOptions,
    log: &mut ActivityLog,
) -> Result<SessionStats> {
    let guard = TerminalGuard::new().map_err(terminal_err)?;
    let palette = ThemePalette::new(display.color);
    let mut model = TuiModel::new(controller, display, TerminalGuard::terminal_size());
    let mut stdout = io::stdout();

    paint(&mut stdout, &render(&model), palette).map_err(terminal_err)?;
    while !model.quit {
        if !event::poll(POLL_INTERVAL).map_err(terminal_err)? {
            continue;
        }
        let msg = match event::read().map_err(terminal_err)? {
            Event::Key(key) => TuiMsg::Key(key),
            Event::Mouse(mouse) => TuiMsg::Mouse(mouse),
            Event::Resize(cols, rows) => TuiMsg::Resize { cols, rows },
            _ => continue,
        };
        let cmd = update(&mut model, msg);
        execute_cmd(cmd, &mut model, log);
        if !model.quit {
            paint(&mut stdout, &render(&model), palette).map_err(terminal_err)?;
        }
    }

    log.flush();
    drop(guard);
    Ok(model.controller.stats())
}

fn execute_cmd(cmd: TuiCmd, model: &mut TuiModel, log: &mut ActivityLog) {
    match cmd {
        TuiCmd::None => {}
        TuiCmd::Quit => model.quit = true,
        TuiCmd::Log(events) => log.record_all(&events),
    }
}

fn paint<W: Write>(out: &mut W, frame: &Frame, palette: ThemePalette) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for line in &frame.lines {
        queue!(out, MoveTo(line.col, line.row))?;
        for span in &line.spans {
            if let Some(color) = palette.color(span.token) {
                queue!(out, SetForegroundColor(color))?;
            }
            if ThemePalette::is_bold(span.token) {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            if span.highlight {
                queue!(out, SetAttribute(Attribute::Reverse))?;
            }
            queue!(out, Print(&span.text), SetAttribute(Attribute::Reset))?;
        }
    }
    out.flush()
}

fn terminal_err(source: io::Error) -> PgError {
    PgError::Terminal { source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, PromptRecord};
    use crate::engine::controller::SessionOptions;
    use crate::logger::activity::ActivityEvent;
    use crate::tui::theme::ColorMode;

    fn model() -> TuiModel {
        let catalog = Catalog::from_records(vec![PromptRecord::new("Only", "question", 1)]).unwrap();
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
    fn paint_writes_frame_text() {
        let m = model();
        let mut out = Vec::new();
        paint(&mut out, &render(&m), ThemePalette::new(ColorMode::Disabled)).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Only"));
        assert!(text.contains("QUESTION"));
    }

    #[test]
    fn colorless_paint_emits_no_color_sequences() {
        let m = model();
        let mut plain = Vec::new();
        paint(&mut plain, &render(&m), ThemePalette::new(ColorMode::Disabled)).unwrap();
        let mut colored = Vec::new();
        paint(&mut colored, &render(&m), ThemePalette::new(ColorMode::Enabled)).unwrap();
        // 38;5 is the SGR foreground sequence crossterm uses for named colors.
        assert!(!String::from_utf8_lossy(&plain).contains("\x1b[38;5;"));
        assert!(String::from_utf8_lossy(&colored).contains("\x1b[38;5;"));
    }

    #[test]
    fn log_and_quit_commands_execute() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = model();
        let mut log = ActivityLog::open(dir.path().join("activity.jsonl"), 1024 * 1024, 1);
        execute_cmd(
            TuiCmd::Log(vec![ActivityEvent::Drawn {
                prompt: None,
                eligible: 0,
            }]),
            &mut m,
            &mut log,
        );
        assert_eq!(log.recorded(), 1);
        assert!(!m.quit);
        execute_cmd(TuiCmd::Quit, &mut m, &mut log);
        assert!(m.quit);
    }
}
