//! Interactive terminal UI for browsing prompts.
//!
//! Elm-style split: [`model`] holds state, [`update`] applies messages and
//! returns commands, [`render`] builds frames, and [`runtime`] owns the
//! crossterm event loop and executes commands.

#![allow(missing_docs)]

pub mod input;
pub mod layout;
pub mod model;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod theme;
pub mod update;

pub use model::DisplayOptions;
pub use runtime::run_session;
