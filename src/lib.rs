#![forbid(unsafe_code)]

//! prompt-grid: random conversation prompts filtered by a grid of
//! (category × level) toggles.
//!
//! Three layers:
//! 1. **Catalog**: the prompt deck and the category × level grid it spans
//! 2. **Engine**: the active-combo filter, uniform selection, and the
//!    controller that keeps the current prompt consistent with the filter
//! 3. **Presentation**: a crossterm TUI and a non-interactive CLI
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use prompt_grid::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use prompt_grid::core::config::Config;
//! use prompt_grid::engine::controller::{Action, Controller};
//! ```

pub mod prelude;

pub mod catalog;
pub mod core;
pub mod engine;
pub mod logger;
#[cfg(feature = "tui")]
pub mod tui;
