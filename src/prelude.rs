//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use prompt_grid::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{PgError, Result};

// Catalog
pub use crate::catalog::loader::{DeckSource, builtin_catalog, load_deck};
pub use crate::catalog::{Catalog, Category, ComboGrid, ComboKey, Level, PromptRecord};

// Engine
pub use crate::engine::controller::{
    Action, Controller, DeckView, Dispatch, Refusal, SessionOptions, SessionStats,
};
pub use crate::engine::filter::{BulkToggle, FilterState, LineState};

// Logging
pub use crate::logger::activity::{ActivityEvent, ActivityLog};
