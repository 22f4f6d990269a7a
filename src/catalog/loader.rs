//! Deck file loading: TOML or JSON, picked by file extension.
//!
//! ```toml
//! categories = ["question", "physical"]   # optional, fixes column order
//! levels = [1, 2, 3]                      # optional, fixes row order
//!
//! [[prompts]]
//! text = "What's a small thing that made you happy this week?"
//! category = "question"
//! level = 1
//! ```

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Catalog, Category, Level, PromptRecord};
use crate::core::errors::{PgError, Result};

/// The deck compiled into the binary, used when no deck file is configured.
const BUILTIN_DECK: &str = include_str!("../../assets/default_deck.toml");

/// On-disk deck representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<Level>>,
    #[serde(default)]
    pub prompts: Vec<PromptRecord>,
}

impl DeckFile {
    /// Canonical deck form of a loaded catalog (enumerations always present).
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            categories: Some(catalog.categories().to_vec()),
            levels: Some(catalog.levels().to_vec()),
            prompts: catalog.records().to_vec(),
        }
    }

    pub fn into_catalog(self) -> Result<Catalog> {
        Catalog::with_enumerations(self.prompts, self.categories, self.levels)
    }
}

/// Serialization format of a deck file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckFormat {
    Toml,
    Json,
}

impl DeckFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(PgError::UnsupportedDeckFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSource {
    Builtin,
    File(PathBuf),
}

impl DeckSource {
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Builtin, Self::File)
    }

    /// Human-readable label for summaries and logs.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Builtin => "built-in".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    pub fn load(&self) -> Result<Catalog> {
        match self {
            Self::Builtin => builtin_catalog(),
            Self::File(path) => load_deck(path),
        }
    }
}

/// Parse deck text in the given format.
pub fn parse_deck(raw: &str, format: DeckFormat) -> Result<Catalog> {
    let deck: DeckFile = match format {
        DeckFormat::Toml => toml::from_str(raw).map_err(|e| PgError::InvalidDeck {
            details: format!("toml: {e}"),
        })?,
        DeckFormat::Json => serde_json::from_str(raw).map_err(|e| PgError::InvalidDeck {
            details: format!("json: {e}"),
        })?,
    };
    deck.into_catalog()
}

/// Read and parse a deck file.
pub fn load_deck(path: &Path) -> Result<Catalog> {
    let format = DeckFormat::from_path(path)?;
    if !path.exists() {
        return Err(PgError::MissingDeck {
            path: path.to_path_buf(),
        });
    }
    let raw = fs::read_to_string(path).map_err(|source| PgError::io(path, source))?;
    parse_deck(&raw, format)
}

/// The deck shipped with the binary.
pub fn builtin_catalog() -> Result<Catalog> {
    parse_deck(BUILTIN_DECK, DeckFormat::Toml)
}
