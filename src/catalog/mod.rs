//! Prompt catalog: immutable records plus the fixed category and level
//! enumerations that span the toggle grid.
//!
//! A [`Catalog`] is built once at startup (from a deck file or the built-in
//! deck) and never mutated afterwards. It owns a shared [`ComboGrid`] that the
//! filter state uses to answer `exists(category, level)` without holding a
//! reference to the records themselves.

#![allow(missing_docs)]

pub mod loader;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::errors::{PgError, Result};

// ──────────────────── enumerations ────────────────────

/// A prompt category such as `question` or `physical`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An intensity level. Levels are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(u32);

impl Level {
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Level {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

// ──────────────────── combos ────────────────────

/// One (category, level) pair, the unit of filtering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComboKey {
    pub category: Category,
    pub level: Level,
}

impl ComboKey {
    #[must_use]
    pub fn new(category: impl Into<Category>, level: impl Into<Level>) -> Self {
        Self {
            category: category.into(),
            level: level.into(),
        }
    }
}

impl fmt::Display for ComboKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.level)
    }
}

/// Parses the `category:level` form used by config and CLI flags.
impl FromStr for ComboKey {
    type Err = PgError;

    fn from_str(raw: &str) -> Result<Self> {
        let invalid = |details: &str| PgError::InvalidCombo {
            raw: raw.to_string(),
            details: details.to_string(),
        };
        let (category, level) = raw
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected CATEGORY:LEVEL"))?;
        let category = category.trim();
        if category.is_empty() {
            return Err(invalid("category is empty"));
        }
        let level = level
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(&format!("level is not a number: {e}")))?;
        if level == 0 {
            return Err(invalid("level must be >= 1"));
        }
        Ok(Self::new(category, level))
    }
}

// ──────────────────── records ────────────────────

/// A single prompt. Duplicate texts are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub text: String,
    pub category: Category,
    pub level: Level,
}

impl PromptRecord {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        category: impl Into<Category>,
        level: impl Into<Level>,
    ) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            level: level.into(),
        }
    }

    /// The combo this record is filed under.
    #[must_use]
    pub fn combo(&self) -> ComboKey {
        ComboKey {
            category: self.category.clone(),
            level: self.level,
        }
    }

}

// ──────────────────── grid ────────────────────

/// The (category × level) universe plus the subset of combos that have at
/// least one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboGrid {
    categories: Vec<Category>,
    levels: Vec<Level>,
    counts: BTreeMap<ComboKey, usize>,
}

impl ComboGrid {
    /// Categories in display order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Levels in display order.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn has_category(&self, category: &Category) -> bool {
        self.categories.contains(category)
    }

    #[must_use]
    pub fn has_level(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    /// Whether `key` belongs to the (category × level) universe.
    #[must_use]
    pub fn contains(&self, key: &ComboKey) -> bool {
        self.has_category(&key.category) && self.has_level(key.level)
    }

    /// Whether at least one prompt is filed under `(category, level)`.
    #[must_use]
    pub fn exists(&self, category: &Category, level: Level) -> bool {
        self.count(category, level) > 0
    }

    /// Number of prompts filed under `(category, level)`.
    #[must_use]
    pub fn count(&self, category: &Category, level: Level) -> usize {
        self.counts
            .get(&ComboKey {
                category: category.clone(),
                level,
            })
            .copied()
            .unwrap_or(0)
    }

    /// Every combo of the universe, category-major.
    pub fn universe(&self) -> impl Iterator<Item = ComboKey> + '_ {
        self.categories.iter().flat_map(move |category| {
            self.levels.iter().map(move |level| ComboKey {
                category: category.clone(),
                level: *level,
            })
        })
    }

    /// Combos that have at least one prompt, category-major.
    pub fn existing(&self) -> impl Iterator<Item = ComboKey> + '_ {
        self.universe()
            .filter(move |key| self.exists(&key.category, key.level))
    }

    /// Existing combos in one row (fixed level).
    #[must_use]
    pub fn existing_in_row(&self, level: Level) -> Vec<ComboKey> {
        self.categories
            .iter()
            .filter(|category| self.exists(category, level))
            .map(|category| ComboKey {
                category: category.clone(),
                level,
            })
            .collect()
    }

    /// Existing combos in one column (fixed category).
    #[must_use]
    pub fn existing_in_column(&self, category: &Category) -> Vec<ComboKey> {
        self.levels
            .iter()
            .filter(|level| self.exists(category, **level))
            .map(|level| ComboKey {
                category: category.clone(),
                level: *level,
            })
            .collect()
    }

    #[must_use]
    pub fn universe_size(&self) -> usize {
        self.categories.len() * self.levels.len()
    }
}

// ──────────────────── catalog ────────────────────

/// Immutable prompt catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<PromptRecord>,
    grid: Arc<ComboGrid>,
}

impl Catalog {
    /// Build a catalog, deriving the enumerations from the records:
    /// categories in order of first appearance, levels ascending.
    pub fn from_records(records: Vec<PromptRecord>) -> Result<Self> {
        Self::with_enumerations(records, None, None)
    }

    /// Build a catalog with optionally supplied enumerations. Supplied
    /// enumerations fix the grid order and may name combos that have no
    /// prompts; every record must then use a listed category and level.
    pub fn with_enumerations(
        records: Vec<PromptRecord>,
        categories: Option<Vec<Category>>,
        levels: Option<Vec<Level>>,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(PgError::InvalidDeck {
                details: "deck contains no prompts".to_string(),
            });
        }

        for (idx, record) in records.iter().enumerate() {
            validate_record(idx, record)?;
        }

        let categories = match categories {
            Some(list) => {
                ensure_unique("categories", list.iter().map(Category::as_str))?;
                for category in &list {
                    validate_category_name(category.as_str())?;
                }
                list
            }
            None => {
                let mut seen = HashSet::new();
                records
                    .iter()
                    .filter(|r| seen.insert(r.category.clone()))
                    .map(|r| r.category.clone())
                    .collect()
            }
        };

        let levels = match levels {
            Some(list) => {
                ensure_unique("levels", list.iter().map(|l| l.get().to_string()))?;
                if let Some(zero) = list.iter().find(|l| l.get() == 0) {
                    return Err(PgError::InvalidDeck {
                        details: format!("level {zero} is not allowed; levels start at 1"),
                    });
                }
                list
            }
            None => {
                let mut derived: Vec<Level> = records.iter().map(|r| r.level).collect();
                derived.sort_unstable();
                derived.dedup();
                derived
            }
        };

        let mut counts: BTreeMap<ComboKey, usize> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            if !categories.contains(&record.category) {
                return Err(PgError::InvalidDeck {
                    details: format!(
                        "prompt #{} uses unknown category {:?}",
                        idx + 1,
                        record.category.as_str()
                    ),
                });
            }
            if !levels.contains(&record.level) {
                return Err(PgError::InvalidDeck {
                    details: format!("prompt #{} uses unknown level {}", idx + 1, record.level),
                });
            }
            *counts.entry(record.combo()).or_insert(0) += 1;
        }

        Ok(Self {
            records,
            grid: Arc::new(ComboGrid {
                categories,
                levels,
                counts,
            }),
        })
    }

    #[must_use]
    pub fn records(&self) -> &[PromptRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PromptRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn grid(&self) -> &ComboGrid {
        &self.grid
    }

    /// Shared handle to the grid for owners that outlive a borrow.
    #[must_use]
    pub fn shared_grid(&self) -> Arc<ComboGrid> {
        Arc::clone(&self.grid)
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        self.grid.categories()
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        self.grid.levels()
    }

    #[must_use]
    pub fn exists(&self, category: &Category, level: Level) -> bool {
        self.grid.exists(category, level)
    }

    /// SHA-256 over the canonical JSON form of the deck. Two catalogs with
    /// the same records, order and enumerations share a fingerprint.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(&loader::DeckFile::from_catalog(self))?;
        let digest = Sha256::digest(&canonical);
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}

fn validate_record(idx: usize, record: &PromptRecord) -> Result<()> {
    if record.text.trim().is_empty() {
        return Err(PgError::InvalidDeck {
            details: format!("prompt #{} has empty text", idx + 1),
        });
    }
    if record.level.get() == 0 {
        return Err(PgError::InvalidDeck {
            details: format!("prompt #{} has level 0; levels start at 1", idx + 1),
        });
    }
    validate_category_name(record.category.as_str())
}

fn validate_category_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PgError::InvalidDeck {
            details: "category names must not be empty".to_string(),
        });
    }
    if name.contains(':') {
        return Err(PgError::InvalidDeck {
            details: format!("category {name:?} must not contain ':'"),
        });
    }
    Ok(())
}

fn ensure_unique<I, S>(what: &str, items: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    for item in items {
        let item = item.as_ref().to_string();
        if !seen.insert(item.clone()) {
            return Err(PgError::InvalidDeck {
                details: format!("duplicate entry {item:?} in {what}"),
            });
        }
    }
    Ok(())
}
