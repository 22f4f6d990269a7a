//! Prompt selection: eligible subset plus a uniform random draw.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::filter::FilterState;
use crate::catalog::{Catalog, PromptRecord};

/// Catalog indices of records whose combo is active, in catalog order.
#[must_use]
pub fn filtered_indices(catalog: &Catalog, filter: &FilterState) -> Vec<usize> {
    catalog
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.is_cell_active(&record.category, record.level))
        .map(|(idx, _)| idx)
        .collect()
}

/// Records whose combo is active, in catalog order.
#[must_use]
pub fn filtered_prompts<'a>(catalog: &'a Catalog, filter: &FilterState) -> Vec<&'a PromptRecord> {
    catalog
        .records()
        .iter()
        .filter(|record| filter.is_cell_active(&record.category, record.level))
        .collect()
}

/// Pick one element uniformly at random; `None` when `eligible` is empty.
pub fn draw<'a, T, R>(rng: &mut R, eligible: &'a [T]) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    eligible.choose(rng)
}
