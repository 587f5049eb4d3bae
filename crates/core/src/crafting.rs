//! Crafting bench and pattern matcher.
//!
//! A [`Crafter`] holds a square placement grid, an ordered recipe table and
//! a category table. Matching reduces the placement grid to its minimal
//! bounding pattern and compares it cell by cell against each recipe in
//! table order; the first full match wins, so table order is a meaningful
//! tie-break.

use crate::grid::{Grid, GridError, Stack};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Category name -> set of interchangeable item ids.
pub type CategoryTable = BTreeMap<String, BTreeSet<String>>;

/// Error for malformed recipe definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
    /// The pattern had no rows, no columns, or no occupied cells.
    #[error("recipe pattern must contain at least one occupied cell")]
    EmptyPattern,
    /// The pattern rows had differing lengths.
    #[error("recipe pattern rows must all have the same length")]
    RaggedPattern,
}

/// Minimal bounding sub-rectangle of the occupied cells of a pattern.
/// Empty for a pattern with no occupied cells.
fn reduce_pattern(pattern: &[Vec<Option<String>>]) -> Vec<Vec<Option<String>>> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for (row, cells) in pattern.iter().enumerate() {
        for (column, cell) in cells.iter().enumerate() {
            if cell.is_some() {
                let (top, bottom, left, right) =
                    bounds.unwrap_or((row, row, column, column));
                bounds = Some((
                    top.min(row),
                    bottom.max(row),
                    left.min(column),
                    right.max(column),
                ));
            }
        }
    }
    match bounds {
        Some((top, bottom, left, right)) => (top..=bottom)
            .map(|row| pattern[row][left..=right].to_vec())
            .collect(),
        None => Vec::new(),
    }
}

/// A crafting recipe: a rectangular pattern of optional cells (literal item
/// id or category name) and the result stack it produces.
///
/// Recipes are defined at startup and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pattern: Vec<Vec<Option<String>>>,
    /// Pattern normalised to its minimal bounding rectangle, computed once
    /// at construction; matching always runs against this form.
    #[serde(skip_serializing)]
    reduced: Vec<Vec<Option<String>>>,
    result: Stack,
}

impl<'de> Deserialize<'de> for Recipe {
    /// Deserialized recipes pass through [`Recipe::new`], so a stored table
    /// cannot smuggle in an invalid or stale pattern.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            pattern: Vec<Vec<Option<String>>>,
            result: Stack,
        }

        let raw = Raw::deserialize(deserializer)?;
        Recipe::new(raw.pattern, raw.result).map_err(serde::de::Error::custom)
    }
}

impl Recipe {
    /// Create a recipe, validating that the pattern is rectangular and has
    /// at least one occupied cell.
    pub fn new(pattern: Vec<Vec<Option<String>>>, result: Stack) -> Result<Self, RecipeError> {
        let columns = match pattern.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(RecipeError::EmptyPattern),
        };
        if pattern.iter().any(|row| row.len() != columns) {
            return Err(RecipeError::RaggedPattern);
        }
        let reduced = reduce_pattern(&pattern);
        if reduced.is_empty() {
            return Err(RecipeError::EmptyPattern);
        }
        Ok(Self {
            pattern,
            reduced,
            result,
        })
    }

    /// (rows, columns) of the reduced pattern.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.reduced.len(), self.reduced[0].len())
    }

    /// The pattern cells as authored.
    pub fn pattern(&self) -> &[Vec<Option<String>>] {
        &self.pattern
    }

    /// The pattern cells normalised to their minimal bounding rectangle.
    pub fn reduced_pattern(&self) -> &[Vec<Option<String>>] {
        &self.reduced
    }

    /// The result template. Crafting returns a clone of this, never the
    /// template itself.
    pub fn result(&self) -> &Stack {
        &self.result
    }
}

/// Square crafting bench with an ordered recipe table.
#[derive(Debug, Clone)]
pub struct Crafter {
    bench: Grid,
    recipes: Vec<Recipe>,
    categories: CategoryTable,
}

impl Crafter {
    /// Create an empty bench of the given side length.
    pub fn new(size: usize, recipes: Vec<Recipe>, categories: CategoryTable) -> Self {
        Self {
            bench: Grid::new(size, size),
            recipes,
            categories,
        }
    }

    /// Side length of the bench grid.
    pub fn size(&self) -> usize {
        self.bench.size().0
    }

    /// The recipe table, in match order.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Stack placed at a bench position.
    pub fn get(&self, row: usize, column: usize) -> Option<&Stack> {
        self.bench.get(row, column)
    }

    /// Place a stack on the bench.
    pub fn put(&mut self, row: usize, column: usize, stack: Stack) -> Result<(), GridError> {
        self.bench.set(row, column, Some(stack))
    }

    /// Remove and return the stack at a bench position.
    pub fn take(&mut self, row: usize, column: usize) -> Result<Option<Stack>, GridError> {
        self.bench.take(row, column)
    }

    /// Minimal bounding pattern of the occupied bench cells, as item id
    /// strings. An entirely empty bench reduces to an empty pattern.
    fn reduced_pattern(&self) -> Vec<Vec<Option<String>>> {
        let (rows, columns) = self.bench.size();
        let mut top = rows;
        let mut bottom = 0;
        let mut left = columns;
        let mut right = 0;
        let mut any = false;

        for ((row, column), slot) in self.bench.iter() {
            if slot.is_some() {
                any = true;
                top = top.min(row);
                bottom = bottom.max(row);
                left = left.min(column);
                right = right.max(column);
            }
        }

        if !any {
            return Vec::new();
        }

        (top..=bottom)
            .map(|row| {
                (left..=right)
                    .map(|column| {
                        self.bench
                            .get(row, column)
                            .map(|stack| stack.item().id().to_string())
                    })
                    .collect()
            })
            .collect()
    }

    fn cell_matches(&self, placed: &Option<String>, wanted: &Option<String>) -> bool {
        match (placed, wanted) {
            (None, None) => true,
            (Some(placed), Some(wanted)) => {
                placed == wanted
                    || self
                        .categories
                        .get(wanted)
                        .is_some_and(|members| members.contains(placed))
            }
            _ => false,
        }
    }

    /// Find the first recipe whose pattern matches the current bench
    /// contents, honouring category wildcards. Returns its table index.
    pub fn find_match(&self) -> Option<usize> {
        let state = self.reduced_pattern();
        if state.is_empty() {
            return None;
        }
        let dimensions = (state.len(), state[0].len());

        self.recipes.iter().position(|recipe| {
            recipe.dimensions() == dimensions
                && recipe
                    .reduced_pattern()
                    .iter()
                    .zip(&state)
                    .all(|(recipe_row, state_row)| {
                        recipe_row
                            .iter()
                            .zip(state_row)
                            .all(|(wanted, placed)| self.cell_matches(placed, wanted))
                    })
        })
    }

    /// Craft the matched recipe: decrement every occupied bench cell by one
    /// (clearing depleted cells) and return a fresh copy of the result.
    ///
    /// No match leaves the bench untouched and returns `None`.
    pub fn craft(&mut self) -> Option<Stack> {
        let index = self.find_match()?;
        let result = self.recipes[index].result().clone();

        let (rows, columns) = self.bench.size();
        for row in 0..rows {
            for column in 0..columns {
                let depleted = match self.bench.get_mut(row, column) {
                    Some(stack) => stack.decrement(),
                    None => false,
                };
                if depleted {
                    // take() cannot fail for an in-bounds position
                    let _ = self.bench.take(row, column);
                }
            }
        }

        Some(result)
    }
}
