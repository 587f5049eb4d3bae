#![warn(missing_docs)]
//! Core primitives shared across the workspace: identifiers, items, blocks,
//! stack/grid containers and the crafting matcher.

pub mod block;
pub mod crafting;
pub mod grid;
pub mod item;
pub mod registry;

// Re-export commonly used types
pub use block::{create_block, Block, BlockKind, BreakEntry, BreakTable, MINING_CONSTANT};
pub use crafting::{CategoryTable, Crafter, Recipe, RecipeError};
pub use grid::{Grid, GridError, SelectableGrid, Stack, StackError};
pub use item::{create_item, BenchKind, Drop, Effect, Item, ItemKind};
pub use registry::{FactoryError, ThingId, ThingIdError};
