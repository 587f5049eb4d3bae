//! Stack and grid inventory containers.
//!
//! A depleted stack is always represented as an absent slot (`None`), never
//! as a quantity-0 [`Stack`].

use crate::item::Item;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for grid slot coordinates outside the declared bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid position ({row}, {column}) on {rows}x{columns} grid")]
pub struct GridError {
    /// Requested row.
    pub row: usize,
    /// Requested column.
    pub column: usize,
    /// Grid row count.
    pub rows: usize,
    /// Grid column count.
    pub columns: usize,
}

/// Error for invalid stack operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StackError {
    /// Splitting a quantity-1 stack would produce an empty stack.
    #[error("cannot split a stack of quantity 1")]
    SplitOfOne,
}

/// A quantity of one item kind.
///
/// Invariant: `0 < quantity <= item.max_stack_size()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    item: Item,
    quantity: u32,
}

impl Stack {
    /// Create a stack. Callers must supply a quantity in
    /// `(0, item.max_stack_size()]`.
    pub fn new(item: Item, quantity: u32) -> Self {
        debug_assert!(quantity > 0 && quantity <= item.max_stack_size());
        Self { item, quantity }
    }

    /// The item this stack holds.
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Mutable access to the held item (tool durability lives here).
    pub fn item_mut(&mut self) -> &mut Item {
        &mut self.item
    }

    /// Current quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Add up to `quantity`, capped at the item's max stack size.
    /// Returns the amount actually added; the caller tracks any remainder.
    pub fn add(&mut self, quantity: u32) -> u32 {
        let to_add = self
            .quantity
            .saturating_add(quantity)
            .min(self.item.max_stack_size())
            - self.quantity;
        self.quantity += to_add;
        to_add
    }

    /// Subtract up to `quantity`, flooring at zero.
    /// Returns the positive shortfall when `quantity` exceeded what was
    /// available, else 0.
    pub fn subtract(&mut self, quantity: u32) -> u32 {
        let shortfall = quantity.saturating_sub(self.quantity);
        self.quantity = self.quantity.saturating_sub(quantity);
        shortfall
    }

    /// Subtract one. Returns `true` iff the stack is now depleted and must
    /// be replaced by an absent slot.
    pub fn decrement(&mut self) -> bool {
        self.subtract(1);
        self.quantity == 0
    }

    /// Merge `other` into `self` while item ids match and space remains.
    /// Returns the leftover of `other`, or `None` when it was depleted.
    pub fn combine(&mut self, mut other: Stack) -> Option<Stack> {
        if other.item.id() != self.item.id() {
            return Some(other);
        }
        let moved = self.add(other.quantity);
        other.subtract(moved);
        if other.quantity == 0 {
            None
        } else {
            Some(other)
        }
    }

    /// Split off half (integer floor) of this stack into a new one.
    ///
    /// Splitting a quantity-1 stack is rejected: it would produce an empty
    /// stack, which this model never represents.
    pub fn split(&mut self) -> Result<Stack, StackError> {
        if self.quantity < 2 {
            return Err(StackError::SplitOfOne);
        }
        let half = self.quantity / 2;
        self.subtract(half);
        Ok(Stack::new(self.item.clone(), half))
    }
}

/// Fixed-size 2D slot container with row-major iteration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    columns: usize,
    slots: Vec<Option<Stack>>,
}

impl Grid {
    /// Create an empty rows x columns grid.
    pub fn new(rows: usize, columns: usize) -> Self {
        debug_assert!(rows > 0 && columns > 0);
        Self {
            rows,
            columns,
            slots: vec![None; rows * columns],
        }
    }

    /// (rows, columns) of this grid.
    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Whether a position lies inside the grid.
    pub fn contains(&self, row: usize, column: usize) -> bool {
        row < self.rows && column < self.columns
    }

    fn bounds_error(&self, row: usize, column: usize) -> GridError {
        GridError {
            row,
            column,
            rows: self.rows,
            columns: self.columns,
        }
    }

    /// Stack at a position; `None` for empty or out-of-bounds slots.
    pub fn get(&self, row: usize, column: usize) -> Option<&Stack> {
        if !self.contains(row, column) {
            return None;
        }
        self.slots[row * self.columns + column].as_ref()
    }

    /// Mutable stack at a position.
    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut Stack> {
        if !self.contains(row, column) {
            return None;
        }
        self.slots[row * self.columns + column].as_mut()
    }

    /// Overwrite a slot.
    pub fn set(
        &mut self,
        row: usize,
        column: usize,
        stack: Option<Stack>,
    ) -> Result<(), GridError> {
        if !self.contains(row, column) {
            return Err(self.bounds_error(row, column));
        }
        self.slots[row * self.columns + column] = stack;
        Ok(())
    }

    /// Remove and return the stack at a position.
    pub fn take(&mut self, row: usize, column: usize) -> Result<Option<Stack>, GridError> {
        if !self.contains(row, column) {
            return Err(self.bounds_error(row, column));
        }
        Ok(self.slots[row * self.columns + column].take())
    }

    /// Iterate slots in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), Option<&Stack>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| ((i / self.columns, i % self.columns), slot.as_ref()))
    }

    /// Add a single item, merging into compatible stacks first.
    /// Returns `true` iff the item was absorbed.
    pub fn add_item(&mut self, item: Item) -> bool {
        self.add_items(Stack::new(item, 1)).is_none()
    }

    /// Add a stack, combining into every compatible existing stack in
    /// row-major order before falling back to the first empty slot.
    ///
    /// A single scan: the stack lands in the first compatible stacks it
    /// meets, not the most-full ones. Returns the leftover stack when the
    /// grid could not absorb everything, else `None`.
    pub fn add_items(&mut self, stack: Stack) -> Option<Stack> {
        let mut remaining = stack;
        let mut first_empty = None;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            match slot {
                Some(existing) => {
                    remaining = match existing.combine(remaining) {
                        Some(leftover) => leftover,
                        None => return None,
                    };
                }
                None => {
                    if first_empty.is_none() {
                        first_empty = Some(i);
                    }
                }
            }
        }

        match first_empty {
            Some(i) => {
                self.slots[i] = Some(remaining);
                None
            }
            None => Some(remaining),
        }
    }
}

/// A [`Grid`] with at most one selected position, always in bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectableGrid {
    grid: Grid,
    selected: Option<(usize, usize)>,
}

impl SelectableGrid {
    /// Create an empty selectable grid with nothing selected.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            grid: Grid::new(rows, columns),
            selected: None,
        }
    }

    /// Currently selected position, if any.
    pub fn selected(&self) -> Option<(usize, usize)> {
        self.selected
    }

    /// Stack at the selected position, if a non-empty slot is selected.
    pub fn selected_stack(&self) -> Option<&Stack> {
        let (row, column) = self.selected?;
        self.grid.get(row, column)
    }

    /// Mutable stack at the selected position.
    pub fn selected_stack_mut(&mut self) -> Option<&mut Stack> {
        let (row, column) = self.selected?;
        self.grid.get_mut(row, column)
    }

    /// Select a position. Fails with an invalid-position error when out of
    /// bounds; selecting an empty slot is allowed.
    pub fn select(&mut self, row: usize, column: usize) -> Result<(), GridError> {
        if !self.grid.contains(row, column) {
            return Err(self.grid.bounds_error(row, column));
        }
        self.selected = Some((row, column));
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Toggle selection of a position: selecting it if unselected,
    /// deselecting if it was already selected.
    pub fn toggle_selection(&mut self, row: usize, column: usize) -> Result<(), GridError> {
        if !self.grid.contains(row, column) {
            return Err(self.grid.bounds_error(row, column));
        }
        if self.selected == Some((row, column)) {
            self.selected = None;
        } else {
            self.selected = Some((row, column));
        }
        Ok(())
    }
}

impl std::ops::Deref for SelectableGrid {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        &self.grid
    }
}

impl std::ops::DerefMut for SelectableGrid {
    fn deref_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::registry::ThingId;
    use proptest::prelude::*;

    fn dirt() -> Item {
        Item::block(ThingId::new("dirt"))
    }

    fn stone() -> Item {
        Item::block(ThingId::new("stone"))
    }

    #[test]
    fn add_caps_at_max_stack_size() {
        let mut stack = Stack::new(dirt(), 60);
        assert_eq!(stack.add(10), 4);
        assert_eq!(stack.quantity(), 64);
        assert_eq!(stack.add(1), 0);
    }

    #[test]
    fn subtract_reports_shortfall() {
        let mut stack = Stack::new(dirt(), 5);
        assert_eq!(stack.subtract(3), 0);
        assert_eq!(stack.quantity(), 2);
        assert_eq!(stack.subtract(10), 8);
        assert_eq!(stack.quantity(), 0);
    }

    #[test]
    fn combine_merges_matching_items() {
        let mut stack = Stack::new(dirt(), 60);
        let leftover = stack.combine(Stack::new(dirt(), 10)).unwrap();
        assert_eq!(stack.quantity(), 64);
        assert_eq!(leftover.quantity(), 6);

        let mut stack = Stack::new(dirt(), 10);
        assert!(stack.combine(Stack::new(dirt(), 5)).is_none());
        assert_eq!(stack.quantity(), 15);
    }

    #[test]
    fn combine_ignores_different_items() {
        let mut stack = Stack::new(dirt(), 10);
        let untouched = stack.combine(Stack::new(stone(), 5)).unwrap();
        assert_eq!(stack.quantity(), 10);
        assert_eq!(untouched.quantity(), 5);
    }

    #[test]
    fn split_takes_floored_half() {
        let mut stack = Stack::new(dirt(), 7);
        let split = stack.split().unwrap();
        assert_eq!(split.quantity(), 3);
        assert_eq!(stack.quantity(), 4);
    }

    #[test]
    fn split_of_one_is_rejected() {
        let mut stack = Stack::new(dirt(), 1);
        assert_eq!(stack.split(), Err(StackError::SplitOfOne));
        assert_eq!(stack.quantity(), 1);
    }

    #[test]
    fn grid_add_items_combines_before_first_empty() {
        let mut grid = Grid::new(2, 2);
        grid.set(0, 1, Some(Stack::new(dirt(), 60))).unwrap();
        grid.set(1, 0, Some(Stack::new(stone(), 1))).unwrap();

        // 10 dirt: 4 into the existing stack, remainder into (0, 0).
        assert!(grid.add_items(Stack::new(dirt(), 10)).is_none());
        assert_eq!(grid.get(0, 1).unwrap().quantity(), 64);
        assert_eq!(grid.get(0, 0).unwrap().quantity(), 6);
    }

    #[test]
    fn grid_add_items_reports_leftover_when_full() {
        let mut grid = Grid::new(1, 1);
        grid.set(0, 0, Some(Stack::new(stone(), 64))).unwrap();
        let leftover = grid.add_items(Stack::new(dirt(), 3)).unwrap();
        assert_eq!(leftover.quantity(), 3);
    }

    #[test]
    fn grid_iterates_row_major() {
        let grid = Grid::new(2, 3);
        let positions: Vec<_> = grid.iter().map(|(pos, _)| pos).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
    }

    #[test]
    fn grid_bounds_are_enforced() {
        let mut grid = Grid::new(2, 2);
        assert!(grid.set(2, 0, None).is_err());
        assert!(grid.take(0, 5).is_err());
        assert!(grid.get(9, 9).is_none());
    }

    #[test]
    fn selection_requires_in_bounds_position() {
        let mut bar = SelectableGrid::new(1, 10);
        bar.select(0, 3).unwrap();
        assert_eq!(bar.selected(), Some((0, 3)));

        let err = bar.select(1, 0).unwrap_err();
        assert_eq!(err.rows, 1);
        assert_eq!(bar.selected(), Some((0, 3)));
    }

    #[test]
    fn toggle_selection_flips() {
        let mut bar = SelectableGrid::new(1, 4);
        bar.toggle_selection(0, 2).unwrap();
        assert_eq!(bar.selected(), Some((0, 2)));
        bar.toggle_selection(0, 2).unwrap();
        assert_eq!(bar.selected(), None);
        assert!(bar.toggle_selection(3, 3).is_err());
    }

    proptest! {
        #[test]
        fn add_subtract_round_trip(start in 1u32..=64, delta in 0u32..=64) {
            let mut stack = Stack::new(dirt(), start);
            let added = stack.add(delta);
            let shortfall = stack.subtract(added);
            prop_assert_eq!(shortfall, 0);
            prop_assert_eq!(stack.quantity(), start);
        }

        #[test]
        fn quantity_never_exceeds_max(start in 1u32..=64, delta in 0u32..=1000) {
            let mut stack = Stack::new(dirt(), start);
            stack.add(delta);
            prop_assert!(stack.quantity() <= stack.item().max_stack_size());
        }

        #[test]
        fn absorbed_stacks_leave_no_remainder(quantity in 1u32..=64) {
            let mut grid = Grid::new(2, 2);
            let leftover = grid.add_items(Stack::new(dirt(), quantity));
            prop_assert!(leftover.is_none());
            let total: u32 = grid
                .iter()
                .filter_map(|(_, slot)| slot.map(Stack::quantity))
                .sum();
            prop_assert_eq!(total, quantity);
        }
    }
}
