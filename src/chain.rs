// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::slice;

use log::{debug, trace};

use crate::{NumberPair, OperationKind, UncertaintyElement};

/// The row capacity reserved by [`UncertaintyChain::new`].
pub const DEFAULT_CAPACITY: usize = 10;

/// An ordered list of arithmetic steps on measured values, with the
/// uncertainty propagated from each step to the next.
///
/// Row 0 always has the kind [`OperationKind::Start`] and holds the starting
/// value of the calculation. Every later row applies its operation to the
/// result of the rows before it. The chain is never empty.
///
/// Every mutation recomputes the rows from the first one it affects, so the
/// cumulatives and the result are always up to date when a method returns.
/// Once a row produces an undefined (NaN) result, every row after it is
/// reported as `Invalid` until the offending row is fixed.
///
/// Row indices that are out of range, and mutations that would remove,
/// insert before, or move row 0, are ignored.
///
/// # Example
///
/// ```
/// # use uasf::{NumberPair, OperationKind, UncertaintyChain};
/// #
/// let mut chain = UncertaintyChain::with_start(4, 1.5, 0.1);
/// chain.add(OperationKind::Add, 3.2, 0.3);
/// assert_eq!(chain.result(), NumberPair::new(4.7, 0.4));
/// chain.add(OperationKind::Mul, 2.0, 0.0);
/// assert_eq!(chain.result(), NumberPair::new(9.4, 0.8));
/// ```
#[derive(Clone, Debug)]
pub struct UncertaintyChain {
    elements: Vec<UncertaintyElement>,
    result: NumberPair,
}

impl UncertaintyChain {
    /// Creates a chain starting at 0 ± 0 with room for [`DEFAULT_CAPACITY`]
    /// rows.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a chain starting at 0 ± 0 with room for `capacity` rows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_start(capacity, 0.0, 0.0)
    }

    /// Creates a chain with room for `capacity` rows and the given starting
    /// value.
    pub fn with_start(capacity: usize, value: f64, uncertainty: f64) -> Self {
        let mut elements = Vec::with_capacity(capacity.max(1));
        elements.push(UncertaintyElement::new(OperationKind::Start, value, uncertainty));
        let mut chain = Self {
            elements,
            result: NumberPair::ZERO,
        };
        chain.compute_from(0);
        chain
    }

    /// Returns the number of rows the chain can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    /// Returns the number of rows, including the starting row.
    ///
    /// This is never less than 1.
    pub fn count(&self) -> usize {
        self.elements.len()
    }

    pub fn element(&self, row: usize) -> Option<&UncertaintyElement> {
        self.elements.get(row)
    }

    pub fn rows(&self) -> slice::Iter<'_, UncertaintyElement> {
        self.elements.iter()
    }

    /// Returns the value of a row, or NaN if the row does not exist or is
    /// poisoned.
    pub fn value(&self, row: usize) -> f64 {
        self.pair(row).value()
    }

    /// Returns the uncertainty of a row, or NaN if the row does not exist or is
    /// poisoned.
    pub fn uncertainty(&self, row: usize) -> f64 {
        self.pair(row).uncertainty()
    }

    pub fn pair(&self, row: usize) -> NumberPair {
        self.element(row)
            .map_or(NumberPair::INVALID, UncertaintyElement::operand)
    }

    /// Returns the kind of a row, or `Invalid` if the row does not exist or is
    /// poisoned.
    pub fn kind(&self, row: usize) -> OperationKind {
        self.element(row)
            .map_or(OperationKind::Invalid, UncertaintyElement::kind)
    }

    /// Appends a row.
    ///
    /// Rows of kind `Start` or `Invalid` cannot be added and are ignored.
    pub fn add(&mut self, kind: OperationKind, value: f64, uncertainty: f64) {
        self.add_element(UncertaintyElement::new(kind, value, uncertainty));
    }

    pub fn add_pair(&mut self, kind: OperationKind, operand: NumberPair) {
        self.add_element(UncertaintyElement::from_pair(kind, operand));
    }

    pub fn add_element(&mut self, element: UncertaintyElement) {
        if !self.accepts(&element) {
            return;
        }
        self.elements.push(element);
        // The new row's cumulative comes from the previous last row
        self.compute_from(self.elements.len() - 2);
    }

    /// Inserts a row before `row`, or appends it if `row` is past the end.
    ///
    /// Nothing can be inserted before the starting row, so a `row` of 0 is
    /// ignored.
    pub fn add_at(&mut self, row: usize, kind: OperationKind, value: f64, uncertainty: f64) {
        self.add_element_at(row, UncertaintyElement::new(kind, value, uncertainty));
    }

    pub fn add_element_at(&mut self, row: usize, element: UncertaintyElement) {
        if row == 0 {
            debug!("ignoring insertion before the starting row");
            return;
        }
        if row >= self.elements.len() {
            self.add_element(element);
            return;
        }
        if !self.accepts(&element) {
            return;
        }
        self.elements.insert(row, element);
        self.compute_from(row - 1);
    }

    /// Removes a row. The starting row cannot be removed.
    pub fn remove(&mut self, row: usize) {
        if row == 0 || row >= self.elements.len() {
            debug!("ignoring removal of row {row} from a chain of {}", self.elements.len());
            return;
        }
        self.elements.remove(row);
        self.compute_from(row - 1);
    }

    /// Exchanges two rows. The starting row cannot be moved.
    pub fn swap(&mut self, row1: usize, row2: usize) {
        let count = self.elements.len();
        if row1 == 0 || row2 == 0 || row1 >= count || row2 >= count {
            debug!("ignoring swap of rows {row1} and {row2} in a chain of {count}");
            return;
        }
        self.elements.swap(row1, row2);
        self.compute_from(row1.min(row2) - 1);
    }

    /// Sets the value and uncertainty of a row.
    pub fn set(&mut self, row: usize, value: f64, uncertainty: f64) {
        self.set_pair(row, NumberPair::new(value, uncertainty));
    }

    pub fn set_pair(&mut self, row: usize, operand: NumberPair) {
        if let Some(element) = self.row_mut(row) {
            element.set_operand(operand);
            // The row's own cumulative is unchanged
            self.compute_from(row);
        }
    }

    /// Sets the value of a row, keeping its uncertainty.
    pub fn set_value(&mut self, row: usize, value: f64) {
        if let Some(element) = self.row_mut(row) {
            element.set_value(value);
            self.compute_from(row);
        }
    }

    /// Sets the uncertainty of a row, keeping its value.
    pub fn set_uncertainty(&mut self, row: usize, uncertainty: f64) {
        if let Some(element) = self.row_mut(row) {
            element.set_uncertainty(uncertainty);
            self.compute_from(row);
        }
    }

    /// Replaces a row.
    ///
    /// An element placed at row 0 becomes the starting row, whatever its kind.
    /// Elsewhere, elements of kind `Start` or `Invalid` are ignored.
    pub fn set_element(&mut self, row: usize, mut element: UncertaintyElement) {
        if row >= self.elements.len() {
            debug!("ignoring replacement of row {row} in a chain of {}", self.elements.len());
            return;
        }
        if row == 0 {
            element.set_kind(OperationKind::Start);
            element.set_cumulative(NumberPair::ZERO);
            self.elements[0] = element;
            self.compute_from(0);
        } else if self.accepts(&element) {
            self.elements[row] = element;
            self.compute_from(row - 1);
        }
    }

    /// Sets the starting value and uncertainty.
    pub fn set_start(&mut self, value: f64, uncertainty: f64) {
        self.set_pair(0, NumberPair::new(value, uncertainty));
    }

    pub fn set_starting_value(&mut self, value: f64) {
        self.set_value(0, value);
    }

    pub fn set_starting_uncertainty(&mut self, uncertainty: f64) {
        self.set_uncertainty(0, uncertainty);
    }

    pub fn starting_pair(&self) -> NumberPair {
        self.pair(0)
    }

    pub fn starting_value(&self) -> f64 {
        self.value(0)
    }

    pub fn starting_uncertainty(&self) -> f64 {
        self.uncertainty(0)
    }

    /// Removes every row and resets the starting value to 0 ± 0.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.elements
            .push(UncertaintyElement::new(OperationKind::Start, 0.0, 0.0));
        self.compute_from(0);
    }

    /// Recomputes every row from the start.
    pub fn recompute(&mut self) {
        self.compute_from(0);
    }

    /// Returns the result of the last row.
    pub fn result(&self) -> NumberPair {
        self.result
    }

    pub fn result_value(&self) -> f64 {
        self.result.value()
    }

    pub fn resulting_uncertainty(&self) -> f64 {
        self.result.uncertainty()
    }

    fn row_mut(&mut self, row: usize) -> Option<&mut UncertaintyElement> {
        let count = self.elements.len();
        let element = self.elements.get_mut(row);
        if element.is_none() {
            debug!("ignoring change to row {row} of a chain of {count}");
        }
        element
    }

    /// Returns true if `element` may be placed after the starting row.
    fn accepts(&self, element: &UncertaintyElement) -> bool {
        let kind = element.operation();
        if !kind.is_selectable() {
            debug!("ignoring row of kind {kind}, which may not follow the starting row");
        }
        kind.is_selectable()
    }

    /// Recomputes the cumulatives of every row after `start` and the result.
    ///
    /// `start` itself is computed from the cumulative it already holds.
    fn compute_from(&mut self, start: usize) {
        let count = self.elements.len();
        if start >= count {
            return;
        }
        trace!("recomputing rows {start}..{count}");
        let mut current = self.elements[start].compute();
        for row in start + 1..count {
            if current.is_nan() {
                debug!(
                    "row {} has an undefined result, invalidating rows {row}..{count}",
                    row - 1
                );
                self.elements[row..]
                    .iter_mut()
                    .for_each(UncertaintyElement::poison);
                break;
            }
            let element = &mut self.elements[row];
            element.set_cumulative(current);
            current = element.compute();
        }
        self.result = current;
    }
}

impl Default for UncertaintyChain {
    fn default() -> Self {
        Self::new()
    }
}
