// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use crate::{NumberPair, OperationKind, rounding::simplify};

/// A single row of an [`UncertaintyChain`](crate::UncertaintyChain).
///
/// Holds an operation kind, the operand (the row's own measured value and
/// uncertainty), and the cumulative result of the rows before it. The
/// cumulative is a cache maintained by the chain.
///
/// A row whose cumulative is undefined (NaN) is poisoned: it reports the kind
/// `Invalid` and NaN for its value and uncertainty, but keeps its real kind and
/// operand so that it recovers once the rows before it are fixed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UncertaintyElement {
    kind: OperationKind,
    operand: NumberPair,
    cumulative: NumberPair,
}

impl UncertaintyElement {
    /// Creates an element with a cumulative of 0 ± 0.
    ///
    /// # Example
    ///
    /// ```
    /// # use uasf::{NumberPair, OperationKind, UncertaintyElement};
    /// #
    /// let element = UncertaintyElement::new(OperationKind::Mul, 2.0, 0.1);
    /// let result = element.compute_with(NumberPair::new(3.0, 0.3));
    /// assert_eq!(result, NumberPair::new(6.0, 0.9));
    /// ```
    #[inline]
    pub fn new(kind: OperationKind, value: f64, uncertainty: f64) -> Self {
        Self::from_pair(kind, NumberPair::new(value, uncertainty))
    }

    #[inline]
    pub fn from_pair(kind: OperationKind, operand: NumberPair) -> Self {
        Self::with_cumulative(kind, operand, NumberPair::ZERO)
    }

    #[inline]
    pub fn with_cumulative(kind: OperationKind, operand: NumberPair, cumulative: NumberPair) -> Self {
        Self {
            kind,
            operand,
            cumulative,
        }
    }

    /// The element that stands for an undefined row.
    #[inline]
    pub fn invalid() -> Self {
        Self::with_cumulative(OperationKind::Invalid, NumberPair::INVALID, NumberPair::INVALID)
    }

    /// Returns the kind of the row, or `Invalid` if the row is poisoned.
    #[inline]
    pub fn kind(&self) -> OperationKind {
        if self.is_poisoned() {
            OperationKind::Invalid
        } else {
            self.kind
        }
    }

    /// Returns the operand, or NaN ± NaN if the row is poisoned.
    #[inline]
    pub fn operand(&self) -> NumberPair {
        if self.is_poisoned() {
            NumberPair::INVALID
        } else {
            self.operand
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.operand().value()
    }

    #[inline]
    pub fn uncertainty(&self) -> f64 {
        self.operand().uncertainty()
    }

    /// Returns the cumulative result of the rows before this one.
    #[inline]
    pub fn cumulative(&self) -> NumberPair {
        self.cumulative
    }

    /// Returns true if the rows before this one produced an undefined result.
    ///
    /// A `Start` row ignores the cumulative and is never poisoned.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.kind != OperationKind::Start && self.cumulative.is_nan()
    }

    /// Sets the value, keeping the uncertainty.
    #[inline]
    pub fn set_value(&mut self, value: f64) {
        self.operand = NumberPair::new(value, self.operand.uncertainty());
    }

    /// Sets the uncertainty, keeping the value.
    #[inline]
    pub fn set_uncertainty(&mut self, uncertainty: f64) {
        self.operand = NumberPair::new(self.operand.value(), uncertainty);
    }

    #[inline]
    pub fn set_operand(&mut self, operand: NumberPair) {
        self.operand = operand;
    }

    #[inline]
    pub fn set_kind(&mut self, kind: OperationKind) {
        self.kind = kind;
    }

    /// Returns the stored kind, even if the row is poisoned.
    #[inline]
    pub(crate) fn operation(&self) -> OperationKind {
        self.kind
    }

    #[inline]
    pub(crate) fn set_cumulative(&mut self, cumulative: NumberPair) {
        self.cumulative = cumulative;
    }

    /// Marks the row as following an undefined result.
    #[inline]
    pub(crate) fn poison(&mut self) {
        self.cumulative = NumberPair::INVALID;
    }

    /// Computes the result of this row from its stored cumulative.
    #[inline]
    pub fn compute(&self) -> NumberPair {
        propagate(self.kind, self.cumulative, self.operand)
    }

    /// Computes the result of this row from the given cumulative.
    #[inline]
    pub fn compute_with(&self, cumulative: NumberPair) -> NumberPair {
        propagate(self.kind, cumulative, self.operand)
    }
}

impl Default for UncertaintyElement {
    fn default() -> Self {
        Self::new(OperationKind::Start, 0.0, 0.0)
    }
}

/// Combines a cumulative and an operand according to `kind`.
///
/// Both inputs are simplified before combining and the result is simplified
/// before being returned. Undefined results (division by zero, 0^0) are
/// NaN ± NaN.
pub(crate) fn propagate(kind: OperationKind, cumulative: NumberPair, operand: NumberPair) -> NumberPair {
    let (v, u): (f64, f64) = operand.simplified().into();
    let (cv, cu): (f64, f64) = cumulative.simplified().into();
    let (value, uncertainty) = match kind {
        OperationKind::Start => (v, u),
        OperationKind::Add => (v + cv, u + cu),
        OperationKind::Sub => (cv - v, u + cu),
        OperationKind::SubReversed => (v - cv, u + cu),
        OperationKind::Mul => product((cv, cu), (v, u)),
        OperationKind::Div => quotient((cv, cu), (v, u)),
        OperationKind::DivReversed => quotient((v, u), (cv, cu)),
        OperationKind::Pow => power((cv, cu), v),
        OperationKind::PowReversed => power((v, u), cv),
        // The operand is an exact constant
        OperationKind::MulByConstant => (cv * v, cu * v),
        OperationKind::MulByConstantReversed => (cv * v, cv * u),
        OperationKind::DivByConstant => {
            if v != 0.0 {
                (cv / v, cu / v)
            } else {
                (f64::NAN, f64::NAN)
            }
        }
        OperationKind::DivByConstantReversed => {
            if cv != 0.0 {
                (v / cv, u / cv)
            } else {
                (f64::NAN, f64::NAN)
            }
        }
        OperationKind::Invalid => (cv, cu),
    };
    simplify(value, uncertainty.abs())
}

/// Relative uncertainties add. A zero factor contributes its uncertainty
/// scaled by the other factor's upper bound instead.
fn product((cv, cu): (f64, f64), (v, u): (f64, f64)) -> (f64, f64) {
    let value = v * cv;
    let uncertainty = if v == 0.0 && cv == 0.0 {
        u * cu
    } else if v == 0.0 {
        (cu + cv) * u
    } else if cv == 0.0 {
        (v + u) * cu
    } else {
        value * (cu / cv + u / v)
    };
    (value, uncertainty)
}

/// Relative uncertainties add, as for a product.
fn quotient((n, nu): (f64, f64), (d, du): (f64, f64)) -> (f64, f64) {
    if d == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let value = n / d;
    let uncertainty = if n == 0.0 {
        if d + du == 0.0 {
            f64::MAX
        } else {
            nu / (d + du)
        }
    } else {
        value * (nu / n + du / d)
    };
    (value, uncertainty)
}

/// The relative uncertainty of the base is multiplied by the exponent.
///
/// This linearization ignores the uncertainty of the exponent; the exact
/// bounds would come from the extremes of both intervals.
fn power((base, base_uncertainty): (f64, f64), exponent: f64) -> (f64, f64) {
    let value = if base == 0.0 && exponent == 0.0 {
        f64::NAN
    } else {
        base.powf(exponent)
    };
    let uncertainty = if value.is_nan() {
        f64::NAN
    } else if base == 0.0 {
        base_uncertainty.powf(exponent)
    } else {
        value * (base_uncertainty / base) * exponent
    };
    (value, uncertainty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(kind: OperationKind) -> NumberPair {
        UncertaintyElement::with_cumulative(
            kind,
            NumberPair::new(3.2, 0.3),
            NumberPair::new(1.5, 0.1),
        )
        .compute()
    }

    #[test]
    fn new_element() {
        let e = UncertaintyElement::new(OperationKind::Add, 3.2, -0.3);
        assert_eq!(e.kind(), OperationKind::Add);
        assert_eq!(e.value(), 3.2);
        assert_eq!(e.uncertainty(), 0.3);
        assert_eq!(e.cumulative(), NumberPair::ZERO);
        assert!(!e.is_poisoned());
    }

    #[test]
    fn start_ignores_cumulative() {
        assert_eq!(compute(OperationKind::Start), NumberPair::new(3.2, 0.3));
    }

    #[test]
    fn add_and_sub() {
        assert_eq!(compute(OperationKind::Add), NumberPair::new(4.7, 0.4));
        assert_eq!(compute(OperationKind::Sub), NumberPair::new(-1.7, 0.4));
        assert_eq!(compute(OperationKind::SubReversed), NumberPair::new(1.7, 0.4));
    }

    #[test]
    fn mul() {
        // 4.8 * (0.1 / 1.5 + 0.3 / 3.2) = 0.77
        assert_eq!(compute(OperationKind::Mul), NumberPair::new(4.8, 0.8));
    }

    #[test]
    fn mul_with_zero() {
        let cumulative = NumberPair::new(0.0, 0.2);
        let both = UncertaintyElement::new(OperationKind::Mul, 0.0, 0.3);
        assert_eq!(both.compute_with(cumulative), NumberPair::new(0.0, 0.06));
        // (0.2 + 0) * 0.3
        let operand_zero = UncertaintyElement::new(OperationKind::Mul, 0.0, 0.3);
        assert_eq!(
            operand_zero.compute_with(NumberPair::new(2.0, 0.2)),
            NumberPair::new(0.0, 0.7)
        );
        // (4 + 0.5) * 0.2
        let cumulative_zero = UncertaintyElement::new(OperationKind::Mul, 4.0, 0.5);
        assert_eq!(cumulative_zero.compute_with(cumulative), NumberPair::new(0.0, 0.9));
    }

    #[test]
    fn div() {
        // 0.46875 * (0.1 / 1.5 + 0.3 / 3.2) = 0.075
        assert_eq!(compute(OperationKind::Div), NumberPair::new(0.47, 0.08));
        // 2.1333 * (0.3 / 3.2 + 0.1 / 1.5) = 0.342
        assert_eq!(compute(OperationKind::DivReversed), NumberPair::new(2.1, 0.3));
    }

    #[test]
    fn div_by_zero() {
        let e = UncertaintyElement::new(OperationKind::Div, 0.0, 0.0);
        assert!(e.compute_with(NumberPair::new(2.0, 0.1)).is_nan());
        let e = UncertaintyElement::new(OperationKind::DivReversed, 2.0, 0.1);
        assert!(e.compute_with(NumberPair::ZERO).is_nan());
        assert!(e.compute_with(NumberPair::new(0.0, 0.5)).value().is_nan());
    }

    #[test]
    fn div_zero_numerator() {
        // 0.4 / (2 + 0.1)
        let e = UncertaintyElement::new(OperationKind::Div, 2.0, 0.1);
        assert_eq!(e.compute_with(NumberPair::new(0.0, 0.4)), NumberPair::new(0.0, 0.2));
        // 0.4 / (2 + 0.1) with the roles swapped
        let e = UncertaintyElement::new(OperationKind::DivReversed, 0.0, 0.4);
        assert_eq!(e.compute_with(NumberPair::new(2.0, 0.1)), NumberPair::new(0.0, 0.2));
    }

    #[test]
    fn div_zero_numerator_unbounded() {
        // The divisor's interval reaches zero
        let e = UncertaintyElement::new(OperationKind::Div, -0.5, 0.5);
        let result = e.compute_with(NumberPair::new(0.0, 0.1));
        assert_eq!(result.value(), 0.0);
        assert_eq!(result.uncertainty(), f64::INFINITY);
        let e = UncertaintyElement::new(OperationKind::DivReversed, 0.0, 0.1);
        let result = e.compute_with(NumberPair::new(-0.5, 0.5));
        assert_eq!(result.uncertainty(), f64::INFINITY);
    }

    #[test]
    fn pow() {
        // 1.5^3.2 = 3.658, 3.658 * (0.1 / 1.5) * 3.2 = 0.78
        assert_eq!(compute(OperationKind::Pow), NumberPair::new(3.7, 0.8));
        // 3.2^1.5 = 5.724, 5.724 * (0.3 / 3.2) * 1.5 = 0.805
        assert_eq!(compute(OperationKind::PowReversed), NumberPair::new(5.7, 0.8));
    }

    #[test]
    fn pow_with_zero() {
        let zero_exponent = UncertaintyElement::new(OperationKind::Pow, 0.0, 0.0);
        assert!(zero_exponent.compute_with(NumberPair::ZERO).is_nan());
        // 0.2^2
        let square = UncertaintyElement::new(OperationKind::Pow, 2.0, 0.0);
        assert_eq!(square.compute_with(NumberPair::new(0.0, 0.2)), NumberPair::new(0.0, 0.04));
        // 0.2^2 with the roles swapped
        let square = UncertaintyElement::new(OperationKind::PowReversed, 0.0, 0.2);
        assert_eq!(square.compute_with(NumberPair::exact(2.0)), NumberPair::new(0.0, 0.04));
        // Fractional power of a negative base is undefined
        let root = UncertaintyElement::new(OperationKind::Pow, 0.5, 0.0);
        assert!(root.compute_with(NumberPair::new(-4.0, 0.1)).is_nan());
    }

    #[test]
    fn by_constant() {
        // 1.5 * 3.2 = 4.8, 0.1 * 3.2
        assert_eq!(compute(OperationKind::MulByConstant), NumberPair::new(4.8, 0.3));
        // 4 * 0.3
        let reversed = UncertaintyElement::new(OperationKind::MulByConstantReversed, 2.0, 0.3);
        assert_eq!(reversed.compute_with(NumberPair::new(4.0, 0.1)), NumberPair::new(8.0, 1.0));
        // 1.5 / 3.2 = 0.46875, 0.1 / 3.2 = 0.03125
        assert_eq!(compute(OperationKind::DivByConstant), NumberPair::new(0.47, 0.03));
        // 3.2 / 1.5 = 2.133, 0.3 / 1.5 = 0.2
        assert_eq!(compute(OperationKind::DivByConstantReversed), NumberPair::new(2.1, 0.2));
    }

    #[test]
    fn by_constant_zero() {
        let e = UncertaintyElement::new(OperationKind::DivByConstant, 0.0, 0.1);
        assert!(e.compute_with(NumberPair::new(2.0, 0.1)).is_nan());
        let e = UncertaintyElement::new(OperationKind::DivByConstantReversed, 2.0, 0.1);
        assert!(e.compute_with(NumberPair::ZERO).is_nan());
    }

    #[test]
    fn invalid_passes_cumulative_through() {
        assert_eq!(compute(OperationKind::Invalid), NumberPair::new(1.5, 0.1));
        let invalid = UncertaintyElement::invalid();
        assert_eq!(invalid.kind(), OperationKind::Invalid);
        assert!(invalid.value().is_nan());
        assert!(invalid.compute().is_nan());
    }

    #[test]
    fn inputs_are_simplified() {
        // 1.54 ± 0.1 -> 1.5 ± 0.1, 3.249 ± 0.3 -> 3.2 ± 0.3
        let e = UncertaintyElement::with_cumulative(
            OperationKind::Add,
            NumberPair::new(3.249, 0.3),
            NumberPair::new(1.54, 0.1),
        );
        assert_eq!(e.compute(), NumberPair::new(4.7, 0.4));
    }

    #[test]
    fn poisoned() {
        let mut e = UncertaintyElement::new(OperationKind::Add, 3.2, 0.3);
        e.poison();
        assert!(e.is_poisoned());
        assert_eq!(e.kind(), OperationKind::Invalid);
        assert!(e.value().is_nan());
        assert!(e.uncertainty().is_nan());
        assert!(e.compute().is_nan());
        // Recovers with a defined cumulative
        e.set_cumulative(NumberPair::new(1.5, 0.1));
        assert!(!e.is_poisoned());
        assert_eq!(e.kind(), OperationKind::Add);
        assert_eq!(e.compute(), NumberPair::new(4.7, 0.4));
    }

    #[test]
    fn start_never_poisoned() {
        let mut e = UncertaintyElement::new(OperationKind::Start, 3.2, 0.3);
        e.poison();
        assert!(!e.is_poisoned());
        assert_eq!(e.compute(), NumberPair::new(3.2, 0.3));
    }

    #[test]
    fn setters() {
        let mut e = UncertaintyElement::new(OperationKind::Add, 3.2, 0.3);
        e.set_value(5.0);
        assert_eq!(e.operand(), NumberPair::new(5.0, 0.3));
        e.set_uncertainty(-0.2);
        assert_eq!(e.operand(), NumberPair::new(5.0, 0.2));
        e.set_operand(NumberPair::new(1.0, 0.1));
        e.set_kind(OperationKind::Mul);
        assert_eq!(e.kind(), OperationKind::Mul);
        assert_eq!(e.value(), 1.0);
    }
}
