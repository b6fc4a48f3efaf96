// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

//! Rounding of a value to the precision warranted by its uncertainty.
//!
//! The rounding works on the decimal digits of the shortest representation of
//! each float, so that `2.35` is treated as the numeral the user typed rather
//! than as the binary fraction `2.34999…` that is actually stored.

use crate::NumberPair;

/// The number of decimal digits an `f64` can hold without loss.
///
/// A value whose leading digit lies further than this above the uncertainty's
/// leading digit is treated as exact.
pub const PRECISION_DIGITS: i32 = f64::DIGITS as i32;

/// Rounds a value and its uncertainty to one significant figure of
/// uncertainty.
///
/// The uncertainty is rounded to one significant figure (half away from
/// zero), and the value is rounded (half away from zero) to the decimal place
/// of that figure.
///
/// - If either input is NaN or infinite, both outputs are NaN.
/// - An uncertainty of zero leaves the value untouched.
/// - If the uncertainty is larger in magnitude than the value, the value
///   becomes 0.
/// - If the uncertainty is too small to affect any representable digit of the
///   value, the value is kept as is and the uncertainty becomes 0.
///
/// The returned uncertainty is never negative.
///
/// # Example
///
/// ```
/// # use uasf::simplify;
/// #
/// let pair = simplify(1.2355, 0.02);
/// assert_eq!(pair.value(), 1.24);
/// assert_eq!(pair.uncertainty(), 0.02);
/// let pair = simplify(10.0, 0.25);
/// assert_eq!(pair.uncertainty(), 0.3);
/// ```
pub fn simplify(value: f64, uncertainty: f64) -> NumberPair {
    if !value.is_finite() || !uncertainty.is_finite() {
        return NumberPair::INVALID;
    }
    let uncertainty = uncertainty.abs();
    if uncertainty == 0.0 {
        return NumberPair::exact(value);
    }
    let (Some(uncertainty_digits), Some(mut value_digits)) =
        (one_figure(uncertainty), DecimalDigits::from_f64(value))
    else {
        return NumberPair::INVALID;
    };
    let uncertainty_exponent = uncertainty_digits.exponent();
    let value_exponent = value_digits.exponent();
    let rounded_uncertainty = uncertainty_digits.to_f64();
    if uncertainty_exponent > value_exponent {
        NumberPair::new(0.0, rounded_uncertainty)
    } else if value_exponent - uncertainty_exponent > PRECISION_DIGITS {
        NumberPair::exact(value)
    } else {
        value_digits.round_to_place(uncertainty_exponent);
        let rounded_value = value_digits.to_f64();
        if rounded_value.is_finite() {
            NumberPair::new(rounded_value, rounded_uncertainty)
        } else {
            // Rounded up past f64::MAX
            NumberPair::INVALID
        }
    }
}

/// Returns the decimal exponent of the leading digit of `number`, as it would
/// be written in scientific notation.
///
/// Zero has an exponent of 0. Non-finite numbers have none.
pub(crate) fn decimal_exponent(number: f64) -> Option<i32> {
    DecimalDigits::from_f64(number).map(|digits| digits.exponent())
}

/// Rounds a (positive, finite) uncertainty to one significant figure.
fn one_figure(uncertainty: f64) -> Option<DecimalDigits> {
    let shortest = DecimalDigits::from_f64(uncertainty)?;
    // The formatter rounds exact ties to even, so nudge a second figure of 5
    // upwards to get half away from zero
    let corrected = if shortest.digit(1) == 5 {
        uncertainty + 10_f64.powi(shortest.exponent() - 1)
    } else {
        uncertainty
    };
    DecimalDigits::parse_scientific(&format!("{corrected:.0e}"), false)
}

/// The decimal digits of a number in scientific notation, i.e. `d.ddd × 10^n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DecimalDigits {
    negative: bool,
    // Most significant first, never empty
    digits: Vec<u8>,
    // Exponent of the first digit
    exponent: i32,
}

impl DecimalDigits {
    #[cfg(test)]
    fn new(negative: bool, digits: Vec<u8>, exponent: i32) -> Self {
        Self {
            negative,
            digits,
            exponent,
        }
    }

    /// Takes the digits of the shortest representation that round-trips to
    /// `number`.
    pub(crate) fn from_f64(number: f64) -> Option<Self> {
        if !number.is_finite() {
            return None;
        }
        Self::parse_scientific(&format!("{:e}", number.abs()), number.is_sign_negative())
    }

    /// Parses the unsigned output of the `{:e}` formatter, e.g. `"4.71e-3"`.
    fn parse_scientific(s: &str, negative: bool) -> Option<Self> {
        let (mantissa, exponent) = s.split_once('e')?;
        let exponent = exponent.parse().ok()?;
        let digits = mantissa
            .bytes()
            .filter(|b| *b != b'.')
            .map(|b| b.wrapping_sub(b'0'))
            .collect::<Vec<u8>>();
        if digits.is_empty() || digits.iter().any(|d| *d > 9) {
            return None;
        }
        Some(Self {
            negative,
            digits,
            exponent,
        })
    }

    #[inline]
    pub(crate) fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Returns the digit at `index`, counting from the most significant.
    /// Digits past the end are 0.
    #[inline]
    pub(crate) fn digit(&self, index: usize) -> u8 {
        self.digits.get(index).copied().unwrap_or(0)
    }

    /// Rounds half away from zero so that the last kept digit is in the
    /// 10<sup><i>place</i></sup> position.
    pub(crate) fn round_to_place(&mut self, place: i32) {
        let keep = self.exponent - place + 1;
        if keep < 0 {
            // Less than half a unit in that place
            self.digits = vec![0];
            self.exponent = place;
        } else {
            self.round_half_up(keep as usize);
        }
    }

    /// Keeps the first `keep` digits, rounding the magnitude half up.
    pub(crate) fn round_half_up(&mut self, keep: usize) {
        if self.digits.len() <= keep {
            return;
        }
        let round_up = self.digits[keep] >= 5;
        self.digits.truncate(keep);
        if round_up {
            self.carry();
        }
        if self.digits.is_empty() {
            self.digits.push(0);
        }
    }

    /// Adds one to the last digit.
    fn carry(&mut self) {
        for digit in self.digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                return;
            }
        }
        // Every digit was a nine, e.g. 9.99 -> 10.00
        self.digits.insert(0, 1);
        self.exponent += 1;
    }

    pub(crate) fn to_f64(&self) -> f64 {
        let mut s = String::with_capacity(self.digits.len() + 8);
        if self.negative {
            s.push('-');
        }
        for (i, digit) in self.digits.iter().enumerate() {
            if i == 1 {
                s.push('.');
            }
            s.push(char::from(b'0' + digit));
        }
        s.push('e');
        s.push_str(&self.exponent.to_string());
        s.parse().unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_from_f64() {
        assert_eq!(
            DecimalDigits::from_f64(4.71e-3),
            Some(DecimalDigits::new(false, vec![4, 7, 1], -3))
        );
        assert_eq!(
            DecimalDigits::from_f64(-1234.0),
            Some(DecimalDigits::new(true, vec![1, 2, 3, 4], 3))
        );
        assert_eq!(
            DecimalDigits::from_f64(0.0),
            Some(DecimalDigits::new(false, vec![0], 0))
        );
        assert_eq!(DecimalDigits::from_f64(f64::NAN), None);
        assert_eq!(DecimalDigits::from_f64(f64::NEG_INFINITY), None);
    }

    #[test]
    fn round_down() {
        let mut d = DecimalDigits::new(false, vec![1, 2, 3, 4, 5], 0);
        d.round_half_up(3);
        assert_eq!(d, DecimalDigits::new(false, vec![1, 2, 3], 0));
        assert_eq!(d.to_f64(), 1.23);
    }

    #[test]
    fn round_half_up_on_five() {
        let mut d = DecimalDigits::new(false, vec![1, 2, 3, 5], 0);
        d.round_half_up(3);
        assert_eq!(d.to_f64(), 1.24);
    }

    #[test]
    fn carry_through_nines() {
        let mut d = DecimalDigits::new(false, vec![1, 2, 9, 9, 7], 2);
        d.round_half_up(4);
        assert_eq!(d, DecimalDigits::new(false, vec![1, 3, 0, 0], 2));
        assert_eq!(d.to_f64(), 130.0);
    }

    #[test]
    fn carry_all_nines() {
        let mut d = DecimalDigits::new(false, vec![9, 9, 9, 6], 0);
        d.round_half_up(3);
        assert_eq!(d, DecimalDigits::new(false, vec![1, 0, 0, 0], 1));
        assert_eq!(d.to_f64(), 10.0);
        // Sign survives the carry
        let mut d = DecimalDigits::new(true, vec![9, 9, 5], -1);
        d.round_half_up(2);
        assert_eq!(d, DecimalDigits::new(true, vec![1, 0, 0], 0));
        assert_eq!(d.to_f64(), -1.0);
    }

    #[test]
    fn round_to_place() {
        let mut d = DecimalDigits::new(false, vec![7], -1);
        d.round_to_place(0);
        assert_eq!(d.to_f64(), 1.0);
        let mut d = DecimalDigits::new(false, vec![3], -3);
        d.round_to_place(0);
        assert_eq!(d.to_f64(), 0.0);
        let mut d = DecimalDigits::new(false, vec![4, 5, 6], 1);
        d.round_to_place(-2);
        assert_eq!(d.to_f64(), 45.6);
    }

    #[test]
    fn exact_uncertainty_is_untouched() {
        assert_eq!(simplify(4.7, 0.0), NumberPair::exact(4.7));
        assert_eq!(simplify(-0.123456789, 0.0), NumberPair::exact(-0.123456789));
    }

    #[test]
    fn non_finite_is_invalid() {
        assert!(simplify(f64::NAN, 0.1).is_nan());
        assert!(simplify(1.0, f64::INFINITY).is_nan());
        assert!(simplify(f64::NEG_INFINITY, 0.0).is_nan());
    }

    #[test]
    fn value_rounded_to_uncertainty() {
        assert_eq!(simplify(1.2345, 0.02), NumberPair::new(1.23, 0.02));
        assert_eq!(simplify(1.2355, 0.02), NumberPair::new(1.24, 0.02));
        assert_eq!(simplify(3.2, 0.3), NumberPair::new(3.2, 0.3));
        assert_eq!(simplify(12.3, 0.95), NumberPair::new(12.0, 1.0));
        assert_eq!(simplify(-987.65, 4.0), NumberPair::new(-988.0, 4.0));
    }

    #[test]
    fn uncertainty_rounded_half_up() {
        assert_eq!(simplify(10.0, 0.25).uncertainty(), 0.3);
        assert_eq!(simplify(10.0, 0.35).uncertainty(), 0.4);
        assert_eq!(simplify(10.0, 0.15).uncertainty(), 0.2);
        assert_eq!(simplify(10.0, 0.24).uncertainty(), 0.2);
        assert_eq!(simplify(10.0, 0.0951).uncertainty(), 0.1);
    }

    #[test]
    fn carry_in_value() {
        assert_eq!(simplify(9.996, 0.05), NumberPair::new(10.0, 0.05));
        assert_eq!(simplify(-9.996, 0.05), NumberPair::new(-10.0, 0.05));
        assert_eq!(simplify(99.7, 9.6), NumberPair::new(100.0, 10.0));
    }

    #[test]
    fn uncertainty_larger_than_value() {
        assert_eq!(simplify(4.7, 12.0), NumberPair::new(0.0, 10.0));
        assert_eq!(simplify(-0.03, 0.5), NumberPair::new(0.0, 0.5));
    }

    #[test]
    fn negligible_uncertainty() {
        assert_eq!(simplify(1.0e10, 1.0e-9), NumberPair::exact(1.0e10));
        assert_eq!(simplify(1.234, 1.0e-20), NumberPair::exact(1.234));
    }

    #[test]
    fn negligible_cutoff() {
        // Leading digits 15 places apart, still rounded
        assert_eq!(
            simplify(123456789012345.67, 0.3),
            NumberPair::new(123456789012345.7, 0.3)
        );
        // 16 places apart
        let value = 1234567890123456.7;
        assert_eq!(simplify(value, 0.3), NumberPair::exact(value));
    }

    #[test]
    fn rounding_past_max_is_invalid() {
        assert!(simplify(f64::MAX, 1e308).is_nan());
        assert!(simplify(-f64::MAX, 1e308).is_nan());
    }

    #[test]
    fn negative_uncertainty() {
        assert_eq!(simplify(4.7, -0.3), NumberPair::new(4.7, 0.3));
        assert!(simplify(4.7, -0.3).uncertainty() > 0.0);
    }

    #[test]
    fn zero_value() {
        assert_eq!(simplify(0.0, 0.3), NumberPair::new(0.0, 0.3));
        assert_eq!(simplify(0.0, 30.0), NumberPair::new(0.0, 30.0));
    }

    #[test]
    fn exponents() {
        assert_eq!(decimal_exponent(4.7), Some(0));
        assert_eq!(decimal_exponent(0.04), Some(-2));
        assert_eq!(decimal_exponent(-123.0), Some(2));
        assert_eq!(decimal_exponent(f64::NAN), None);
    }
}
