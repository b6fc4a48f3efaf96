// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::{
    fmt,
    ops::{Add, Div, Mul, Sub},
    str::FromStr,
    sync::LazyLock,
};

use num_traits::{FromPrimitive, Pow, Zero};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{OperationKind, element, error::UasfError, rounding};

/// A measured value together with its absolute uncertainty.
///
/// The uncertainty is never negative; a negative uncertainty passed to a
/// constructor is stored as its absolute value.
/// A pair containing NaN represents an undefined result.
///
/// Arithmetic operators propagate the uncertainty with the same formulas as
/// the rows of an [`UncertaintyChain`](crate::UncertaintyChain), so both
/// operands and the result are rounded to one significant figure of
/// uncertainty.
///
/// # Example
///
/// ```
/// # use uasf::NumberPair;
/// #
/// let length = NumberPair::new(1.5, 0.1);
/// let width = NumberPair::new(3.2, 0.3);
/// assert_eq!(length + width, NumberPair::new(4.7, 0.4));
/// assert_eq!((length + width).to_string(), "4.7 ± 0.4");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct NumberPair {
    value: f64,
    uncertainty: f64,
}

impl NumberPair {
    /// A constant representing 0 ± 0.
    pub const ZERO: NumberPair = NumberPair {
        value: 0.0,
        uncertainty: 0.0,
    };

    /// The undefined result, NaN ± NaN.
    pub const INVALID: NumberPair = NumberPair {
        value: f64::NAN,
        uncertainty: f64::NAN,
    };

    #[inline]
    pub fn new(value: f64, uncertainty: f64) -> Self {
        Self {
            value,
            uncertainty: uncertainty.abs(),
        }
    }

    /// Creates a pair with no uncertainty.
    #[inline]
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            uncertainty: 0.0,
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the absolute uncertainty.
    ///
    /// The uncertainty is always positive.
    #[inline]
    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

    /// Returns the uncertainty relative to the magnitude of the value.
    ///
    /// This is infinite or NaN for a value of zero.
    #[inline]
    pub fn relative_uncertainty(&self) -> f64 {
        self.uncertainty / self.value.abs()
    }

    /// Returns true if the `NumberPair` has an uncertainty of zero.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.uncertainty == 0.0
    }

    /// Returns true if either the value or the uncertainty is NaN.
    #[inline]
    pub fn is_nan(&self) -> bool {
        self.value.is_nan() || self.uncertainty.is_nan()
    }

    /// Rounds the pair to one significant figure of uncertainty.
    ///
    /// See [`simplify`](crate::simplify).
    #[inline]
    pub fn simplified(&self) -> Self {
        rounding::simplify(self.value, self.uncertainty)
    }

    /// Applies an operation with `self` as the running result and `operand` as
    /// the new measurement.
    ///
    /// For example `a.combine(OperationKind::Sub, b)` is `a − b`, while
    /// `a.combine(OperationKind::SubReversed, b)` is `b − a`.
    pub fn combine(self, kind: OperationKind, operand: NumberPair) -> NumberPair {
        element::propagate(kind, self, operand)
    }

    /// Returns the simplified value and uncertainty as decimals, both given to
    /// the decimal place of the uncertainty.
    ///
    /// Returns `None` for undefined pairs and for values outside the range of
    /// `Decimal`.
    pub fn to_decimal(&self) -> Option<(Decimal, Decimal)> {
        let (value, uncertainty, _) = self.decimal_parts()?;
        Some((value, uncertainty))
    }

    /// The simplified pair as decimals along with the number of decimal places
    /// to display.
    fn decimal_parts(&self) -> Option<(Decimal, Decimal, u32)> {
        let simplified = self.simplified();
        if simplified.is_nan() {
            return None;
        }
        let value = Decimal::from_f64(simplified.value)?;
        if simplified.is_exact() {
            return Some((value.normalize(), Decimal::ZERO, value.normalize().scale()));
        }
        let places = (-rounding::decimal_exponent(simplified.uncertainty)?).max(0) as u32;
        let strategy = RoundingStrategy::MidpointAwayFromZero;
        let value = value.round_dp_with_strategy(places, strategy);
        let uncertainty =
            Decimal::from_f64(simplified.uncertainty)?.round_dp_with_strategy(places, strategy);
        Some((value, uncertainty, places))
    }
}

impl From<(f64, f64)> for NumberPair {
    #[inline]
    fn from((value, uncertainty): (f64, f64)) -> Self {
        Self::new(value, uncertainty)
    }
}

impl From<NumberPair> for (f64, f64) {
    #[inline]
    fn from(pair: NumberPair) -> (f64, f64) {
        (pair.value, pair.uncertainty)
    }
}

impl From<f64> for NumberPair {
    #[inline]
    fn from(value: f64) -> Self {
        Self::exact(value)
    }
}

impl Zero for NumberPair {
    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    /// Returns true if the value is equal to zero, regardless of any
    /// uncertainty.
    #[inline]
    fn is_zero(&self) -> bool {
        self.value == 0.0
    }
}

impl Add for NumberPair {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(OperationKind::Add, rhs)
    }
}

impl Sub for NumberPair {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.combine(OperationKind::Sub, rhs)
    }
}

impl Mul for NumberPair {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.combine(OperationKind::Mul, rhs)
    }
}

impl Div for NumberPair {
    type Output = Self;

    /// Divides, giving NaN ± NaN for a divisor of zero.
    fn div(self, rhs: Self) -> Self {
        self.combine(OperationKind::Div, rhs)
    }
}

impl Pow<Self> for NumberPair {
    type Output = Self;

    fn pow(self, rhs: Self) -> Self {
        self.combine(OperationKind::Pow, rhs)
    }
}

impl fmt::Display for NumberPair {
    /// Formats the pair to the precision of its uncertainty, e.g. `4.7 ± 0.4`.
    ///
    /// The alternate form uses concise notation, e.g. `4.7(4)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return write!(f, "NaN");
        }
        if !self.value.is_finite() || !self.uncertainty.is_finite() {
            return write!(f, "{} ± {}", self.value, self.uncertainty);
        }
        if self.is_exact() {
            return write!(f, "{}", self.value);
        }
        let Some((value, uncertainty, places)) = self.decimal_parts() else {
            // Out of the range of `Decimal`
            let simplified = self.simplified();
            return write!(f, "{:e} ± {:e}", simplified.value, simplified.uncertainty);
        };
        let places = places as usize;
        if uncertainty.is_zero() {
            write!(f, "{value}")
        } else if f.alternate() {
            let mut digits = uncertainty;
            digits.set_scale(0).map_err(|_e| fmt::Error)?;
            write!(f, "{value:.places$}({})", digits.normalize())
        } else {
            write!(f, "{value:.places$} ± {uncertainty:.places$}")
        }
    }
}

// Concise notation, e.g. "4.70(12)e3"
static CONCISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(\d+)(?:[.,](\d+))?\((\d+)\)(?:[eE]([+-]?\d+))?$")
        .expect("pattern is valid")
});

static PLUS_MINUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([+-]?[\d.,]+(?:[eE][+-]?\d+)?)(?:\s*(?:±|\+/-|\+-)\s*([\d.,]+(?:[eE][+-]?\d+)?))?$",
    )
    .expect("pattern is valid")
});

fn parse_number(s: &str, whole: &str) -> Result<f64, UasfError> {
    s.replace(',', ".")
        .parse::<f64>()
        .map_err(|_e| UasfError::Parse(whole.into()))
}

impl FromStr for NumberPair {
    type Err = UasfError;

    /// Parses `4.7`, `4.7 ± 0.4`, `4.7 +/- 0.4`, `4.7+-0.4` or `4.7(4)`.
    ///
    /// Either `.` or `,` may be used as the decimal separator.
    /// The parsed pair is not simplified.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(caps) = CONCISE.captures(trimmed) {
            // Example given with "-4.70(12)e3"
            let sign = caps.get(1).map_or("", |m| m.as_str()); // "-"
            let int = caps.get(2).map_or("", |m| m.as_str()); // "4"
            let frac = caps.get(3).map_or("", |m| m.as_str()); // "70"
            let uncertainty = caps.get(4).map_or("", |m| m.as_str()); // "12"
            let exponent = caps
                .get(5)
                .map_or(Ok(0), |m| i32::from_str(m.as_str()))
                .map_err(|_e| UasfError::Parse(s.into()))?; // 3
            let value = parse_number(&format!("{sign}{int}.{frac}0e{exponent}"), s)?;
            // The uncertainty is in units of the last decimal place
            let uncertainty_exponent = i32::try_from(frac.len())
                .ok()
                .and_then(|places| exponent.checked_sub(places))
                .ok_or(UasfError::Parse(s.into()))?; // 1
            let uncertainty = parse_number(&format!("{uncertainty}e{uncertainty_exponent}"), s)?;
            return Ok(Self::new(value, uncertainty));
        }
        let caps = PLUS_MINUS
            .captures(trimmed)
            .ok_or(UasfError::Parse(s.into()))?;
        let value = caps
            .get(1)
            .map_or(Err(UasfError::Parse(s.into())), |m| parse_number(m.as_str(), s))?;
        let uncertainty = caps
            .get(2)
            .map_or(Ok(0.0), |m| parse_number(m.as_str(), s))?;
        Ok(Self::new(value, uncertainty))
    }
}
