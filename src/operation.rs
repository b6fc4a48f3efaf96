// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use std::{fmt, str::FromStr};

use crate::error::UasfError;

/// The arithmetic relationship between the running result of a chain (the
/// cumulative) and the measurement on a row (the operand).
///
/// "Reversed" kinds swap the roles of the two, so `Sub` is
/// _cumulative − operand_ while `SubReversed` is _operand − cumulative_.
///
/// The `ByConstant` kinds treat the operand as an exact constant when
/// propagating uncertainty; the reversed forms instead scale the operand's
/// uncertainty by the cumulative value.
///
/// Serialized as its kebab-case name, e.g. `"sub-reversed"`.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub enum OperationKind {
    /// Sets the result to the operand, ignoring any cumulative.
    /// Only the first row of a chain has this kind.
    Start,
    Add,
    Sub,
    SubReversed,
    Mul,
    Div,
    DivReversed,
    Pow,
    PowReversed,
    MulByConstant,
    MulByConstantReversed,
    DivByConstant,
    DivByConstantReversed,
    /// Marks an undefined row. Never chosen by a user.
    Invalid,
}

impl OperationKind {
    /// The kinds that may be chosen for a row after the first.
    pub const SELECTABLE: [OperationKind; 12] = [
        OperationKind::Add,
        OperationKind::Sub,
        OperationKind::SubReversed,
        OperationKind::Mul,
        OperationKind::Div,
        OperationKind::DivReversed,
        OperationKind::Pow,
        OperationKind::PowReversed,
        OperationKind::MulByConstant,
        OperationKind::MulByConstantReversed,
        OperationKind::DivByConstant,
        OperationKind::DivByConstantReversed,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            OperationKind::Start => "start",
            OperationKind::Add => "add",
            OperationKind::Sub => "sub",
            OperationKind::SubReversed => "sub-reversed",
            OperationKind::Mul => "mul",
            OperationKind::Div => "div",
            OperationKind::DivReversed => "div-reversed",
            OperationKind::Pow => "pow",
            OperationKind::PowReversed => "pow-reversed",
            OperationKind::MulByConstant => "mul-const",
            OperationKind::MulByConstantReversed => "mul-const-reversed",
            OperationKind::DivByConstant => "div-const",
            OperationKind::DivByConstantReversed => "div-const-reversed",
            OperationKind::Invalid => "invalid",
        }
    }

    /// Returns the operator symbol of the basic kinds.
    pub const fn symbol(self) -> Option<char> {
        match self {
            OperationKind::Add => Some('+'),
            OperationKind::Sub => Some('-'),
            OperationKind::Mul => Some('*'),
            OperationKind::Div => Some('/'),
            OperationKind::Pow => Some('^'),
            _ => None,
        }
    }

    /// Returns true for every kind except `Start` and `Invalid`.
    #[inline]
    pub const fn is_selectable(self) -> bool {
        !matches!(self, OperationKind::Start | OperationKind::Invalid)
    }

    #[inline]
    pub const fn is_reversed(self) -> bool {
        matches!(
            self,
            OperationKind::SubReversed
                | OperationKind::DivReversed
                | OperationKind::PowReversed
                | OperationKind::MulByConstantReversed
                | OperationKind::DivByConstantReversed
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = UasfError;

    /// Parses a kind from its name (case-insensitive) or, for the basic kinds,
    /// its symbol.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        [OperationKind::Start, OperationKind::Invalid]
            .into_iter()
            .chain(OperationKind::SELECTABLE)
            .find(|kind| {
                kind.name() == name
                    || kind
                        .symbol()
                        .is_some_and(|symbol| name.len() == 1 && name.starts_with(symbol))
            })
            .ok_or_else(|| UasfError::UnknownOperation(s.into()))
    }
}
