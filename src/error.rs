// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from the text entry points of the crate.
///
/// The numeric core itself never fails; undefined results are signalled with
/// NaN instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UasfError {
    #[error("Failed to parse: {0}")]
    Parse(String),
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
    #[error("Unexpected character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("Second decimal separator at position {position}")]
    RepeatedSeparator { position: usize },
}
