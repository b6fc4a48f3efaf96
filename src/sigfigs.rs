// SPDX-FileCopyrightText: 2025 Matthew Milner <matterhorn103@proton.me>
// SPDX-License-Identifier: MIT

//! Counting the significant figures of a written numeral.

use crate::error::UasfError;

/// Returns the number of significant figures in a decimal numeral.
///
/// Either `.` or `,` is accepted as the decimal separator. A malformed
/// numeral (a second separator, a sign, an exponent, or any other character
/// that is not a digit) has 0 significant figures.
///
/// Zeros at the end of an integer are not counted, since they may only be
/// placeholders, but zeros after the separator are.
///
/// # Example
///
/// ```
/// # use uasf::sigfigs;
/// #
/// assert_eq!(sigfigs::count("100"), 1);
/// assert_eq!(sigfigs::count("100.0"), 4);
/// assert_eq!(sigfigs::count("0.0012"), 2);
/// assert_eq!(sigfigs::count("1.2.3"), 0);
/// ```
pub fn count(s: &str) -> u32 {
    try_count(s).unwrap_or(0)
}

/// Like [`count`], but reports where a malformed numeral went wrong.
pub fn try_count(s: &str) -> Result<u32, UasfError> {
    let mut seen_separator = false;
    let mut significant: u32 = 0;
    // Zeros after a significant digit whose status is not yet known
    let mut pending_zeros: u32 = 0;
    for (position, character) in s.chars().enumerate() {
        match character {
            '.' | ',' => {
                if seen_separator {
                    return Err(UasfError::RepeatedSeparator { position });
                }
                seen_separator = true;
            }
            '0' => {
                if significant == 0 {
                    // Leading zero
                } else if seen_separator {
                    significant += pending_zeros + 1;
                    pending_zeros = 0;
                } else {
                    pending_zeros += 1;
                }
            }
            '1'..='9' => {
                significant += pending_zeros + 1;
                pending_zeros = 0;
            }
            _ => return Err(UasfError::InvalidCharacter { character, position }),
        }
    }
    Ok(significant)
}
