// SPDX-License-Identifier: CC0-1.0

//! Expression-related errors

use core::fmt;

/// An error parsing an expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTreeError {
    /// Expression tree nesting exceeded the hard cap.
    MaxRecursionDepthExceeded {
        /// The maximum depth.
        maximum: usize,
    },
    /// Character outside of the descriptor character set.
    InvalidCharacter {
        /// The character in question.
        ch: char,
        /// Its byte-index into the string.
        pos: usize,
    },
    /// After a closing parenthesis only a comma or another closing parenthesis may follow.
    ExpectedParenOrComma {
        /// What we got instead.
        ch: char,
        /// Its byte-index into the string.
        pos: usize,
    },
    /// An opening parenthesis was never closed.
    UnmatchedOpenParen {
        /// Its byte-index into the string.
        pos: usize,
    },
    /// A closing parenthesis had no opening one.
    UnmatchedCloseParen {
        /// Its byte-index into the string.
        pos: usize,
    },
    /// Data occurred after the top-level expression.
    TrailingCharacter {
        /// The first trailing character.
        ch: char,
        /// Its byte-index into the string.
        pos: usize,
    },
}

impl fmt::Display for ParseTreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseTreeError::MaxRecursionDepthExceeded { maximum } => {
                write!(f, "maximum recursion depth {} exceeded", maximum)
            }
            ParseTreeError::InvalidCharacter { ch, pos } => {
                write!(f, "character `{}` (position {}) not allowed in descriptor", ch, pos)
            }
            ParseTreeError::ExpectedParenOrComma { ch, pos } => write!(
                f,
                "invalid character `{}` (position {}); expected comma or close-paren",
                ch, pos
            ),
            ParseTreeError::UnmatchedOpenParen { pos } => {
                write!(f, "`(` (position {}) not closed", pos)
            }
            ParseTreeError::UnmatchedCloseParen { pos } => {
                write!(f, "`)` (position {}) not opened", pos)
            }
            ParseTreeError::TrailingCharacter { ch, pos } => {
                write!(f, "trailing data `{}...` (position {})", ch, pos)
            }
        }
    }
}

impl std::error::Error for ParseTreeError {}

/// Error parsing a decimal number out of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNumError {
    /// Nothing to parse.
    Empty,
    /// Multi-digit numbers may not start with `0`.
    LeadingZero,
    /// Non-digit character.
    InvalidCharacter(char),
    /// Does not fit in 32 bits.
    Overflow,
}

impl fmt::Display for ParseNumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseNumError::Empty => f.write_str("expected a number, got nothing"),
            ParseNumError::LeadingZero => f.write_str("numbers may not have leading zeros"),
            ParseNumError::InvalidCharacter(ch) => write!(f, "invalid digit `{}`", ch),
            ParseNumError::Overflow => f.write_str("number does not fit in 32 bits"),
        }
    }
}

impl std::error::Error for ParseNumError {}
