// SPDX-License-Identifier: CC0-1.0

//! # Function-like Expression Language
//!
//! Descriptors and miniscripts share one surface syntax: a name optionally
//! followed by a parenthesised, comma-separated list of sub-expressions.
//! This module parses that syntax into a [`Tree`] of borrowed names, keeping
//! the byte position of every node so that callers can report the exact
//! offending text.

mod error;

use core::fmt;

pub use self::error::{ParseNumError, ParseTreeError};

/// Maximum nesting of sub-expressions.
pub const MAX_RECURSION_DEPTH: usize = 402;

/// Allowed characters are descriptor strings.
pub const INPUT_CHARSET: &str = "0123456789()[],'/*abcdefgh@:$%{}IJKLMNOPQRSTUVWXYZ&+-.;<=>?!^_|~ijklmnopqrstuvwxyzABCDEFGH`#\"\\ ";

/// Map of valid characters in descriptor strings to their position in [`INPUT_CHARSET`].
#[rustfmt::skip]
pub const VALID_CHARS: [Option<u8>; 128] = [
    None, None, None, None, None, None, None, None, None, None, None, None, None,
    None, None, None, None, None, None, None, None, None, None, None, None, None,
    None, None, None, None, None, None, Some(94), Some(59), Some(92), Some(91),
    Some(28), Some(29), Some(50), Some(15), Some(10), Some(11), Some(17), Some(51),
    Some(14), Some(52), Some(53), Some(16), Some(0), Some(1), Some(2), Some(3),
    Some(4), Some(5), Some(6), Some(7), Some(8), Some(9), Some(27), Some(54),
    Some(55), Some(56), Some(57), Some(58), Some(26), Some(82), Some(83),
    Some(84), Some(85), Some(86), Some(87), Some(88), Some(89), Some(32), Some(33),
    Some(34), Some(35), Some(36), Some(37), Some(38), Some(39), Some(40), Some(41),
    Some(42), Some(43), Some(44), Some(45), Some(46), Some(47), Some(48), Some(49),
    Some(12), Some(93), Some(13), Some(60), Some(61), Some(90), Some(18), Some(19),
    Some(20), Some(21), Some(22), Some(23), Some(24), Some(25), Some(64), Some(65),
    Some(66), Some(67), Some(68), Some(69), Some(70), Some(71), Some(72), Some(73),
    Some(74), Some(75), Some(76), Some(77), Some(78), Some(79), Some(80), Some(81),
    Some(30), Some(62), Some(31), Some(63), None,
];

/// A node of the form `name(args...)` or `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree<'a> {
    /// The name before the parenthesis.
    pub name: &'a str,
    /// Byte offset of `name` in the parsed string.
    pub pos: usize,
    /// The comma-separated contents of the `(...)`, if any.
    pub args: Vec<Tree<'a>>,
}

impl<'a> Tree<'a> {
    /// Parses a complete expression.
    #[allow(clippy::should_implement_trait)] // Cannot use std::str::FromStr because of lifetimes.
    pub fn from_str(s: &'a str) -> Result<Tree<'a>, ParseTreeError> {
        check_valid_chars(s)?;

        let (top, end) = Self::parse_node(s, 0, 0)?;
        match s[end..].chars().next() {
            None => Ok(top),
            Some(')') => Err(ParseTreeError::UnmatchedCloseParen { pos: end }),
            Some(ch) => Err(ParseTreeError::TrailingCharacter { ch, pos: end }),
        }
    }

    fn parse_node(s: &'a str, start: usize, depth: usize) -> Result<(Tree<'a>, usize), ParseTreeError> {
        if depth >= MAX_RECURSION_DEPTH {
            return Err(ParseTreeError::MaxRecursionDepthExceeded { maximum: MAX_RECURSION_DEPTH });
        }

        let bytes = s.as_bytes();
        let mut end = start;
        while end < bytes.len() && !matches!(bytes[end], b'(' | b',' | b')') {
            end += 1;
        }
        let mut node = Tree { name: &s[start..end], pos: start, args: vec![] };
        if end == bytes.len() || bytes[end] != b'(' {
            return Ok((node, end));
        }

        let open = end;
        let mut cursor = open + 1;
        loop {
            let (arg, next) = Self::parse_node(s, cursor, depth + 1)?;
            node.args.push(arg);
            match bytes.get(next) {
                Some(b',') => cursor = next + 1,
                Some(b')') => return Ok((node, next + 1)),
                Some(&ch) => {
                    return Err(ParseTreeError::ExpectedParenOrComma { ch: ch as char, pos: next })
                }
                None => return Err(ParseTreeError::UnmatchedOpenParen { pos: open }),
            }
        }
    }

    /// Whether this node has no arguments.
    pub fn is_terminal(&self) -> bool { self.args.is_empty() }

    /// Splits a `w:frag` name into its wrapper prefix and the fragment name.
    ///
    /// Names without a colon have an empty wrapper prefix.
    pub fn wrappers(&self) -> (&'a str, &'a str) {
        match self.name.find(':') {
            Some(idx) => (&self.name[..idx], &self.name[idx + 1..]),
            None => ("", self.name),
        }
    }
}

impl<'a> fmt::Display for Tree<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                fmt::Display::fmt(arg, f)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Rejects characters outside of [`INPUT_CHARSET`].
///
/// Everything downstream byte-indexes strings, so non-ASCII is ruled out here.
pub fn check_valid_chars(s: &str) -> Result<(), ParseTreeError> {
    for (pos, ch) in s.char_indices() {
        if !ch.is_ascii() || VALID_CHARS[ch as usize].is_none() {
            return Err(ParseTreeError::InvalidCharacter { ch, pos });
        }
    }
    Ok(())
}

/// Parses a string as a u32, for timelocks or thresholds.
pub fn parse_num(s: &str) -> Result<u32, ParseNumError> {
    let first = s.chars().next().ok_or(ParseNumError::Empty)?;
    if let Some(ch) = s.chars().find(|ch| !ch.is_ascii_digit()) {
        return Err(ParseNumError::InvalidCharacter(ch));
    }
    if s.len() > 1 && first == '0' {
        return Err(ParseNumError::LeadingZero);
    }
    s.parse::<u32>().map_err(|_| ParseNumError::Overflow)
}
