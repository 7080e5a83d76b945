// SPDX-License-Identifier: CC0-1.0

//! Descriptor checksum
//!
//! A re-implementation of the function used by Bitcoin Core to calculate the
//! checksum of a descriptor, as specified in [BIP-380]. The polymod runs on
//! the `bech32` crate's checksum engine with the descriptor generator.
//!
//! [BIP-380]: <https://github.com/bitcoin/bips/blob/master/bip-0380.mediawiki>

use core::convert::TryFrom;
use core::fmt;
use core::iter::FromIterator;

use bech32::primitives::checksum::PackedFe32;
use bech32::{Checksum, Fe32};

use crate::expression::VALID_CHARS;

const CHECKSUM_LENGTH: usize = 8;
const CODE_LENGTH: usize = 32767;

/// Error validating or computing a descriptor checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    /// Character outside of the descriptor character set.
    InvalidCharacter {
        /// The character in question.
        ch: char,
        /// Its byte-index into the string.
        pos: usize,
    },
    /// A checksum was required but none was given.
    Missing,
    /// The checksum after `#` did not have 8 characters.
    InvalidLength(usize),
    /// The checksum did not match the body.
    Mismatch {
        /// Checksum computed from the body.
        expected: String,
        /// Checksum given after `#`.
        found: String,
    },
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ChecksumError::InvalidCharacter { ch, pos } => {
                write!(f, "invalid character `{}` (position {}) in checksummed text", ch, pos)
            }
            ChecksumError::Missing => f.write_str("descriptor checksum is missing"),
            ChecksumError::InvalidLength(len) => {
                write!(f, "checksum has {} characters, expected {}", len, CHECKSUM_LENGTH)
            }
            ChecksumError::Mismatch { ref expected, ref found } => {
                write!(f, "invalid checksum '{}', expected '{}'", found, expected)
            }
        }
    }
}

impl std::error::Error for ChecksumError {}

/// Computes the checksum of a descriptor body.
///
/// Note that this function does not check if the descriptor string is
/// syntactically correct or not. This only computes the checksum.
pub fn desc_checksum(desc: &str) -> Result<String, ChecksumError> {
    let mut eng = Engine::new();
    eng.input(desc)?;
    Ok(eng.checksum())
}

/// Whether `text` is of the form `body#checksum` with a correct checksum.
pub fn validate(text: &str) -> bool { verify_checksum(text, true).is_ok() }

/// Checks the checksum suffix, if present, and returns the body without it.
///
/// With `required` set a missing checksum is an error.
pub fn verify_checksum(s: &str, required: bool) -> Result<&str, ChecksumError> {
    let (body, checksum) = match s.find('#') {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let expected = desc_checksum(body)?;
    match checksum {
        Some(found) if found.len() != CHECKSUM_LENGTH => {
            Err(ChecksumError::InvalidLength(found.len()))
        }
        Some(found) if found != expected => {
            Err(ChecksumError::Mismatch { expected, found: found.to_owned() })
        }
        Some(_) => Ok(body),
        None if required => Err(ChecksumError::Missing),
        None => Ok(body),
    }
}

/// An engine to compute a checksum from a string.
pub struct Engine {
    inner: bech32::primitives::checksum::Engine<DescriptorChecksum>,
    cls: u64,
    clscount: u64,
    pos: usize,
}

impl Default for Engine {
    fn default() -> Engine { Engine::new() }
}

impl Engine {
    /// Constructs an engine with no input.
    pub fn new() -> Self {
        Engine { inner: bech32::primitives::checksum::Engine::new(), cls: 0, clscount: 0, pos: 0 }
    }

    /// Inputs some data into the checksum engine.
    ///
    /// On error the engine is left in an indeterminate state.
    pub fn input(&mut self, s: &str) -> Result<(), ChecksumError> {
        for ch in s.chars() {
            let pos = self.pos;
            self.pos += ch.len_utf8();
            let code = VALID_CHARS
                .get(ch as usize)
                .copied()
                .flatten()
                .ok_or(ChecksumError::InvalidCharacter { ch, pos })? as u64;

            self.inner.input_fe(fe32(code & 31));

            self.cls = self.cls * 3 + (code >> 5);
            self.clscount += 1;
            if self.clscount == 3 {
                self.inner.input_fe(fe32(self.cls));
                self.cls = 0;
                self.clscount = 0;
            }
        }
        Ok(())
    }

    /// The checksum characters of everything fed to the engine so far.
    pub fn checksum_chars(&mut self) -> [char; CHECKSUM_LENGTH] {
        if self.clscount > 0 {
            self.inner.input_fe(fe32(self.cls));
        }
        self.inner.input_target_residue();

        let mut chars = [0 as char; CHECKSUM_LENGTH];
        for (i, checksum_ch) in chars.iter_mut().enumerate() {
            let unpacked = self.inner.residue().unpack(CHECKSUM_LENGTH - 1 - i);
            *checksum_ch = fe32(u64::from(unpacked)).to_char();
        }
        chars
    }

    /// The checksum of everything fed to the engine so far.
    pub fn checksum(&mut self) -> String {
        String::from_iter(self.checksum_chars().iter().copied())
    }
}

// Every caller masks or bounds its input to 5 bits.
fn fe32(value: u64) -> Fe32 {
    Fe32::try_from(value & 31).unwrap_or(Fe32::Q)
}

/// The Output Script Descriptor checksum algorithm, defined in [BIP-380].
///
/// [BIP-380]: <https://github.com/bitcoin/bips/blob/master/bip-0380.mediawiki>
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum DescriptorChecksum {}

/// Generator coefficients, taken from BIP-380.
#[rustfmt::skip]
const GEN: [u64; 5] = [0xf5dee51989, 0xa9fdca3312, 0x1bab10e32d, 0x3706b1677a, 0x644d626ffd];

impl Checksum for DescriptorChecksum {
    type MidstateRepr = u64; // We need 40 bits (8 * 5).
    const CHECKSUM_LENGTH: usize = CHECKSUM_LENGTH;
    const CODE_LENGTH: usize = CODE_LENGTH;
    const GENERATOR_SH: [u64; 5] = GEN;
    const TARGET_RESIDUE: u64 = 1;
}

/// A wrapper around a `fmt::Formatter` which checksums everything written to it.
pub struct Formatter<'f, 'a> {
    fmt: &'f mut fmt::Formatter<'a>,
    eng: Engine,
}

impl<'f, 'a> Formatter<'f, 'a> {
    /// Contructs a new `Formatter`, wrapping a given `fmt::Formatter`.
    pub fn new(f: &'f mut fmt::Formatter<'a>) -> Self { Formatter { fmt: f, eng: Engine::new() } }

    /// Writes `#` and the checksum, unless the formatter has "alternate" display on.
    pub fn write_checksum_if_not_alt(&mut self) -> fmt::Result {
        use fmt::Write;
        if self.fmt.alternate() {
            return Ok(());
        }
        self.fmt.write_char('#')?;
        for ch in self.eng.checksum_chars().iter().copied() {
            self.fmt.write_char(ch)?;
        }
        Ok(())
    }
}

impl<'f, 'a> fmt::Write for Formatter<'f, 'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.fmt.write_str(s)?;
        self.eng.input(s).map_err(|_| fmt::Error)
    }
}
