// SPDX-License-Identifier: CC0-1.0

//! Errors
//!
//! Every failure surfaces as an [`Error`], which sorts it into one of a few
//! categories that callers handle differently: malformed text is fatal,
//! exceeded resource limits may be deliberately relaxed, and an
//! unsatisfiable spend is expected and recoverable once more signatures
//! arrive. Each category carries the literal input text that caused it.

use core::fmt;
use std::error;

use crate::descriptor::checksum::ChecksumError;
use crate::descriptor::key::{DerivationError, KeyParseError};
use crate::miniscript::limits::LimitError;
use crate::miniscript::satisfy::SatisfyError;
use crate::miniscript::types::TypeError;
use crate::miniscript::SanityError;
use crate::primitives::absolute_locktime::AbsLockTimeError;
use crate::primitives::relative_locktime::RelLockTimeError;
use crate::psbt::PsbtError;
use crate::{ParseNumError, ParseTreeError, ThresholdError};

/// Why a piece of descriptor or miniscript text was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Checksum missing, malformed or wrong.
    Checksum(ChecksumError),
    /// Error parsing a string into an expression tree.
    Tree(ParseTreeError),
    /// Failed to parse a number.
    Num(ParseNumError),
    /// Invalid absolute locktime.
    AbsoluteLockTime(AbsLockTimeError),
    /// Invalid relative locktime.
    RelativeLockTime(RelLockTimeError),
    /// Invalid threshold.
    Threshold(ThresholdError),
    /// Malformed key token.
    Key(KeyParseError),
    /// Hash literal was not hex of the expected length.
    HashLiteral {
        /// The literal.
        literal: String,
        /// Expected length in bytes.
        expected_len: usize,
    },
    /// Address could not be decoded for the configured network.
    Address(bitcoin::address::ParseError),
    /// Address decoded but matched none of the supported templates.
    UnsupportedAddress,
    /// The descriptor has no address form, e.g. bare `pk()`.
    NoAddress,
    /// Descriptor contains a wildcard but no derivation index was given.
    MissingIndex,
    /// A derivation index was given for a descriptor without a wildcard.
    UnexpectedIndex,
    /// Derivation index is not below 2^31.
    IndexOutOfRange(u32),
    /// Top-level expression is not a supported descriptor.
    UnknownDescriptor(String),
    /// Unknown miniscript fragment.
    UnknownFragment(String),
    /// Unknown miniscript wrapper character.
    UnknownWrapper(char),
    /// Fragment used outside of tapscript, where it is not defined.
    TapscriptOnly(String),
    /// Placeholder does not name an entry of the expansion map.
    UnknownPlaceholder(String),
    /// Wrong number of arguments.
    Arity {
        /// The fragment or descriptor name.
        name: String,
        /// Expected number of arguments.
        expected: usize,
        /// Number of arguments found.
        found: usize,
    },
    /// Fragment is not correctly typed.
    Type(TypeError),
    /// Miniscript is well typed but unsafe to use as a whole.
    Sanity(SanityError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::Checksum(ref e) => e.fmt(f),
            ParseError::Tree(ref e) => e.fmt(f),
            ParseError::Num(ref e) => e.fmt(f),
            ParseError::AbsoluteLockTime(ref e) => e.fmt(f),
            ParseError::RelativeLockTime(ref e) => e.fmt(f),
            ParseError::Threshold(ref e) => e.fmt(f),
            ParseError::Key(ref e) => e.fmt(f),
            ParseError::HashLiteral { ref literal, expected_len } => {
                write!(f, "`{}` is not a {}-byte hex hash", literal, expected_len)
            }
            ParseError::Address(ref e) => e.fmt(f),
            ParseError::UnsupportedAddress => f.write_str("address type is not supported"),
            ParseError::NoAddress => f.write_str("descriptor has no address form"),
            ParseError::MissingIndex => {
                f.write_str("descriptor has a wildcard but no derivation index was given")
            }
            ParseError::UnexpectedIndex => {
                f.write_str("derivation index given for a descriptor without wildcard")
            }
            ParseError::IndexOutOfRange(index) => {
                write!(f, "derivation index {} is not below 2^31", index)
            }
            ParseError::UnknownDescriptor(ref name) => {
                write!(f, "`{}` is not a supported descriptor", name)
            }
            ParseError::UnknownFragment(ref name) => write!(f, "unknown fragment `{}`", name),
            ParseError::UnknownWrapper(ch) => write!(f, "unknown wrapper `{}:`", ch),
            ParseError::TapscriptOnly(ref name) => {
                write!(f, "fragment `{}` is only valid in tapscript", name)
            }
            ParseError::UnknownPlaceholder(ref name) => {
                write!(f, "placeholder `{}` is not in the expansion map", name)
            }
            ParseError::Arity { ref name, expected, found } => {
                write!(f, "`{}` expects {} arguments, found {}", name, expected, found)
            }
            ParseError::Type(ref e) => e.fmt(f),
            ParseError::Sanity(ref e) => e.fmt(f),
        }
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ParseError::Checksum(ref e) => Some(e),
            ParseError::Tree(ref e) => Some(e),
            ParseError::Num(ref e) => Some(e),
            ParseError::AbsoluteLockTime(ref e) => Some(e),
            ParseError::RelativeLockTime(ref e) => Some(e),
            ParseError::Threshold(ref e) => Some(e),
            ParseError::Key(ref e) => Some(e),
            ParseError::Address(ref e) => Some(e),
            ParseError::Type(ref e) => Some(e),
            ParseError::Sanity(ref e) => Some(e),
            ParseError::HashLiteral { .. }
            | ParseError::UnsupportedAddress
            | ParseError::NoAddress
            | ParseError::MissingIndex
            | ParseError::UnexpectedIndex
            | ParseError::IndexOutOfRange(..)
            | ParseError::UnknownDescriptor(..)
            | ParseError::UnknownFragment(..)
            | ParseError::UnknownWrapper(..)
            | ParseError::TapscriptOnly(..)
            | ParseError::UnknownPlaceholder(..)
            | ParseError::Arity { .. } => None,
        }
    }
}

macro_rules! impl_from_parse_error {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for ParseError {
                fn from(e: $ty) -> Self { ParseError::$variant(e) }
            }
        )*
    };
}

impl_from_parse_error!(
    Checksum(ChecksumError),
    Tree(ParseTreeError),
    Num(ParseNumError),
    AbsoluteLockTime(AbsLockTimeError),
    RelativeLockTime(RelLockTimeError),
    Threshold(ThresholdError),
    Key(KeyParseError),
    Address(bitcoin::address::ParseError),
    Type(TypeError),
    Sanity(SanityError),
);

/// Top-level error type of the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Text failed to parse as any supported production.
    MalformedInput {
        /// The offending text.
        input: String,
        /// What was wrong with it.
        reason: ParseError,
    },
    /// A compiled script exceeds a standardness bound.
    ResourceLimitExceeded {
        /// The descriptor text the script was compiled from.
        input: String,
        /// Which bound was exceeded.
        limit: LimitError,
    },
    /// No witness can be built from the supplied signing material.
    Unsatisfiable {
        /// The descriptor or miniscript text.
        input: String,
        /// Why satisfaction failed.
        reason: SatisfyError,
    },
    /// A key could not be derived along its path.
    KeyDerivation {
        /// The key token.
        input: String,
        /// Why derivation failed.
        reason: DerivationError,
    },
    /// The PSBT did not have the expected shape.
    Psbt(PsbtError),
}

impl Error {
    pub(crate) fn malformed<R: Into<ParseError>>(input: &str, reason: R) -> Self {
        Error::MalformedInput { input: input.to_owned(), reason: reason.into() }
    }

    pub(crate) fn limit(input: &str, limit: LimitError) -> Self {
        Error::ResourceLimitExceeded { input: input.to_owned(), limit }
    }

    pub(crate) fn unsatisfiable(input: &str, reason: SatisfyError) -> Self {
        Error::Unsatisfiable { input: input.to_owned(), reason }
    }

    pub(crate) fn derivation(input: &str, reason: DerivationError) -> Self {
        Error::KeyDerivation { input: input.to_owned(), reason }
    }

    /// Whether this is the recoverable "not enough signing material" outcome.
    pub fn is_unsatisfiable(&self) -> bool { matches!(*self, Error::Unsatisfiable { .. }) }

    /// The literal input text the error refers to, if any.
    pub fn input(&self) -> Option<&str> {
        match *self {
            Error::MalformedInput { ref input, .. }
            | Error::ResourceLimitExceeded { ref input, .. }
            | Error::Unsatisfiable { ref input, .. }
            | Error::KeyDerivation { ref input, .. } => Some(input),
            Error::Psbt(..) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::MalformedInput { ref input, ref reason } => {
                write!(f, "malformed input `{}`: {}", input, reason)
            }
            Error::ResourceLimitExceeded { ref input, ref limit } => {
                write!(f, "resource limit exceeded by `{}`: {}", input, limit)
            }
            Error::Unsatisfiable { ref input, ref reason } => {
                write!(f, "cannot satisfy `{}`: {}", input, reason)
            }
            Error::KeyDerivation { ref input, ref reason } => {
                write!(f, "key derivation failed for `{}`: {}", input, reason)
            }
            Error::Psbt(ref e) => write!(f, "psbt: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::MalformedInput { ref reason, .. } => Some(reason),
            Error::ResourceLimitExceeded { ref limit, .. } => Some(limit),
            Error::Unsatisfiable { ref reason, .. } => Some(reason),
            Error::KeyDerivation { ref reason, .. } => Some(reason),
            Error::Psbt(ref e) => Some(e),
        }
    }
}

impl From<PsbtError> for Error {
    fn from(e: PsbtError) -> Self { Error::Psbt(e) }
}
