// SPDX-License-Identifier: CC0-1.0

//! Absolute Locktimes

use core::{cmp, fmt};

use bitcoin::absolute;

/// Largest value accepted by an `after` fragment.
pub const MAX_ABSOLUTE_LOCKTIME: u32 = 0x8000_0000;

/// Smallest value accepted by an `after` fragment.
///
/// Zero is a valid nLockTime, but the fragment template uses the pushed value
/// as a boolean so it must be nonzero.
pub const MIN_ABSOLUTE_LOCKTIME: u32 = 1;

/// Error constructing an absolute locktime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsLockTimeError {
    value: u32,
}

impl fmt::Display for AbsLockTimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.value < MIN_ABSOLUTE_LOCKTIME {
            f.write_str("absolute locktimes have a minimum value of 1")
        } else {
            write!(
                f,
                "absolute locktimes have a maximum value of 0x{:08x}; got 0x{:08x}",
                MAX_ABSOLUTE_LOCKTIME, self.value
            )
        }
    }
}

impl std::error::Error for AbsLockTimeError {}

/// An absolute locktime, as used by `after`, that implements `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbsLockTime(absolute::LockTime);

impl AbsLockTime {
    /// Constructs an `AbsLockTime` from the `CHECKLOCKTIMEVERIFY` argument.
    pub fn from_consensus(n: u32) -> Result<Self, AbsLockTimeError> {
        if (MIN_ABSOLUTE_LOCKTIME..=MAX_ABSOLUTE_LOCKTIME).contains(&n) {
            Ok(AbsLockTime(absolute::LockTime::from_consensus(n)))
        } else {
            Err(AbsLockTimeError { value: n })
        }
    }

    /// The raw nLockTime value.
    pub fn to_consensus_u32(self) -> u32 { self.0.to_consensus_u32() }

    /// Whether this is a height-based locktime.
    pub fn is_block_height(&self) -> bool { self.0.is_block_height() }

    /// Whether this is a time-based locktime.
    pub fn is_block_time(&self) -> bool { self.0.is_block_time() }

    /// Whether a transaction with nLockTime `lock_time` satisfies this locktime.
    ///
    /// Both values must use the same unit (block height or timestamp).
    pub fn is_satisfied_by(&self, lock_time: absolute::LockTime) -> bool {
        self.0.is_same_unit(lock_time)
            && self.0.to_consensus_u32() <= lock_time.to_consensus_u32()
    }
}

impl From<AbsLockTime> for absolute::LockTime {
    fn from(lock_time: AbsLockTime) -> absolute::LockTime { lock_time.0 }
}

impl cmp::PartialOrd for AbsLockTime {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { Some(self.cmp(other)) }
}

impl cmp::Ord for AbsLockTime {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.to_consensus_u32().cmp(&other.to_consensus_u32())
    }
}

impl fmt::Display for AbsLockTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.to_consensus_u32(), f)
    }
}
