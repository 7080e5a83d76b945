// SPDX-License-Identifier: CC0-1.0

//! Relative Locktimes

use core::convert::TryFrom;
use core::{cmp, fmt};

use bitcoin::Sequence;

/// Error constructing a relative locktime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelLockTimeError {
    value: u32,
}

impl fmt::Display for RelLockTimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.value == 0 {
            f.write_str("relative locktimes have a minimum value of 1")
        } else {
            write!(f, "locktime value {} is not a valid BIP68 relative locktime", self.value)
        }
    }
}

impl std::error::Error for RelLockTimeError {}

/// A relative locktime, as used by `older`, which implements `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelLockTime(Sequence);

impl RelLockTime {
    /// Constructs a `RelLockTime` from the `CHECKSEQUENCEVERIFY` argument.
    pub fn from_consensus(n: u32) -> Result<Self, RelLockTimeError> {
        TryFrom::try_from(Sequence::from_consensus(n))
    }

    /// The raw nSequence value.
    pub fn to_consensus_u32(self) -> u32 { self.0.to_consensus_u32() }

    /// Whether this timelock is blockheight-based.
    pub fn is_height_locked(&self) -> bool { self.0.is_height_locked() }

    /// Whether this timelock is time-based.
    pub fn is_time_locked(&self) -> bool { self.0.is_time_locked() }

    /// Whether an input with nSequence `sequence` satisfies this locktime
    /// under the BIP-68/BIP-112 rules.
    pub fn is_satisfied_by(&self, sequence: Sequence) -> bool {
        if !sequence.is_relative_lock_time() {
            return false;
        }
        let (mine, theirs) = (self.0.to_consensus_u32(), sequence.to_consensus_u32());
        if self.is_height_locked() != sequence.is_height_locked() {
            return false;
        }
        (mine & 0xffff) <= (theirs & 0xffff)
    }
}

impl TryFrom<Sequence> for RelLockTime {
    type Error = RelLockTimeError;
    fn try_from(seq: Sequence) -> Result<Self, RelLockTimeError> {
        if seq.is_relative_lock_time() && seq.to_consensus_u32() != 0 {
            Ok(RelLockTime(seq))
        } else {
            Err(RelLockTimeError { value: seq.to_consensus_u32() })
        }
    }
}

impl From<RelLockTime> for Sequence {
    fn from(lock_time: RelLockTime) -> Sequence { lock_time.0 }
}

impl cmp::PartialOrd for RelLockTime {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { Some(self.cmp(other)) }
}

impl cmp::Ord for RelLockTime {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.to_consensus_u32().cmp(&other.to_consensus_u32())
    }
}

impl fmt::Display for RelLockTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.to_consensus_u32(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction() {
        assert!(RelLockTime::from_consensus(0).is_err());
        assert!(RelLockTime::from_consensus(1).is_ok());
        assert!(RelLockTime::from_consensus(0xffff).is_ok());
        // disable flag set
        assert!(RelLockTime::from_consensus(0x8000_0000).is_err());
        assert!(RelLockTime::from_consensus(0x0040_0001).unwrap().is_time_locked());
    }

    #[test]
    fn satisfaction() {
        let ten = RelLockTime::from_consensus(10).unwrap();
        assert!(ten.is_satisfied_by(Sequence::from_consensus(10)));
        assert!(ten.is_satisfied_by(Sequence::from_consensus(11)));
        assert!(!ten.is_satisfied_by(Sequence::from_consensus(9)));
        assert!(!ten.is_satisfied_by(Sequence::from_consensus(0x0040_000a)));
        assert!(!ten.is_satisfied_by(Sequence::MAX));
        assert!(!ten.is_satisfied_by(Sequence::ENABLE_LOCKTIME_NO_RBF));
    }
}
