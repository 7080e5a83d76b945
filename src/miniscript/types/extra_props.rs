// SPDX-License-Identifier: CC0-1.0

//! Timelock properties, which are unrelated to correctness or malleability.

use core::iter::once;

use crate::primitives::absolute_locktime::AbsLockTime;
use crate::primitives::relative_locktime::RelLockTime;

/// Which kinds of timelocks any satisfaction of a fragment may contain.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct TimeLockInfo {
    /// csv with heights
    pub csv_with_height: bool,
    /// csv with times
    pub csv_with_time: bool,
    /// cltv with heights
    pub cltv_with_height: bool,
    /// cltv with times
    pub cltv_with_time: bool,
    /// A single spending path needs both a height and a time lock of the
    /// same kind, which no transaction can satisfy.
    pub contains_combination: bool,
}

impl TimeLockInfo {
    /// Timelock info of an `after` fragment.
    pub fn after(t: AbsLockTime) -> Self {
        TimeLockInfo {
            cltv_with_height: t.is_block_height(),
            cltv_with_time: t.is_block_time(),
            ..Default::default()
        }
    }

    /// Timelock info of an `older` fragment.
    pub fn older(t: RelLockTime) -> Self {
        TimeLockInfo {
            csv_with_height: t.is_height_locked(),
            csv_with_time: t.is_time_locked(),
            ..Default::default()
        }
    }

    /// Whether some spending path can never be taken because it mixes
    /// heights and times.
    pub fn contains_unspendable_path(self) -> bool { self.contains_combination }

    pub(crate) fn comb_and_timelocks(a: Self, b: Self) -> Self {
        Self::combine_thresh_timelocks(2, once(a).chain(once(b)))
    }

    pub(crate) fn comb_or_timelocks(a: Self, b: Self) -> Self {
        Self::combine_thresh_timelocks(1, once(a).chain(once(b)))
    }

    /// All flags propagate upwards. When more than one child must be
    /// satisfied together, a height lock in one and a time lock of the same
    /// kind in another make that combination unspendable.
    pub(crate) fn combine_thresh_timelocks<I>(k: usize, sub_timelocks: I) -> TimeLockInfo
    where
        I: IntoIterator<Item = TimeLockInfo>,
    {
        sub_timelocks.into_iter().fold(TimeLockInfo::default(), |mut acc, sub| {
            if k >= 2 {
                acc.contains_combination |= (acc.csv_with_height && sub.csv_with_time)
                    || (acc.csv_with_time && sub.csv_with_height)
                    || (acc.cltv_with_time && sub.cltv_with_height)
                    || (acc.cltv_with_height && sub.cltv_with_time);
            }
            acc.csv_with_height |= sub.csv_with_height;
            acc.csv_with_time |= sub.csv_with_time;
            acc.cltv_with_height |= sub.cltv_with_height;
            acc.cltv_with_time |= sub.cltv_with_time;
            acc.contains_combination |= sub.contains_combination;
            acc
        })
    }
}
