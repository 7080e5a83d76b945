// SPDX-License-Identifier: CC0-1.0

//! Primitive Types
//!
//! Locktimes appearing in `after` and `older` fragments are constrained more
//! tightly than their consensus counterparts: both must be nonzero, and
//! relative locktimes must be valid BIP-68 sequence values. Thresholds carry
//! their `k` together with the `n` children and validate `0 < k <= n`.
//!
//! Types defined here are re-exported at the crate root.

pub mod absolute_locktime;
pub mod relative_locktime;
pub mod threshold;
