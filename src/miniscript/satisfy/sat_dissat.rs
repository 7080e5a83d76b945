// SPDX-License-Identifier: CC0-1.0

//! Satisfactions and dissatisfactions for individual Miniscript fragments.

use super::{AssetProvider, Placeholder, Satisfaction, Witness};
use crate::miniscript::{HashKind, KeyRef};
use crate::primitives::absolute_locktime::AbsLockTime;
use crate::primitives::relative_locktime::RelLockTime;
use crate::primitives::threshold::Threshold;

impl Satisfaction {
    pub(super) const IMPOSSIBLE: Self = Self {
        stack: Witness::Impossible,
        has_sig: false,
        relative_timelock: None,
        absolute_timelock: None,
    };

    pub(super) const TRIVIAL: Self = Self {
        stack: Witness::empty(),
        has_sig: false,
        relative_timelock: None,
        absolute_timelock: None,
    };

    /// Constant that can't be `const` due to Rust limitations
    pub(super) fn push_0() -> Self {
        Self { stack: Witness::Stack(vec![Placeholder::PushZero]), ..Self::TRIVIAL }
    }

    /// Constant that can't be `const` due to Rust limitations
    pub(super) fn push_1() -> Self {
        Self { stack: Witness::Stack(vec![Placeholder::PushOne]), ..Self::TRIVIAL }
    }

    /// The (dissatisfaction, satisfaction) pair for a `pk_k` fragment.
    pub(super) fn pk_k<P: AssetProvider>(provider: &P, key: &KeyRef) -> (Self, Self) {
        (
            Self::push_0(),
            Self { stack: Witness::signature(provider, key), has_sig: true, ..Self::TRIVIAL },
        )
    }

    /// The (dissatisfaction, satisfaction) pair for a `pk_h` fragment.
    pub(super) fn pk_h<P: AssetProvider>(provider: &P, key: &KeyRef) -> (Self, Self) {
        let pubkey = || Witness::Stack(vec![Placeholder::Pubkey(*key)]);
        (
            Self {
                stack: Witness::combine(Witness::Stack(vec![Placeholder::PushZero]), pubkey()),
                ..Self::TRIVIAL
            },
            Self {
                stack: Witness::combine(Witness::signature(provider, key), pubkey()),
                has_sig: true,
                ..Self::TRIVIAL
            },
        )
    }

    /// The (dissatisfaction, satisfaction) pair for a `multi` fragment.
    ///
    /// The first `k` keys with an available signature are used.
    pub(super) fn multi<P: AssetProvider, const MAX: usize>(
        provider: &P,
        thresh: &Threshold<KeyRef, MAX>,
    ) -> (Self, Self) {
        let dissat = Self {
            stack: Witness::Stack(vec![Placeholder::PushZero; thresh.k() + 1]),
            ..Self::TRIVIAL
        };

        let sigs = thresh
            .iter()
            .filter(|key| provider.has_signature(key))
            .take(thresh.k())
            .map(|key| Placeholder::EcdsaSig(*key))
            .collect::<Vec<_>>();
        if sigs.len() < thresh.k() {
            return (dissat, Self::IMPOSSIBLE);
        }

        // CHECKMULTISIG pops one element too many
        let mut stack = Vec::with_capacity(sigs.len() + 1);
        stack.push(Placeholder::PushZero);
        stack.extend(sigs);
        (dissat, Self { stack: Witness::Stack(stack), has_sig: true, ..Self::TRIVIAL })
    }

    /// The (dissatisfaction, satisfaction) pair for an `after` fragment.
    pub(super) fn after<P: AssetProvider>(
        provider: &P,
        t: AbsLockTime,
        root_has_sig: bool,
    ) -> (Self, Self) {
        let stack = if provider.check_after(t) {
            Witness::empty()
        } else if root_has_sig {
            // If the root terminal has signature, the
            // signature covers the nLockTime and nSequence
            // values. The sender of the transaction should
            // take care that it signs the value such that the
            // timelock is not met
            Witness::Impossible
        } else {
            Witness::Unavailable
        };
        (Self::IMPOSSIBLE, Self { stack, absolute_timelock: Some(t), ..Self::TRIVIAL })
    }

    /// The (dissatisfaction, satisfaction) pair for an `older` fragment.
    pub(super) fn older<P: AssetProvider>(
        provider: &P,
        t: RelLockTime,
        root_has_sig: bool,
    ) -> (Self, Self) {
        let stack = if provider.check_older(t) {
            Witness::empty()
        } else if root_has_sig {
            Witness::Impossible
        } else {
            Witness::Unavailable
        };
        (Self::IMPOSSIBLE, Self { stack, relative_timelock: Some(t), ..Self::TRIVIAL })
    }

    /// The (dissatisfaction, satisfaction) pair for any of the hash fragments.
    pub(super) fn hash<P: AssetProvider>(
        provider: &P,
        kind: HashKind,
        digest: &[u8],
    ) -> (Self, Self) {
        (
            Self { stack: Witness::Stack(vec![Placeholder::HashDissatisfaction]), ..Self::TRIVIAL },
            Self { stack: Witness::preimage(provider, kind, digest), ..Self::TRIVIAL },
        )
    }
}
