// SPDX-License-Identifier: CC0-1.0

//! Malleability type properties

/// Whether a fragment can be dissatisfied, and whether that dissatisfaction
/// is unique. Third parties are assumed able to build any dissatisfaction.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Dissat {
    /// No dissatisfaction exists; non-satisfying input aborts.
    None,
    /// A single dissatisfaction exists, is always available, and pushes 0.
    Unique,
    /// Nothing may be assumed about dissatisfying this fragment.
    Unknown,
}

impl Dissat {
    // d:, j:, l: and u: all turn "no dissatisfaction" into a unique one.
    fn forced(self) -> Dissat {
        if self == Dissat::None {
            Dissat::Unique
        } else {
            Dissat::Unknown
        }
    }
}

/// Type properties relevant to malleability analysis.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Malleability {
    /// Properties of dissatisfying inputs
    pub dissat: Dissat,
    /// `true` if every satisfaction requires a signature, so no third
    /// party can produce one without having seen a satisfaction.
    pub safe: bool,
    /// Whether a non-malleable satisfaction is guaranteed to exist
    pub non_malleable: bool,
}

impl Malleability {
    const fn new(dissat: Dissat, safe: bool, non_malleable: bool) -> Self {
        Malleability { dissat, safe, non_malleable }
    }

    /// `1`
    pub const TRUE: Self = Malleability::new(Dissat::None, false, true);
    /// `0`
    pub const FALSE: Self = Malleability::new(Dissat::Unique, true, true);
    /// `pk_k`, `pk_h`, `multi` and `sortedmulti`
    pub const KEY: Self = Malleability::new(Dissat::Unique, true, true);
    /// The hash fragments
    pub const HASH: Self = Malleability::new(Dissat::Unknown, false, true);
    /// `after` and `older`
    pub const TIME: Self = Malleability::new(Dissat::None, false, true);

    /// `d:` and `j:`
    pub fn cast_forced_dissat(self) -> Self {
        Malleability::new(self.dissat.forced(), self.safe, self.non_malleable)
    }

    /// `v:`
    pub fn cast_verify(self) -> Self { Malleability::new(Dissat::None, self.safe, self.non_malleable) }

    /// `and_b`
    pub fn and_b(left: Self, right: Self) -> Self {
        let dissat = match (left.dissat, right.dissat) {
            (Dissat::None, Dissat::None) => Dissat::None,
            (Dissat::None, _) if left.safe => Dissat::None,
            (_, Dissat::None) if right.safe => Dissat::None,
            (Dissat::Unique, Dissat::Unique) if left.safe && right.safe => Dissat::Unique,
            _ => Dissat::Unknown,
        };
        Malleability::new(
            dissat,
            left.safe || right.safe,
            left.non_malleable && right.non_malleable,
        )
    }

    /// `and_v`
    pub fn and_v(left: Self, right: Self) -> Self {
        let dissat = if right.dissat == Dissat::None || left.safe {
            Dissat::None
        } else {
            Dissat::Unknown
        };
        Malleability::new(
            dissat,
            left.safe || right.safe,
            left.non_malleable && right.non_malleable,
        )
    }

    /// `or_b`
    pub fn or_b(left: Self, right: Self) -> Self {
        Malleability::new(
            Dissat::Unique,
            left.safe && right.safe,
            left.non_malleable
                && left.dissat == Dissat::Unique
                && right.non_malleable
                && right.dissat == Dissat::Unique
                && (left.safe || right.safe),
        )
    }

    /// `or_d`
    pub fn or_d(left: Self, right: Self) -> Self {
        Malleability::new(right.dissat, left.safe && right.safe, Self::or_nm(left, right))
    }

    /// `or_c`
    pub fn or_c(left: Self, right: Self) -> Self {
        Malleability::new(Dissat::None, left.safe && right.safe, Self::or_nm(left, right))
    }

    /// `or_i`
    pub fn or_i(left: Self, right: Self) -> Self {
        let dissat = match (left.dissat, right.dissat) {
            (Dissat::None, Dissat::None) => Dissat::None,
            (Dissat::Unique, Dissat::None) | (Dissat::None, Dissat::Unique) => Dissat::Unique,
            _ => Dissat::Unknown,
        };
        Malleability::new(
            dissat,
            left.safe && right.safe,
            left.non_malleable && right.non_malleable && (left.safe || right.safe),
        )
    }

    /// `andor`
    pub fn and_or(a: Self, b: Self, c: Self) -> Self {
        let dissat = match (a.safe, b.dissat, c.dissat) {
            (_, Dissat::None, Dissat::Unique) | (true, _, Dissat::Unique) => Dissat::Unique,
            (_, Dissat::None, Dissat::None) | (true, _, Dissat::None) => Dissat::None,
            _ => Dissat::Unknown,
        };
        Malleability::new(
            dissat,
            (a.safe || b.safe) && c.safe,
            a.non_malleable
                && a.dissat == Dissat::Unique
                && b.non_malleable
                && c.non_malleable
                && (a.safe || b.safe || c.safe),
        )
    }

    /// `thresh`
    pub fn threshold<'a, I>(k: usize, subs: I) -> Self
    where
        I: ExactSizeIterator<Item = &'a Self>,
    {
        let n = subs.len();
        let mut safe_count = 0;
        let mut all_unique = true;
        let mut all_non_malleable = true;
        for sub in subs {
            safe_count += usize::from(sub.safe);
            all_unique &= sub.dissat == Dissat::Unique;
            all_non_malleable &= sub.non_malleable;
        }
        Malleability::new(
            if all_unique && safe_count == n { Dissat::Unique } else { Dissat::Unknown },
            safe_count > n - k,
            all_non_malleable && all_unique && safe_count >= n - k,
        )
    }

    fn or_nm(left: Self, right: Self) -> bool {
        left.non_malleable
            && left.dissat == Dissat::Unique
            && right.non_malleable
            && (left.safe || right.safe)
    }
}
