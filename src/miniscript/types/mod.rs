// SPDX-License-Identifier: CC0-1.0

//! Miniscript Types
//!
//! Static type checking of miniscript fragments. Every fragment carries a
//! [`Correctness`] type, which decides where it may appear, and a
//! [`Malleability`] type, which decides whether honest signers can always
//! produce a satisfaction that third parties cannot alter.

pub mod correctness;
pub mod extra_props;
pub mod malleability;

use core::fmt;
use std::error;

pub use self::correctness::{Base, Correctness, Input};
pub use self::extra_props::TimeLockInfo;
pub use self::malleability::{Dissat, Malleability};
use crate::miniscript::Terminal;

/// Detailed type of a typechecker error
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ErrorKind {
    /// Many fragments (all disjunctions except `or_i` as well as
    /// `andor`) require their left child be dissatisfiable.
    LeftNotDissatisfiable,
    /// `or_b` requires its right child be dissatisfiable
    RightNotDissatisfiable,
    /// Tried to use the `s:` modifier on a fragment that takes more
    /// than one input
    SwapNonOne,
    /// Tried to use the `j:` (`SIZE 0NOTEQUAL IF`) wrapper on something
    /// that may be satisfied by a 0 input
    NonZeroZero,
    /// Tried to use the `d:` (`DUP IF`) wrapper on something that
    /// consumes stack input
    NonZeroDupIf,
    /// Many fragments require their left child to be a unit. This
    /// was not the case.
    LeftNotUnit,
    /// Attempted to construct a wrapper, but the child had
    /// an invalid type
    ChildBase1(Base),
    /// Attempted to construct a conjunction or disjunction, but
    /// the fragments' children were of invalid types
    ChildBase2(Base, Base),
    /// Attempted to construct an `andor` but the fragments'
    /// children were of invalid types
    ChildBase3(Base, Base, Base),
    /// The nth child of a threshold fragment had an invalid type (the
    /// first must be `B` and the rest `W`s)
    ThresholdBase(usize, Base),
    /// The nth child of a threshold fragment did not have a unique
    /// satisfaction
    ThresholdDissat(usize),
    /// The nth child of a threshold fragment was not a unit
    ThresholdNonUnit(usize),
}

/// A fragment failed to typecheck.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeError {
    /// The fragment that failed typecheck
    pub fragment: String,
    /// The reason that typechecking failed
    pub kind: ErrorKind,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::LeftNotDissatisfiable => write!(
                f,
                "fragment «{}» requires its left child be dissatisfiable",
                self.fragment,
            ),
            ErrorKind::RightNotDissatisfiable => write!(
                f,
                "fragment «{}» requires its right child be dissatisfiable",
                self.fragment,
            ),
            ErrorKind::SwapNonOne => write!(
                f,
                "fragment «{}» attempts to use `SWAP` to prefix something \
                 which does not take exactly one input",
                self.fragment,
            ),
            ErrorKind::NonZeroZero => write!(
                f,
                "fragment «{}» attempts to use the `j:` wrapper around a \
                 fragment which might be satisfied by an input of size zero",
                self.fragment,
            ),
            ErrorKind::NonZeroDupIf => write!(
                f,
                "fragment «{}» attempts to use the `d:` wrapper around a \
                 fragment which consumes stack input",
                self.fragment,
            ),
            ErrorKind::LeftNotUnit => write!(
                f,
                "fragment «{}» requires its left child be a unit (outputs \
                 exactly 1 given a satisfying input)",
                self.fragment,
            ),
            ErrorKind::ChildBase1(base) => {
                write!(f, "fragment «{}» cannot wrap a fragment of type {:?}", self.fragment, base)
            }
            ErrorKind::ChildBase2(base1, base2) => write!(
                f,
                "fragment «{}» cannot accept children of types {:?} and {:?}",
                self.fragment, base1, base2,
            ),
            ErrorKind::ChildBase3(base1, base2, base3) => write!(
                f,
                "fragment «{}» cannot accept children of types {:?}, {:?} and {:?}",
                self.fragment, base1, base2, base3,
            ),
            ErrorKind::ThresholdBase(idx, base) => write!(
                f,
                "fragment «{}» sub-fragment {} has type {:?} rather than {:?}",
                self.fragment,
                idx,
                base,
                if idx == 0 { Base::B } else { Base::W },
            ),
            ErrorKind::ThresholdDissat(idx) => write!(
                f,
                "fragment «{}» sub-fragment {} can not be dissatisfied \
                 and cannot be used in a threshold",
                self.fragment, idx,
            ),
            ErrorKind::ThresholdNonUnit(idx) => write!(
                f,
                "fragment «{}» sub-fragment {} is not a unit (does not put \
                 exactly 1 on the stack given a satisfying input)",
                self.fragment, idx,
            ),
        }
    }
}

impl error::Error for TypeError {}

/// Structure representing the type of a Miniscript fragment, including all
/// properties relevant to the main codebase
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Type {
    /// Correctness/soundness properties
    pub corr: Correctness,
    /// Malleability properties
    pub mall: Malleability,
}

impl Type {
    /// Type of the `1` fragment
    pub const TRUE: Self = Type { corr: Correctness::TRUE, mall: Malleability::TRUE };

    /// Type of the `0` fragment
    pub const FALSE: Self = Type { corr: Correctness::FALSE, mall: Malleability::FALSE };

    /// Compute the type of a fragment, given that all its children have
    /// already been typechecked.
    pub fn type_check(fragment: &Terminal) -> Result<Self, ErrorKind> {
        let ty = match *fragment {
            Terminal::True => Type::TRUE,
            Terminal::False => Type::FALSE,
            Terminal::PkK(..) => Type { corr: Correctness::PK_K, mall: Malleability::KEY },
            Terminal::PkH(..) => Type { corr: Correctness::PK_H, mall: Malleability::KEY },
            Terminal::Multi(..) => Type { corr: Correctness::MULTI, mall: Malleability::KEY },
            Terminal::After(..) | Terminal::Older(..) => {
                Type { corr: Correctness::TIME, mall: Malleability::TIME }
            }
            Terminal::Sha256(..)
            | Terminal::Hash256(..)
            | Terminal::Ripemd160(..)
            | Terminal::Hash160(..) => Type { corr: Correctness::HASH, mall: Malleability::HASH },
            Terminal::Alt(ref sub) => {
                Type { corr: sub.ty.corr.cast_alt()?, mall: sub.ty.mall }
            }
            Terminal::Swap(ref sub) => {
                Type { corr: sub.ty.corr.cast_swap()?, mall: sub.ty.mall }
            }
            Terminal::Check(ref sub) => {
                Type { corr: sub.ty.corr.cast_check()?, mall: sub.ty.mall }
            }
            Terminal::DupIf(ref sub) => Type {
                corr: sub.ty.corr.cast_dupif()?,
                mall: sub.ty.mall.cast_forced_dissat(),
            },
            Terminal::Verify(ref sub) => Type {
                corr: sub.ty.corr.cast_verify()?,
                mall: sub.ty.mall.cast_verify(),
            },
            Terminal::NonZero(ref sub) => Type {
                corr: sub.ty.corr.cast_nonzero()?,
                mall: sub.ty.mall.cast_forced_dissat(),
            },
            Terminal::ZeroNotEqual(ref sub) => {
                Type { corr: sub.ty.corr.cast_zeronotequal()?, mall: sub.ty.mall }
            }
            Terminal::AndV(ref l, ref r) => Type {
                corr: Correctness::and_v(l.ty.corr, r.ty.corr)?,
                mall: Malleability::and_v(l.ty.mall, r.ty.mall),
            },
            Terminal::AndB(ref l, ref r) => Type {
                corr: Correctness::and_b(l.ty.corr, r.ty.corr)?,
                mall: Malleability::and_b(l.ty.mall, r.ty.mall),
            },
            Terminal::OrB(ref l, ref r) => Type {
                corr: Correctness::or_b(l.ty.corr, r.ty.corr)?,
                mall: Malleability::or_b(l.ty.mall, r.ty.mall),
            },
            Terminal::OrD(ref l, ref r) => Type {
                corr: Correctness::or_d(l.ty.corr, r.ty.corr)?,
                mall: Malleability::or_d(l.ty.mall, r.ty.mall),
            },
            Terminal::OrC(ref l, ref r) => Type {
                corr: Correctness::or_c(l.ty.corr, r.ty.corr)?,
                mall: Malleability::or_c(l.ty.mall, r.ty.mall),
            },
            Terminal::OrI(ref l, ref r) => Type {
                corr: Correctness::or_i(l.ty.corr, r.ty.corr)?,
                mall: Malleability::or_i(l.ty.mall, r.ty.mall),
            },
            Terminal::AndOr(ref a, ref b, ref c) => Type {
                corr: Correctness::and_or(a.ty.corr, b.ty.corr, c.ty.corr)?,
                mall: Malleability::and_or(a.ty.mall, b.ty.mall, c.ty.mall),
            },
            Terminal::Thresh(ref thresh) => {
                let corrs: Vec<Correctness> = thresh.iter().map(|s| s.ty.corr).collect();
                let malls: Vec<Malleability> = thresh.iter().map(|s| s.ty.mall).collect();
                Type {
                    corr: Correctness::threshold(corrs.iter())?,
                    mall: Malleability::threshold(thresh.k(), malls.iter()),
                }
            }
        };
        Ok(ty)
    }
}
