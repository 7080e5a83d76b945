// SPDX-License-Identifier: CC0-1.0

//! # Satisfaction and Dissatisfaction
//!
//! Witness construction for a parsed [`Miniscript`].
//!
//! Witnesses are first built as templates of [`Placeholder`]s. Every
//! placeholder has a fixed size estimate (an ECDSA signature always counts
//! as 73 bytes), so the chosen spending path only depends on which assets
//! are available and never on the length of actual signatures. A
//! constraints-only run over [`Assets`] therefore picks the same path, and
//! the same timelocks, as the later run over real signatures.
//!
//! For every fragment a (dissatisfaction, satisfaction) pair is computed
//! bottom-up. Where the grammar offers a choice the cheapest option which
//! cannot be malleated by a third party is selected.

use core::{cmp, fmt, mem};
use std::error;

use bitcoin::hex::DisplayHex;
use bitcoin::{absolute, Sequence};

mod assets;
mod sat_dissat;

pub use self::assets::{AssetProvider, Assets, PartialSig, Preimage};
use super::{ExpansionMap, HashKind, KeyRef, Miniscript, Terminal};
use crate::primitives::absolute_locktime::AbsLockTime;
use crate::primitives::relative_locktime::RelLockTime;
use crate::util::witness_size;
use crate::Error;

/// Reasons why no witness could be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatisfyError {
    /// The supplied signatures and preimages do not satisfy any spending path.
    MissingMaterial,
    /// A spending path exists, but not one allowed by the committed timelocks.
    ConstraintMismatch {
        /// Committed nLockTime.
        lock_time: Option<absolute::LockTime>,
        /// Committed nSequence.
        sequence: Option<Sequence>,
    },
    /// An absolute locktime was combined with a final sequence, which
    /// disables it.
    InconsistentConstraints {
        /// The locktime.
        lock_time: absolute::LockTime,
        /// The sequence.
        sequence: Sequence,
    },
    /// The descriptor kind has no satisfaction, e.g. `addr()`.
    UnsupportedKind(String),
    /// A preimage does not hash to its digest.
    PreimageMismatch(HashKind),
}

impl fmt::Display for SatisfyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SatisfyError::MissingMaterial => {
                f.write_str("not enough signatures or preimages to satisfy any spending path")
            }
            SatisfyError::ConstraintMismatch { lock_time, sequence } => write!(
                f,
                "no spending path is allowed by locktime {:?} and sequence {:?}",
                lock_time.map(|t| t.to_consensus_u32()),
                sequence.map(|s| s.to_consensus_u32()),
            ),
            SatisfyError::InconsistentConstraints { lock_time, sequence } => write!(
                f,
                "locktime {} is disabled by sequence 0x{:08x}",
                lock_time.to_consensus_u32(),
                sequence.to_consensus_u32()
            ),
            SatisfyError::UnsupportedKind(ref kind) => {
                write!(f, "`{}` descriptors cannot be satisfied", kind)
            }
            SatisfyError::PreimageMismatch(kind) => {
                write!(f, "preimage does not match its {} digest", kind.name())
            }
        }
    }
}

impl error::Error for SatisfyError {}

/// Timelock values committed to by a spending transaction.
///
/// `after` fragments are available only when satisfied by `lock_time` and
/// `older` fragments only when satisfied by `sequence`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash)]
pub struct TimeConstraints {
    lock_time: Option<absolute::LockTime>,
    sequence: Option<Sequence>,
}

impl TimeConstraints {
    /// Creates a new set of constraints.
    ///
    /// Fails if an absolute locktime is combined with the final sequence
    /// `0xffffffff`.
    pub fn new(
        lock_time: Option<absolute::LockTime>,
        sequence: Option<Sequence>,
    ) -> Result<Self, SatisfyError> {
        if let (Some(lock_time), Some(sequence)) = (lock_time, sequence) {
            if sequence.to_consensus_u32() > Sequence::ENABLE_LOCKTIME_NO_RBF.to_consensus_u32() {
                return Err(SatisfyError::InconsistentConstraints { lock_time, sequence });
            }
        }
        Ok(TimeConstraints { lock_time, sequence })
    }

    /// The committed nLockTime.
    pub fn lock_time(&self) -> Option<absolute::LockTime> { self.lock_time }

    /// The committed nSequence.
    pub fn sequence(&self) -> Option<Sequence> { self.sequence }

    /// The nSequence an input spending under these constraints must carry.
    pub fn input_sequence(&self) -> Sequence {
        match (self.sequence, self.lock_time) {
            (Some(sequence), _) => sequence,
            (None, Some(_)) => Sequence::ENABLE_LOCKTIME_NO_RBF,
            (None, None) => Sequence::MAX,
        }
    }

    /// Whether `after(t)` is satisfied by the committed locktime.
    pub fn allows_after(&self, t: AbsLockTime) -> bool {
        self.lock_time.map_or(false, |lock_time| t.is_satisfied_by(lock_time))
    }

    /// Whether `older(t)` is satisfied by the committed sequence.
    pub fn allows_older(&self, t: RelLockTime) -> bool {
        self.sequence.map_or(false, |sequence| t.is_satisfied_by(sequence))
    }
}

/// An item of a witness template.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum Placeholder {
    /// ECDSA signature by the key.
    EcdsaSig(KeyRef),
    /// The serialized key.
    Pubkey(KeyRef),
    /// Preimage of the digest.
    Preimage(HashKind, Vec<u8>),
    /// 32 zero bytes, which dissatisfy any hash-lock.
    HashDissatisfaction,
    /// `OP_1`
    PushOne,
    /// An empty push.
    PushZero,
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Placeholder::EcdsaSig(ref key) => write!(f, "sig({})", key),
            Placeholder::Pubkey(ref key) => write!(f, "pk({})", key),
            Placeholder::Preimage(kind, ref digest) => {
                write!(f, "{}_preimage({})", kind.name(), digest.as_hex())
            }
            Placeholder::HashDissatisfaction => f.write_str("zero32"),
            Placeholder::PushOne => f.write_str("1"),
            Placeholder::PushZero => f.write_str("0"),
        }
    }
}

/// A witness, if available, for a Miniscript fragment
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Witness {
    /// Witness Available and the value of the witness
    Stack(Vec<Placeholder>),
    /// Third party can possibly satisfy the fragment but we cannot
    /// Witness Unavailable
    Unavailable,
    /// No third party can produce a satisfaction without private key
    /// Witness Impossible
    Impossible,
}

impl PartialOrd for Witness {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { Some(self.cmp(other)) }
}

impl Ord for Witness {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (self, other) {
            (Witness::Stack(v1), Witness::Stack(v2)) => witness_size(v1).cmp(&witness_size(v2)),
            (Witness::Stack(_), _) => cmp::Ordering::Less,
            (_, Witness::Stack(_)) => cmp::Ordering::Greater,
            (Witness::Impossible, Witness::Unavailable) => cmp::Ordering::Less,
            (Witness::Unavailable, Witness::Impossible) => cmp::Ordering::Greater,
            (Witness::Impossible, Witness::Impossible) => cmp::Ordering::Equal,
            (Witness::Unavailable, Witness::Unavailable) => cmp::Ordering::Equal,
        }
    }
}

impl Witness {
    /// Turn a signature into (part of) a satisfaction
    fn signature<P: AssetProvider>(provider: &P, key: &KeyRef) -> Self {
        if provider.has_signature(key) {
            Witness::Stack(vec![Placeholder::EcdsaSig(*key)])
        } else {
            // Signatures cannot be forged
            Witness::Impossible
        }
    }

    /// Turn a hash preimage into (part of) a satisfaction
    fn preimage<P: AssetProvider>(provider: &P, kind: HashKind, digest: &[u8]) -> Self {
        if provider.has_preimage(kind, digest) {
            Witness::Stack(vec![Placeholder::Preimage(kind, digest.to_vec())])
        } else {
            // Hash preimages are unavailable rather than impossible
            Witness::Unavailable
        }
    }

    /// Construct a satisfaction equivalent to an empty stack
    const fn empty() -> Self { Witness::Stack(Vec::new()) }

    /// Concatenate, or otherwise combine, two satisfactions
    fn combine(one: Self, two: Self) -> Self {
        match (one, two) {
            (Witness::Impossible, _) | (_, Witness::Impossible) => Witness::Impossible,
            (Witness::Unavailable, _) | (_, Witness::Unavailable) => Witness::Unavailable,
            (Witness::Stack(mut a), Witness::Stack(b)) => {
                a.extend(b);
                Witness::Stack(a)
            }
        }
    }
}

/// A (dis)satisfaction of a Miniscript fragment
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Satisfaction {
    /// The actual witness stack
    pub stack: Witness,
    /// Whether or not this (dis)satisfaction has a signature somewhere
    /// in it
    pub has_sig: bool,
    /// The absolute timelock used by this satisfaction
    pub absolute_timelock: Option<AbsLockTime>,
    /// The relative timelock used by this satisfaction
    pub relative_timelock: Option<RelLockTime>,
}

impl Satisfaction {
    /// Satisfaction of two fragments executed one after the other. The
    /// witness of `second` ends up below the one of `first`.
    fn concat(first: Self, second: Self) -> Self {
        Satisfaction {
            stack: Witness::combine(first.stack, second.stack),
            has_sig: first.has_sig || second.has_sig,
            absolute_timelock: cmp::max(first.absolute_timelock, second.absolute_timelock),
            relative_timelock: cmp::max(first.relative_timelock, second.relative_timelock),
        }
    }

    // produce a non-malleable satisfaction for a thresh fragment
    fn thresh(k: usize, pairs: Vec<(Self, Self)>) -> Self {
        let (mut ret_stack, mut sats): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();

        // Sort everything by (sat cost - dissat cost), except that
        // satisfactions without signatures beat satisfactions with
        // signatures
        let mut sat_indices = (0..sats.len()).collect::<Vec<_>>();
        sat_indices.sort_by_key(|&i| {
            let stack_weight = match (&sats[i].stack, &ret_stack[i].stack) {
                (Witness::Unavailable, _) | (Witness::Impossible, _) => i64::MAX,
                (_, Witness::Unavailable) | (_, Witness::Impossible) => i64::MIN,
                (Witness::Stack(s), Witness::Stack(d)) => {
                    witness_size(s) as i64 - witness_size(d) as i64
                }
            };
            let is_impossible = sats[i].stack == Witness::Impossible;
            // First consider the candidates that are not impossible to satisfy
            // by any party. Among those first consider the ones that have no sig
            // because third party can malleate them if they are not chosen.
            // Lastly, choose by weight.
            (is_impossible, sats[i].has_sig, stack_weight)
        });

        // If `k` satisfactions which are not impossible cannot be found,
        // the whole threshold is impossible
        let last_chosen = match k.checked_sub(1).and_then(|i| sat_indices.get(i)) {
            Some(&i) => i,
            None => return Self::IMPOSSIBLE,
        };
        if sats[last_chosen].stack == Witness::Impossible {
            return Self::IMPOSSIBLE;
        }
        // Everything without a sig was sorted first. A remaining sig-less
        // satisfaction is a malleability vector.
        if let Some(&next) = sat_indices.get(k) {
            if !sats[next].has_sig && sats[next].stack != Witness::Impossible {
                return Satisfaction { stack: Witness::Unavailable, ..Self::TRIVIAL };
            }
        }

        for &i in &sat_indices[..k] {
            mem::swap(&mut ret_stack[i], &mut sats[i]);
        }
        ret_stack.into_iter().fold(Self::TRIVIAL, |acc, next| Self::concat(next, acc))
    }

    fn minimum(sat1: Self, sat2: Self) -> Self {
        // If there is only one available satisfaction, we must choose that
        // regardless of has_sig marker.
        // This handles the case where both are impossible.
        match (&sat1.stack, &sat2.stack) {
            (Witness::Impossible, _) => return sat2,
            (_, Witness::Impossible) => return sat1,
            _ => {}
        }
        match (sat1.has_sig, sat2.has_sig) {
            // If neither option has a signature, this is a malleability
            // vector, so choose neither one.
            (false, false) => Satisfaction { stack: Witness::Unavailable, ..Self::TRIVIAL },
            // If only one has a signature, take the one that doesn't; a
            // third party could malleate by removing the signature, but
            // can't malleate if they'd have to add it
            (false, true) => sat1,
            (true, false) => sat2,
            // If both have a signature associated with them, choose the
            // cheaper one (where "cheaper" is defined such that available
            // things are cheaper than unavailable ones)
            (true, true) => {
                if sat2.stack < sat1.stack {
                    sat2
                } else {
                    sat1
                }
            }
        }
    }

    // calculate the minimum witness allowing witness malleability
    fn minimum_mall(sat1: Self, sat2: Self) -> Self {
        match (&sat1.stack, &sat2.stack) {
            // If there is only one possible satisfaction, use it regardless
            // of the other one
            (Witness::Impossible, _) | (Witness::Unavailable, _) => return sat2,
            (_, Witness::Impossible) | (_, Witness::Unavailable) => return sat1,
            _ => {}
        }
        // The fragment is has_sig only if both of the fragments are has_sig
        let has_sig = sat1.has_sig && sat2.has_sig;
        let min = if sat2.stack < sat1.stack { sat2 } else { sat1 };
        Satisfaction { has_sig, ..min }
    }

    /// The (dissatisfaction, satisfaction) pair of `ms`.
    fn sat_dissat<P: AssetProvider>(
        ms: &Miniscript,
        provider: &P,
        root_has_sig: bool,
    ) -> (Self, Self) {
        let recurse = |sub: &Miniscript| Self::sat_dissat(sub, provider, root_has_sig);
        match ms.node {
            Terminal::True => (Self::IMPOSSIBLE, Self::TRIVIAL),
            Terminal::False => (Self::TRIVIAL, Self::IMPOSSIBLE),
            Terminal::PkK(ref key) => Self::pk_k(provider, key),
            Terminal::PkH(ref key) => Self::pk_h(provider, key),
            Terminal::After(t) => Self::after(provider, t, root_has_sig),
            Terminal::Older(t) => Self::older(provider, t, root_has_sig),
            Terminal::Sha256(ref h) => Self::hash(provider, HashKind::Sha256, h),
            Terminal::Hash256(ref h) => Self::hash(provider, HashKind::Hash256, h),
            Terminal::Ripemd160(ref h) => Self::hash(provider, HashKind::Ripemd160, h),
            Terminal::Hash160(ref h) => Self::hash(provider, HashKind::Hash160, h),
            Terminal::Alt(ref sub)
            | Terminal::Swap(ref sub)
            | Terminal::Check(ref sub)
            | Terminal::ZeroNotEqual(ref sub) => recurse(sub),
            Terminal::DupIf(ref sub) => {
                let (_, sat) = recurse(sub);
                (Self::push_0(), Self::concat(sat, Self::push_1()))
            }
            Terminal::Verify(ref sub) => {
                let (_, sat) = recurse(sub);
                (Self::IMPOSSIBLE, sat)
            }
            Terminal::NonZero(ref sub) => {
                let (_, sat) = recurse(sub);
                (Self::push_0(), sat)
            }
            Terminal::AndV(ref v, ref other) => {
                let (_, vsat) = recurse(v);
                let (odissat, osat) = recurse(other);
                (Self::concat(odissat, vsat.clone()), Self::concat(osat, vsat))
            }
            Terminal::AndB(ref l, ref r) => {
                let (lnsat, lsat) = recurse(l);
                let (rnsat, rsat) = recurse(r);
                (Self::concat(rnsat, lnsat), Self::concat(rsat, lsat))
            }
            Terminal::AndOr(ref a, ref b, ref c) => {
                let (ansat, asat) = recurse(a);
                let (_, bsat) = recurse(b);
                let (cnsat, csat) = recurse(c);
                let sat = Self::minimum(
                    Self::concat(bsat, asat),
                    Self::concat(csat, ansat.clone()),
                );
                (Self::concat(cnsat, ansat), sat)
            }
            Terminal::OrB(ref l, ref r) => {
                let (lnsat, lsat) = recurse(l);
                let (rnsat, rsat) = recurse(r);
                let sat = Self::minimum(
                    Self::concat(rsat, lnsat.clone()),
                    Self::concat(rnsat.clone(), lsat),
                );
                (Self::concat(rnsat, lnsat), sat)
            }
            Terminal::OrD(ref l, ref r) => {
                let (lnsat, lsat) = recurse(l);
                let (rnsat, rsat) = recurse(r);
                let sat = Self::minimum(lsat, Self::concat(rsat, lnsat.clone()));
                (Self::concat(rnsat, lnsat), sat)
            }
            Terminal::OrC(ref l, ref r) => {
                let (lnsat, lsat) = recurse(l);
                let (_, rsat) = recurse(r);
                (Self::IMPOSSIBLE, Self::minimum(lsat, Self::concat(rsat, lnsat)))
            }
            Terminal::OrI(ref l, ref r) => {
                let (lnsat, lsat) = recurse(l);
                let (rnsat, rsat) = recurse(r);
                let sat = Self::minimum(
                    Self::concat(lsat, Self::push_1()),
                    Self::concat(rsat, Self::push_0()),
                );
                // Dissatisfactions don't need to be non-malleable
                let dissat = Self::minimum_mall(
                    Self::concat(lnsat, Self::push_1()),
                    Self::concat(rnsat, Self::push_0()),
                );
                (dissat, sat)
            }
            Terminal::Thresh(ref thresh) => {
                let pairs = thresh.iter().map(|sub| recurse(sub)).collect::<Vec<_>>();
                let dissat = pairs
                    .iter()
                    .fold(Self::TRIVIAL, |acc, (nsat, _)| Self::concat(nsat.clone(), acc));
                (dissat, Self::thresh(thresh.k(), pairs))
            }
            Terminal::Multi(ref thresh) => Self::multi(provider, thresh),
        }
    }
}

/// The cheapest spending path available with some set of assets.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Plan {
    /// The witness template, bottom of the stack first.
    pub stack: Vec<Placeholder>,
    /// The absolute timelock this plan uses.
    pub absolute_timelock: Option<AbsLockTime>,
    /// The relative timelock this plan uses.
    pub relative_timelock: Option<RelLockTime>,
}

impl Plan {
    /// The locktime and sequence a transaction must commit to in order to
    /// use this plan.
    pub fn time_constraints(&self) -> TimeConstraints {
        TimeConstraints {
            lock_time: self.absolute_timelock.map(absolute::LockTime::from),
            sequence: self.relative_timelock.map(Sequence::from),
        }
    }

    /// The size in bytes of the serialized witness.
    pub fn witness_size(&self) -> usize { witness_size(&self.stack) }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            item.fmt(f)?;
        }
        f.write_str("]")
    }
}

/// A materialized witness together with the timelocks it relies on.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Satisfied {
    /// Witness stack, bottom first.
    pub stack: Vec<Vec<u8>>,
    /// nLockTime the spending transaction must carry, if any.
    pub lock_time: Option<absolute::LockTime>,
    /// Relative timelock the spending input must carry, if any.
    pub sequence: Option<Sequence>,
}

/// Signatures and preimages handed to the real satisfier.
#[derive(Copy, Clone)]
struct Material<'a> {
    sigs: &'a [PartialSig],
    preimages: &'a [Preimage],
    constraints: Option<&'a TimeConstraints>,
}

impl Material<'_> {
    fn materialize(&self, item: &Placeholder) -> Result<Vec<u8>, SatisfyError> {
        match *item {
            Placeholder::EcdsaSig(ref key) => self
                .sigs
                .iter()
                .find(|sig| sig.pubkey == key.pk)
                .map(|sig| sig.signature.to_vec())
                .ok_or(SatisfyError::MissingMaterial),
            Placeholder::Pubkey(ref key) => Ok(key.pk.to_bytes()),
            Placeholder::Preimage(kind, ref digest) => self
                .preimages
                .iter()
                .find(|p| p.matches(kind, digest))
                .map(|p| p.preimage().to_vec())
                .ok_or(SatisfyError::MissingMaterial),
            Placeholder::HashDissatisfaction => Ok(vec![0; 32]),
            Placeholder::PushOne => Ok(vec![1]),
            Placeholder::PushZero => Ok(vec![]),
        }
    }
}

impl AssetProvider for Material<'_> {
    fn has_signature(&self, key: &KeyRef) -> bool { self.sigs.iter().any(|sig| sig.pubkey == key.pk) }

    fn has_preimage(&self, kind: HashKind, digest: &[u8]) -> bool {
        self.preimages.iter().any(|p| p.matches(kind, digest))
    }

    fn check_after(&self, t: AbsLockTime) -> bool {
        self.constraints.map_or(true, |c| c.allows_after(t))
    }

    fn check_older(&self, t: RelLockTime) -> bool {
        self.constraints.map_or(true, |c| c.allows_older(t))
    }
}

impl Miniscript {
    /// Finds the cheapest non-malleable spending path available with the
    /// assets of `provider`.
    pub fn plan<P: AssetProvider>(&self, provider: &P) -> Result<Plan, SatisfyError> {
        let (_, sat) = Satisfaction::sat_dissat(self, provider, self.ty.mall.safe);
        match sat.stack {
            Witness::Stack(stack) => Ok(Plan {
                stack,
                absolute_timelock: sat.absolute_timelock,
                relative_timelock: sat.relative_timelock,
            }),
            Witness::Unavailable | Witness::Impossible => Err(SatisfyError::MissingMaterial),
        }
    }

    /// Builds a witness from real signatures and preimages.
    ///
    /// With `constraints`, only timelocks satisfied by the committed values
    /// are used.
    pub fn satisfy(
        &self,
        sigs: &[PartialSig],
        preimages: &[Preimage],
        constraints: Option<&TimeConstraints>,
    ) -> Result<Satisfied, SatisfyError> {
        let material = Material { sigs, preimages, constraints };
        let plan = match self.plan(&material) {
            Ok(plan) => plan,
            Err(e) => {
                let unconstrained = Material { constraints: None, ..material };
                return match constraints {
                    Some(c) if self.plan(&unconstrained).is_ok() => {
                        Err(SatisfyError::ConstraintMismatch {
                            lock_time: c.lock_time,
                            sequence: c.sequence,
                        })
                    }
                    _ => Err(e),
                };
            }
        };
        log::debug!("satisfying {} with {}", self, plan);

        let stack = plan
            .stack
            .iter()
            .map(|item| material.materialize(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Satisfied {
            stack,
            lock_time: plan.absolute_timelock.map(absolute::LockTime::from),
            sequence: plan.relative_timelock.map(Sequence::from),
        })
    }
}

/// Constraints-only satisfaction of `ms` with the given assets.
pub fn plan<P: AssetProvider>(ms: &Miniscript, assets: &P) -> Result<Plan, SatisfyError> {
    ms.plan(assets)
}

/// Parses an expanded miniscript and satisfies it from real signatures
/// and preimages.
///
/// Insufficient material is reported as [`Error::Unsatisfiable`], which is
/// distinct from the parse errors of the miniscript itself.
pub fn satisfy(
    expanded: &str,
    map: &ExpansionMap,
    sigs: &[PartialSig],
    preimages: &[Preimage],
    constraints: Option<&TimeConstraints>,
) -> Result<Satisfied, Error> {
    let ms = Miniscript::parse(expanded, map)?;
    ms.satisfy(sigs, preimages, constraints).map_err(|e| Error::unsatisfiable(expanded, e))
}

#[cfg(test)]
mod tests {
    use bitcoin::secp256k1::{Message, Secp256k1, SecretKey};
    use bitcoin::{ecdsa, PublicKey};

    use super::*;
    use crate::descriptor::key::KeyContext;
    use crate::miniscript::expand;

    fn keys(n: usize) -> (Vec<SecretKey>, Vec<PublicKey>) {
        let secp = Secp256k1::new();
        let sks = (1..=n)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[31] = i as u8;
                SecretKey::from_slice(&bytes).unwrap()
            })
            .collect::<Vec<_>>();
        let pks = sks
            .iter()
            .map(|sk| PublicKey::new(bitcoin::secp256k1::PublicKey::from_secret_key(&secp, sk)))
            .collect();
        (sks, pks)
    }

    fn sign(sk: &SecretKey) -> ecdsa::Signature {
        let secp = Secp256k1::new();
        let msg = Message::from_digest([0x42; 32]);
        ecdsa::Signature::sighash_all(secp.sign_ecdsa(&msg, sk))
    }

    fn partial_sig(sk: &SecretKey, pk: PublicKey) -> PartialSig { PartialSig::new(pk, sign(sk)) }

    fn parse(ms: &str, pks: &[PublicKey]) -> (String, ExpansionMap, Miniscript) {
        let secp = Secp256k1::new();
        let mut text = ms.to_owned();
        for (i, pk) in pks.iter().enumerate() {
            text = text.replace(&format!("K{}", i), &pk.to_string());
        }
        let (expanded, map) =
            expand(&text, &KeyContext::segwit(bitcoin::Network::Bitcoin), &secp).unwrap();
        let ms = Miniscript::parse(&expanded, &map).unwrap();
        (expanded, map, ms)
    }

    fn signers(pks: &[PublicKey]) -> Assets { Assets::new().add_signers(pks.iter().copied()) }

    #[test]
    fn single_key() {
        let (sks, pks) = keys(1);
        let (_, _, ms) = parse("pk(K0)", &pks);

        let plan = ms.plan(&signers(&pks)).unwrap();
        assert_eq!(plan.stack, vec![Placeholder::EcdsaSig(KeyRef { index: 0, pk: pks[0] })]);
        assert_eq!(plan.time_constraints(), TimeConstraints::default());

        let sat = ms.satisfy(&[partial_sig(&sks[0], pks[0])], &[], None).unwrap();
        assert_eq!(sat.stack, vec![sign(&sks[0]).to_vec()]);
        assert_eq!(ms.satisfy(&[], &[], None), Err(SatisfyError::MissingMaterial));
    }

    #[test]
    fn pkh_pushes_key() {
        let (sks, pks) = keys(1);
        let (_, _, ms) = parse("pkh(K0)", &pks);
        let sat = ms.satisfy(&[partial_sig(&sks[0], pks[0])], &[], None).unwrap();
        assert_eq!(sat.stack, vec![sign(&sks[0]).to_vec(), pks[0].to_bytes()]);
    }

    #[test]
    fn multi_takes_first_k_in_key_order() {
        let (sks, pks) = keys(3);
        let (_, _, ms) = parse("multi(2,K0,K1,K2)", &pks);

        let all = (0..3).map(|i| partial_sig(&sks[i], pks[i])).collect::<Vec<_>>();
        let sat = ms.satisfy(&all, &[], None).unwrap();
        assert_eq!(sat.stack, vec![vec![], sign(&sks[0]).to_vec(), sign(&sks[1]).to_vec()]);

        let sat = ms.satisfy(&all[1..], &[], None).unwrap();
        assert_eq!(sat.stack, vec![vec![], sign(&sks[1]).to_vec(), sign(&sks[2]).to_vec()]);

        assert_eq!(ms.satisfy(&all[2..], &[], None), Err(SatisfyError::MissingMaterial));
    }

    #[test]
    fn or_prefers_cheaper_branch() {
        let (sks, pks) = keys(2);
        // Left branch: sig. Right branch: dissatisfied left + sig and pubkey.
        let (_, _, ms) = parse("or_d(pk(K0),pkh(K1))", &pks);

        let both = [partial_sig(&sks[0], pks[0]), partial_sig(&sks[1], pks[1])];
        let sat = ms.satisfy(&both, &[], None).unwrap();
        assert_eq!(sat.stack, vec![sign(&sks[0]).to_vec()]);

        let sat = ms.satisfy(&both[1..], &[], None).unwrap();
        assert_eq!(sat.stack, vec![sign(&sks[1]).to_vec(), pks[1].to_bytes(), vec![]]);
    }

    #[test]
    fn timelocks_propagate() {
        let (sks, pks) = keys(2);
        let (_, _, ms) = parse("or_i(and_v(v:pk(K0),older(144)),and_v(v:pk(K1),after(500)))", &pks);

        // Only the relative path is signed for
        let plan = ms.plan(&signers(&pks[..1])).unwrap();
        assert_eq!(plan.relative_timelock, Some(RelLockTime::from_consensus(144).unwrap()));
        assert_eq!(plan.absolute_timelock, None);
        assert_eq!(plan.time_constraints().input_sequence(), Sequence::from_consensus(144));

        let plan = ms.plan(&signers(&pks[1..])).unwrap();
        assert_eq!(plan.absolute_timelock, Some(AbsLockTime::from_consensus(500).unwrap()));
        let constraints = plan.time_constraints();
        assert_eq!(constraints.input_sequence(), Sequence::ENABLE_LOCKTIME_NO_RBF);

        let sat = ms
            .satisfy(&[partial_sig(&sks[1], pks[1])], &[], Some(&constraints))
            .unwrap();
        assert_eq!(sat.lock_time, Some(absolute::LockTime::from_consensus(500)));
        assert_eq!(sat.sequence, None);
        assert_eq!(sat.stack, vec![sign(&sks[1]).to_vec(), vec![]]);
    }

    #[test]
    fn committed_constraints_are_enforced() {
        let (sks, pks) = keys(1);
        let (_, _, ms) = parse("and_v(v:pk(K0),after(1000))", &pks);
        let sigs = [partial_sig(&sks[0], pks[0])];

        let lower =
            TimeConstraints::new(Some(absolute::LockTime::from_consensus(999)), None).unwrap();
        assert!(matches!(
            ms.satisfy(&sigs, &[], Some(&lower)),
            Err(SatisfyError::ConstraintMismatch { .. })
        ));

        let higher =
            TimeConstraints::new(Some(absolute::LockTime::from_consensus(1001)), None).unwrap();
        let sat = ms.satisfy(&sigs, &[], Some(&higher)).unwrap();
        assert_eq!(sat.lock_time, Some(absolute::LockTime::from_consensus(1000)));

        // Timestamps do not satisfy heights
        let time = TimeConstraints::new(
            Some(absolute::LockTime::from_consensus(500_000_001)),
            None,
        )
        .unwrap();
        assert!(ms.satisfy(&sigs, &[], Some(&time)).is_err());
    }

    #[test]
    fn inconsistent_constraints() {
        let lock_time = absolute::LockTime::from_consensus(100);
        assert!(TimeConstraints::new(Some(lock_time), Some(Sequence::MAX)).is_err());
        assert!(TimeConstraints::new(Some(lock_time), Some(Sequence::ENABLE_LOCKTIME_NO_RBF))
            .is_ok());
        assert!(TimeConstraints::new(None, Some(Sequence::MAX)).is_ok());
        assert_eq!(TimeConstraints::default().input_sequence(), Sequence::MAX);
    }

    #[test]
    fn hash_preimages() {
        let (sks, pks) = keys(1);
        let preimage = Preimage::new(HashKind::Sha256, [7; 32]);
        let digest = preimage.digest().to_lower_hex_string();
        let (_, _, ms) = parse(&format!("and_v(v:pk(K0),sha256({}))", digest), &pks);
        let sigs = [partial_sig(&sks[0], pks[0])];

        assert_eq!(ms.satisfy(&sigs, &[], None), Err(SatisfyError::MissingMaterial));
        let sat = ms.satisfy(&sigs, &[preimage], None).unwrap();
        assert_eq!(sat.stack, vec![vec![7; 32], sign(&sks[0]).to_vec()]);

        // A preimage for another hash function does not help
        let other = Preimage::new(HashKind::Hash256, [7; 32]);
        assert!(ms.satisfy(&sigs, &[other], None).is_err());
    }

    #[test]
    fn sigless_alternatives_are_not_chosen() {
        let (_, pks) = keys(2);
        let a = Preimage::new(HashKind::Sha256, [1; 32]);
        let b = Preimage::new(HashKind::Sha256, [2; 32]);
        let (_, _, ms) = parse(
            &format!(
                "or_i(sha256({}),sha256({}))",
                a.digest().to_lower_hex_string(),
                b.digest().to_lower_hex_string()
            ),
            &pks,
        );
        let assets = Assets::new().add_preimage(a.clone()).add_preimage(b);
        assert_eq!(ms.plan(&assets), Err(SatisfyError::MissingMaterial));
        // A third party may know the other preimage
        assert_eq!(ms.plan(&Assets::new().add_preimage(a)), Err(SatisfyError::MissingMaterial));
    }

    #[test]
    fn thresh_uses_sigless_first() {
        let (_, pks) = keys(3);
        let (_, _, ms) = parse("thresh(2,pk(K0),s:pk(K1),sln:older(10))", &pks);

        let plan = ms.plan(&signers(&pks[..2])).unwrap();
        // The timelock is always taken, plus the cheapest signature
        assert_eq!(plan.relative_timelock, Some(RelLockTime::from_consensus(10).unwrap()));
        let sigs = plan.stack.iter().filter(|p| matches!(p, Placeholder::EcdsaSig(_))).count();
        assert_eq!(sigs, 1);
    }

    #[test]
    fn plan_matches_real_satisfaction() {
        let (sks, pks) = keys(3);
        let (_, _, ms) = parse(
            "andor(pk(K0),older(1000),or_d(multi(2,K1,K2),and_v(v:pk(K0),after(600000))))",
            &pks,
        );
        let sigs = (0..3).map(|i| partial_sig(&sks[i], pks[i])).collect::<Vec<_>>();
        let plan = ms.plan(&signers(&pks)).unwrap();
        let sat = ms.satisfy(&sigs, &[], Some(&plan.time_constraints())).unwrap();
        assert_eq!(sat.lock_time, plan.time_constraints().lock_time());
        assert_eq!(sat.sequence, plan.time_constraints().sequence());
        assert_eq!(sat.stack.len(), plan.stack.len());
    }

    #[test]
    fn free_function_reports_unsatisfiable() {
        let (_, pks) = keys(1);
        let (expanded, map, _) = parse("pk(K0)", &pks);
        let err = satisfy(&expanded, &map, &[], &[], None).unwrap_err();
        assert!(err.is_unsatisfiable());
        assert_eq!(err.input(), Some("pk(@0)"));

        let err = satisfy("pk(@7)", &map, &[], &[], None).unwrap_err();
        assert!(!err.is_unsatisfiable());
    }
}
