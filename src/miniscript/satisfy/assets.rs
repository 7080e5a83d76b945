// SPDX-License-Identifier: CC0-1.0

//! Assets available to the satisfier
//!
//! An [`AssetProvider`] answers, for a planned witness, whether each piece of
//! signing material could be produced. It never hands out the material
//! itself, which is what allows planning before any signature exists.

use core::fmt;

use bitcoin::{ecdsa, PublicKey};

use super::{SatisfyError, TimeConstraints};
use crate::expression::Tree;
use crate::miniscript::{HashKind, KeyRef};
use crate::primitives::absolute_locktime::AbsLockTime;
use crate::primitives::relative_locktime::RelLockTime;
use crate::Error;

/// Trait describing a lookup table for signatures, hash preimages and
/// timelock constraints.
///
/// Every method defaults to "not available".
pub trait AssetProvider {
    /// Given a key, look up an ECDSA signature with that key, return whether we found it
    fn has_signature(&self, _: &KeyRef) -> bool { false }

    /// Given a digest, look up its preimage, return whether we found it
    fn has_preimage(&self, _: HashKind, _: &[u8]) -> bool { false }

    /// Assert whether an absolute locktime is satisfied
    fn check_after(&self, _: AbsLockTime) -> bool { false }

    /// Assert whether a relative locktime is satisfied
    fn check_older(&self, _: RelLockTime) -> bool { false }
}

/// A preimage together with the digest it opens.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Preimage {
    kind: HashKind,
    digest: Vec<u8>,
    preimage: [u8; 32],
}

impl Preimage {
    /// Creates a preimage, computing its digest under `kind`.
    pub fn new(kind: HashKind, preimage: [u8; 32]) -> Self {
        Preimage { kind, digest: kind.hash(&preimage), preimage }
    }

    /// Creates a preimage for a known digest, checking that they match.
    pub fn from_parts(
        kind: HashKind,
        digest: &[u8],
        preimage: [u8; 32],
    ) -> Result<Self, SatisfyError> {
        let ret = Preimage::new(kind, preimage);
        if ret.digest == digest {
            Ok(ret)
        } else {
            Err(SatisfyError::PreimageMismatch(kind))
        }
    }

    /// Parses a digest written as its fragment, e.g. `sha256(<hex>)`, and a
    /// hex preimage.
    pub fn parse(digest: &str, preimage: &str) -> Result<Self, Error> {
        use bitcoin::hex::FromHex;

        let tree = Tree::from_str(digest).map_err(|e| Error::malformed(digest, e))?;
        let kind = match tree.name {
            "sha256" => HashKind::Sha256,
            "hash256" => HashKind::Hash256,
            "ripemd160" => HashKind::Ripemd160,
            "hash160" => HashKind::Hash160,
            name => {
                return Err(Error::malformed(
                    digest,
                    crate::ParseError::UnknownFragment(name.to_owned()),
                ))
            }
        };
        let literal = match tree.args.as_slice() {
            [arg] if arg.is_terminal() => arg.name,
            args => {
                return Err(Error::malformed(digest, crate::ParseError::Arity {
                    name: kind.name().to_owned(),
                    expected: 1,
                    found: args.len(),
                }))
            }
        };
        let hash = Vec::<u8>::from_hex(literal)
            .ok()
            .filter(|hash| hash.len() == kind.digest_len())
            .ok_or_else(|| {
                Error::malformed(digest, crate::ParseError::HashLiteral {
                    literal: literal.to_owned(),
                    expected_len: kind.digest_len(),
                })
            })?;
        let bytes = <[u8; 32]>::from_hex(preimage).map_err(|_| {
            Error::malformed(preimage, crate::ParseError::HashLiteral {
                literal: preimage.to_owned(),
                expected_len: 32,
            })
        })?;
        Preimage::from_parts(kind, &hash, bytes).map_err(|e| Error::unsatisfiable(digest, e))
    }

    /// The hash function.
    pub fn kind(&self) -> HashKind { self.kind }

    /// The digest opened by this preimage.
    pub fn digest(&self) -> &[u8] { &self.digest }

    /// The preimage.
    pub fn preimage(&self) -> &[u8; 32] { &self.preimage }

    /// Whether this opens `digest` under `kind`.
    pub fn matches(&self, kind: HashKind, digest: &[u8]) -> bool {
        self.kind == kind && self.digest == digest
    }
}

impl fmt::Display for Preimage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use bitcoin::hex::DisplayHex;

        write!(f, "{}({})", self.kind.name(), self.digest.as_hex())
    }
}

/// A signature and the key it was made with.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct PartialSig {
    /// The signing key.
    pub pubkey: PublicKey,
    /// The signature, including its sighash flag.
    pub signature: ecdsa::Signature,
}

impl PartialSig {
    /// Pairs a key with its signature.
    pub fn new(pubkey: PublicKey, signature: ecdsa::Signature) -> Self {
        PartialSig { pubkey, signature }
    }
}

/// The assets we can use to satisfy a particular spending path, for a
/// constraints-only run of the satisfier.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Assets {
    /// Keys we will be able to sign with.
    pub signers: Vec<PublicKey>,
    /// Known preimages.
    pub preimages: Vec<Preimage>,
    /// Committed timelocks; without them every timelock is usable.
    pub constraints: Option<TimeConstraints>,
}

impl Assets {
    /// Assets with no keys, preimages or constraints.
    pub fn new() -> Self { Self::default() }

    /// Adds a key we can sign with.
    pub fn add_signer(mut self, pk: PublicKey) -> Self {
        self.signers.push(pk);
        self
    }

    /// Adds several keys we can sign with.
    pub fn add_signers<I: IntoIterator<Item = PublicKey>>(mut self, pks: I) -> Self {
        self.signers.extend(pks);
        self
    }

    /// Adds a known preimage.
    pub fn add_preimage(mut self, preimage: Preimage) -> Self {
        self.preimages.push(preimage);
        self
    }

    /// Restricts timelocks to the committed values.
    pub fn with_constraints(mut self, constraints: TimeConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }
}

impl AssetProvider for Assets {
    fn has_signature(&self, key: &KeyRef) -> bool { self.signers.contains(&key.pk) }

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
