// SPDX-License-Identifier: CC0-1.0

//! # Abstract Syntax Tree
//!
//! Defines the data structures describing Miniscript, a subset of Bitcoin
//! Script which can be efficiently analyzed and from which it is easy to
//! extract the data needed to construct witnesses.
//!
//! Miniscripts are parsed from their *expanded* text form, in which every
//! key has been replaced by an `@i` placeholder (see [`expand`]). The parsed
//! tree is typechecked on construction and shared read-only by the compiler,
//! the satisfier and the sanity checks.

use core::fmt;
use std::error;
use std::sync::Arc;

use bitcoin::hashes::{hash160, ripemd160, sha256, sha256d, Hash};
use bitcoin::hex::FromHex;
use bitcoin::PublicKey;

pub mod astelem;
pub mod expand;
pub mod limits;
pub mod satisfy;
pub mod types;

pub use self::astelem::compile;
pub use self::expand::{expand, ExpansionMap};
pub use self::satisfy::{
    plan, satisfy, AssetProvider, Assets, PartialSig, Plan, Preimage, Satisfied, TimeConstraints,
};
use self::limits::MAX_PUBKEYS_PER_MULTISIG;
use self::types::extra_props::TimeLockInfo;
use self::types::{Base, Type, TypeError};
use crate::error::ParseError;
use crate::expression::{parse_num, Tree};
use crate::primitives::absolute_locktime::AbsLockTime;
use crate::primitives::relative_locktime::RelLockTime;
use crate::primitives::threshold::Threshold;
use crate::Error;

/// A key resolved from a placeholder of the expansion map.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct KeyRef {
    /// Placeholder index.
    pub index: usize,
    /// The key behind the placeholder.
    pub pk: PublicKey,
}

impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "@{}", self.index) }
}

/// The four hash functions available to hash-lock fragments.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum HashKind {
    /// SHA256
    Sha256,
    /// Double SHA256
    Hash256,
    /// RIPEMD160
    Ripemd160,
    /// SHA256 followed by RIPEMD160
    Hash160,
}

impl HashKind {
    /// Length of the digest in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashKind::Sha256 | HashKind::Hash256 => 32,
            HashKind::Ripemd160 | HashKind::Hash160 => 20,
        }
    }

    /// Hashes `data`, giving the bytes the script compares against.
    pub fn hash(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashKind::Sha256 => sha256::Hash::hash(data).to_byte_array().to_vec(),
            HashKind::Hash256 => sha256d::Hash::hash(data).to_byte_array().to_vec(),
            HashKind::Ripemd160 => ripemd160::Hash::hash(data).to_byte_array().to_vec(),
            HashKind::Hash160 => hash160::Hash::hash(data).to_byte_array().to_vec(),
        }
    }

    /// Fragment name.
    pub fn name(self) -> &'static str {
        match self {
            HashKind::Sha256 => "sha256",
            HashKind::Hash256 => "hash256",
            HashKind::Ripemd160 => "ripemd160",
            HashKind::Hash160 => "hash160",
        }
    }
}

/// Enum representing the AST of a miniscript fragment.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Terminal {
    /// `1`
    True,
    /// `0`
    False,
    // pubkey checks
    /// `<key>`
    PkK(KeyRef),
    /// `DUP HASH160 <keyhash> EQUALVERIFY`
    PkH(KeyRef),
    // timelocks
    /// `n CHECKLOCKTIMEVERIFY`
    After(AbsLockTime),
    /// `n CHECKSEQUENCEVERIFY`
    Older(RelLockTime),
    // hashlocks
    /// `SIZE 32 EQUALVERIFY SHA256 <hash> EQUAL`
    Sha256([u8; 32]),
    /// `SIZE 32 EQUALVERIFY HASH256 <hash> EQUAL`
    Hash256([u8; 32]),
    /// `SIZE 32 EQUALVERIFY RIPEMD160 <hash> EQUAL`
    Ripemd160([u8; 20]),
    /// `SIZE 32 EQUALVERIFY HASH160 <hash> EQUAL`
    Hash160([u8; 20]),
    // Wrappers
    /// `TOALTSTACK [E] FROMALTSTACK`
    Alt(Arc<Miniscript>),
    /// `SWAP [E1]`
    Swap(Arc<Miniscript>),
    /// `[Kt]/[Ke] CHECKSIG`
    Check(Arc<Miniscript>),
    /// `DUP IF [V] ENDIF`
    DupIf(Arc<Miniscript>),
    /// `[T] VERIFY`
    Verify(Arc<Miniscript>),
    /// `SIZE 0NOTEQUAL IF [Fn] ENDIF`
    NonZero(Arc<Miniscript>),
    /// `[X] 0NOTEQUAL`
    ZeroNotEqual(Arc<Miniscript>),
    // Conjunctions
    /// `[V] [T]/[V]/[F]/[Kt]`
    AndV(Arc<Miniscript>, Arc<Miniscript>),
    /// `[E] [W] BOOLAND`
    AndB(Arc<Miniscript>, Arc<Miniscript>),
    /// `[various] NOTIF [various] ELSE [various] ENDIF`
    AndOr(Arc<Miniscript>, Arc<Miniscript>, Arc<Miniscript>),
    // Disjunctions
    /// `[E] [W] BOOLOR`
    OrB(Arc<Miniscript>, Arc<Miniscript>),
    /// `[E] IFDUP NOTIF [T]/[E] ENDIF`
    OrD(Arc<Miniscript>, Arc<Miniscript>),
    /// `[E] NOTIF [V] ENDIF`
    OrC(Arc<Miniscript>, Arc<Miniscript>),
    /// `IF [various] ELSE [various] ENDIF`
    OrI(Arc<Miniscript>, Arc<Miniscript>),
    // Thresholds
    /// `[E] ([W] ADD)* k EQUAL`
    Thresh(Threshold<Arc<Miniscript>, 0>),
    /// `k (<key>)* n CHECKMULTISIG`
    Multi(Threshold<KeyRef, MAX_PUBKEYS_PER_MULTISIG>),
}

impl Terminal {
    /// The direct children of this fragment, left to right.
    pub fn children(&self) -> Vec<&Arc<Miniscript>> {
        match *self {
            Terminal::Alt(ref sub)
            | Terminal::Swap(ref sub)
            | Terminal::Check(ref sub)
            | Terminal::DupIf(ref sub)
            | Terminal::Verify(ref sub)
            | Terminal::NonZero(ref sub)
            | Terminal::ZeroNotEqual(ref sub) => vec![sub],
            Terminal::AndV(ref l, ref r)
            | Terminal::AndB(ref l, ref r)
            | Terminal::OrB(ref l, ref r)
            | Terminal::OrD(ref l, ref r)
            | Terminal::OrC(ref l, ref r)
            | Terminal::OrI(ref l, ref r) => vec![l, r],
            Terminal::AndOr(ref a, ref b, ref c) => vec![a, b, c],
            Terminal::Thresh(ref thresh) => thresh.iter().collect(),
            _ => vec![],
        }
    }
}

/// Why a well-typed miniscript is still unsafe to use as a whole.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SanityError {
    /// The top level fragment does not have base type `B`.
    NotBaseB,
    /// There is no guarantee of a non-malleable satisfaction.
    Malleable,
    /// Some spending path does not require a signature.
    SiglessBranch,
    /// A spending path mixes heightlocks and timelocks.
    TimelockMixing,
    /// The same key appears more than once.
    RepeatedKey(PublicKey),
}

impl fmt::Display for SanityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SanityError::NotBaseB => f.write_str("top-level fragment is not of type B"),
            SanityError::Malleable => f.write_str("miniscript is malleable"),
            SanityError::SiglessBranch => {
                f.write_str("some spending path does not require a signature")
            }
            SanityError::TimelockMixing => {
                f.write_str("a spending path contains a combination of heightlock and timelock")
            }
            SanityError::RepeatedKey(ref pk) => write!(f, "key {} is used more than once", pk),
        }
    }
}

impl error::Error for SanityError {}

/// A typechecked miniscript fragment.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Miniscript {
    /// The AST node.
    pub node: Terminal,
    /// Type of the fragment.
    pub ty: Type,
    /// Timelock kinds used by the fragment.
    pub timelocks: TimeLockInfo,
}

impl Miniscript {
    /// Typechecks an AST node whose children were already constructed.
    pub fn from_ast(node: Terminal) -> Result<Miniscript, types::ErrorKind> {
        let ty = Type::type_check(&node)?;
        let timelocks = match node {
            Terminal::After(t) => TimeLockInfo::after(t),
            Terminal::Older(t) => TimeLockInfo::older(t),
            Terminal::Alt(ref sub)
            | Terminal::Swap(ref sub)
            | Terminal::Check(ref sub)
            | Terminal::DupIf(ref sub)
            | Terminal::Verify(ref sub)
            | Terminal::NonZero(ref sub)
            | Terminal::ZeroNotEqual(ref sub) => sub.timelocks,
            Terminal::AndV(ref l, ref r) | Terminal::AndB(ref l, ref r) => {
                TimeLockInfo::comb_and_timelocks(l.timelocks, r.timelocks)
            }
            Terminal::AndOr(ref a, ref b, ref c) => TimeLockInfo::comb_or_timelocks(
                TimeLockInfo::comb_and_timelocks(a.timelocks, b.timelocks),
                c.timelocks,
            ),
            Terminal::OrB(ref l, ref r)
            | Terminal::OrD(ref l, ref r)
            | Terminal::OrC(ref l, ref r)
            | Terminal::OrI(ref l, ref r) => {
                TimeLockInfo::comb_or_timelocks(l.timelocks, r.timelocks)
            }
            Terminal::Thresh(ref thresh) => TimeLockInfo::combine_thresh_timelocks(
                thresh.k(),
                thresh.iter().map(|sub| sub.timelocks),
            ),
            _ => TimeLockInfo::default(),
        };
        Ok(Miniscript { node, ty, timelocks })
    }

    /// Parses an expanded miniscript, resolving placeholders through `map`.
    ///
    /// The top-level fragment must have base type `B`.
    pub fn parse(expanded: &str, map: &ExpansionMap) -> Result<Miniscript, Error> {
        let tree = Tree::from_str(expanded).map_err(|e| Error::malformed(expanded, e))?;
        let ms = Miniscript::from_tree(&tree, map)?;
        if ms.ty.corr.base != Base::B {
            return Err(Error::malformed(expanded, SanityError::NotBaseB));
        }
        Ok(ms)
    }

    /// Builds a miniscript from an expression tree.
    pub fn from_tree(top: &Tree, map: &ExpansionMap) -> Result<Miniscript, Error> {
        let text = top.to_string();
        let malformed = |reason: ParseError| Error::malformed(&text, reason);
        let typed = |node: Terminal| {
            Miniscript::from_ast(node).map_err(|kind| {
                Error::malformed(&text, TypeError { fragment: text.clone(), kind })
            })
        };

        let (wrap, name) = top.wrappers();
        if top.name.contains(':') && wrap.is_empty() {
            return Err(malformed(ParseError::UnknownFragment(top.name.to_owned())));
        }
        let (mut wrap, name) = match name {
            "pk" => (format!("{}c", wrap), "pk_k"),
            "pkh" => (format!("{}c", wrap), "pk_h"),
            _ => (wrap.to_owned(), name),
        };

        let arity = |expected: usize| {
            if top.args.len() == expected {
                Ok(())
            } else {
                Err(malformed(ParseError::Arity {
                    name: name.to_owned(),
                    expected,
                    found: top.args.len(),
                }))
            }
        };
        let sub = |i: usize| Miniscript::from_tree(&top.args[i], map).map(Arc::new);

        let node = match name {
            "0" | "1" => {
                arity(0)?;
                if name == "1" {
                    Terminal::True
                } else {
                    Terminal::False
                }
            }
            "pk_k" => {
                arity(1)?;
                Terminal::PkK(parse_placeholder(&top.args[0], map)?)
            }
            "pk_h" => {
                arity(1)?;
                Terminal::PkH(parse_placeholder(&top.args[0], map)?)
            }
            "after" => {
                arity(1)?;
                let n = parse_terminal_num(&top.args[0])?;
                let t = AbsLockTime::from_consensus(n).map_err(|e| malformed(e.into()))?;
                Terminal::After(t)
            }
            "older" => {
                arity(1)?;
                let n = parse_terminal_num(&top.args[0])?;
                let t = RelLockTime::from_consensus(n).map_err(|e| malformed(e.into()))?;
                Terminal::Older(t)
            }
            "sha256" => {
                arity(1)?;
                Terminal::Sha256(parse_hash(&top.args[0])?)
            }
            "hash256" => {
                arity(1)?;
                Terminal::Hash256(parse_hash(&top.args[0])?)
            }
            "ripemd160" => {
                arity(1)?;
                Terminal::Ripemd160(parse_hash(&top.args[0])?)
            }
            "hash160" => {
                arity(1)?;
                Terminal::Hash160(parse_hash(&top.args[0])?)
            }
            "and_v" => {
                arity(2)?;
                Terminal::AndV(sub(0)?, sub(1)?)
            }
            "and_b" => {
                arity(2)?;
                Terminal::AndB(sub(0)?, sub(1)?)
            }
            "and_n" => {
                arity(2)?;
                let zero = typed(Terminal::False)?;
                Terminal::AndOr(sub(0)?, sub(1)?, Arc::new(zero))
            }
            "andor" => {
                arity(3)?;
                Terminal::AndOr(sub(0)?, sub(1)?, sub(2)?)
            }
            "or_b" => {
                arity(2)?;
                Terminal::OrB(sub(0)?, sub(1)?)
            }
            "or_c" => {
                arity(2)?;
                Terminal::OrC(sub(0)?, sub(1)?)
            }
            "or_d" => {
                arity(2)?;
                Terminal::OrD(sub(0)?, sub(1)?)
            }
            "or_i" => {
                arity(2)?;
                Terminal::OrI(sub(0)?, sub(1)?)
            }
            "thresh" => {
                let k = parse_k(top)?;
                let subs = (1..top.args.len()).map(sub).collect::<Result<Vec<_>, _>>()?;
                let thresh = Threshold::new(k, subs).map_err(|e| malformed(e.into()))?;
                Terminal::Thresh(thresh)
            }
            "multi" | "sortedmulti" => {
                let k = parse_k(top)?;
                let mut keys = top.args[1..]
                    .iter()
                    .map(|arg| parse_placeholder(arg, map))
                    .collect::<Result<Vec<_>, _>>()?;
                if name == "sortedmulti" {
                    keys.sort_by(|a, b| a.pk.to_bytes().cmp(&b.pk.to_bytes()));
                }
                let thresh = Threshold::new(k, keys).map_err(|e| malformed(e.into()))?;
                Terminal::Multi(thresh)
            }
            "multi_a" | "sortedmulti_a" => {
                return Err(malformed(ParseError::TapscriptOnly(name.to_owned())))
            }
            _ => return Err(malformed(ParseError::UnknownFragment(name.to_owned()))),
        };

        let mut ms = typed(node)?;
        while let Some(ch) = wrap.pop() {
            let inner = Arc::new(ms);
            let node = match ch {
                'a' => Terminal::Alt(inner),
                's' => Terminal::Swap(inner),
                'c' => Terminal::Check(inner),
                'd' => Terminal::DupIf(inner),
                'v' => Terminal::Verify(inner),
                'j' => Terminal::NonZero(inner),
                'n' => Terminal::ZeroNotEqual(inner),
                't' => Terminal::AndV(inner, Arc::new(typed(Terminal::True)?)),
                'u' => Terminal::OrI(inner, Arc::new(typed(Terminal::False)?)),
                'l' => Terminal::OrI(Arc::new(typed(Terminal::False)?), inner),
                x => return Err(malformed(ParseError::UnknownWrapper(x))),
            };
            ms = typed(node)?;
        }
        Ok(ms)
    }

    /// Whether every satisfaction requires a signature.
    pub fn requires_sig(&self) -> bool { self.ty.mall.safe }

    /// Whether a non-malleable satisfaction is guaranteed to exist.
    pub fn is_non_malleable(&self) -> bool { self.ty.mall.non_malleable }

    /// Whether some spending path mixes heightlocks and timelocks.
    pub fn has_mixed_timelocks(&self) -> bool { self.timelocks.contains_unspendable_path() }

    /// The first key used more than once, if any.
    pub fn repeated_key(&self) -> Option<PublicKey> {
        let mut seen = Vec::new();
        for key in self.iter_keys() {
            if seen.contains(&key.pk) {
                return Some(key.pk);
            }
            seen.push(key.pk);
        }
        None
    }

    /// Checks that the miniscript is safe to use as a whole: it has base
    /// type `B`, always needs a signature, is non-malleable, never mixes
    /// height- and timelocks on one path and uses each key once.
    pub fn sanity_check(&self) -> Result<(), SanityError> {
        if self.ty.corr.base != Base::B {
            Err(SanityError::NotBaseB)
        } else if !self.requires_sig() {
            Err(SanityError::SiglessBranch)
        } else if !self.is_non_malleable() {
            Err(SanityError::Malleable)
        } else if self.has_mixed_timelocks() {
            Err(SanityError::TimelockMixing)
        } else if let Some(pk) = self.repeated_key() {
            Err(SanityError::RepeatedKey(pk))
        } else {
            Ok(())
        }
    }

    /// Pre-order iterator over this fragment and all its descendants.
    pub fn iter(&self) -> PreOrderIter<'_> { PreOrderIter { stack: vec![self] } }

    /// All keys, in the order they appear in the script.
    pub fn iter_keys(&self) -> impl Iterator<Item = KeyRef> + '_ {
        self.iter().flat_map(|ms| match ms.node {
            Terminal::PkK(key) | Terminal::PkH(key) => vec![key],
            Terminal::Multi(ref thresh) => thresh.data().to_vec(),
            _ => vec![],
        })
    }
}

/// Iterator over a miniscript and its descendants, parents first.
pub struct PreOrderIter<'a> {
    stack: Vec<&'a Miniscript>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Miniscript;

    fn next(&mut self) -> Option<Self::Item> {
        let top = self.stack.pop()?;
        self.stack.extend(top.node.children().into_iter().rev().map(|sub| &**sub));
        Some(top)
    }
}

fn parse_placeholder(arg: &Tree, map: &ExpansionMap) -> Result<KeyRef, Error> {
    let unknown = || Error::malformed(arg.name, ParseError::UnknownPlaceholder(arg.name.to_owned()));
    if !arg.is_terminal() {
        return Err(unknown());
    }
    let index = arg
        .name
        .strip_prefix('@')
        .and_then(|n| parse_num(n).ok())
        .ok_or_else(unknown)? as usize;
    let key = map.get(index).ok_or_else(unknown)?;
    Ok(KeyRef { index, pk: key.public_key() })
}

fn parse_terminal_num(arg: &Tree) -> Result<u32, Error> {
    if !arg.is_terminal() {
        return Err(Error::malformed(&arg.to_string(), ParseError::Arity {
            name: arg.name.to_owned(),
            expected: 0,
            found: arg.args.len(),
        }));
    }
    parse_num(arg.name).map_err(|e| Error::malformed(arg.name, e))
}

fn parse_k(top: &Tree) -> Result<usize, Error> {
    match top.args.first() {
        Some(arg) => parse_terminal_num(arg).map(|k| k as usize),
        None => Err(Error::malformed(top.name, ParseError::Arity {
            name: top.name.to_owned(),
            expected: 2,
            found: 0,
        })),
    }
}

fn parse_hash<const N: usize>(arg: &Tree) -> Result<[u8; N], Error>
where
    [u8; N]: FromHex,
{
    let err = || {
        Error::malformed(arg.name, ParseError::HashLiteral {
            literal: arg.name.to_owned(),
            expected_len: N,
        })
    };
    if !arg.is_terminal() {
        return Err(err());
    }
    <[u8; N]>::from_hex(arg.name).map_err(|_| err())
}

#[cfg(test)]
mod tests {
    use bitcoin::secp256k1::Secp256k1;
    use bitcoin::Network;

    use super::*;
    use crate::descriptor::key::KeyContext;
    use crate::miniscript::types::ErrorKind;

    const KEYS: [&str; 3] = [
        "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2",
        "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
        "02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9",
    ];

    fn map() -> ExpansionMap {
        let text = format!("multi(1,{},{},{})", KEYS[0], KEYS[1], KEYS[2]);
        let ctx = KeyContext::segwit(Network::Bitcoin);
        expand(&text, &ctx, &Secp256k1::new()).unwrap().1
    }

    fn ms(s: &str) -> Result<Miniscript, Error> { Miniscript::parse(s, &map()) }

    fn type_error(s: &str) -> ErrorKind {
        match ms(s) {
            Err(Error::MalformedInput { reason: ParseError::Type(e), .. }) => e.kind,
            other => panic!("expected a type error for {}, got {:?}", s, other),
        }
    }

    #[test]
    fn aliases_desugar() {
        let pk = ms("pk(@0)").unwrap();
        assert!(matches!(pk.node, Terminal::Check(ref sub) if matches!(sub.node, Terminal::PkK(_))));
        let pkh = ms("pkh(@1)").unwrap();
        assert!(matches!(pkh.node, Terminal::Check(ref sub) if matches!(sub.node, Terminal::PkH(_))));
        let and_n = ms("and_n(pk(@0),pk(@1))").unwrap();
        assert!(matches!(and_n.node, Terminal::AndOr(_, _, ref c) if c.node == Terminal::False));
        let t = ms("and_v(v:pk(@0),t:older(10))").unwrap();
        assert_eq!(t.ty.corr.base, Base::B);
    }

    #[test]
    fn wrappers_apply_inside_out() {
        assert_eq!(type_error("or_d(pk(@0),s:pk(@1))"), ErrorKind::ChildBase2(Base::B, Base::W));
        let ok = ms("or_b(pk(@0),s:pk(@1))").unwrap();
        match ok.node {
            Terminal::OrB(_, ref r) => match r.node {
                Terminal::Swap(ref s) => assert!(matches!(s.node, Terminal::Check(_))),
                ref other => panic!("unexpected {:?}", other),
            },
            ref other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn type_errors() {
        assert_eq!(type_error("and_b(pk(@0),pk(@1))"), ErrorKind::ChildBase2(Base::B, Base::B));
        assert_eq!(type_error("v:pk_k(@0)"), ErrorKind::ChildBase1(Base::K));
        assert_eq!(type_error("or_d(pk(@0),v:pk(@1))"), ErrorKind::ChildBase2(Base::B, Base::V));
        assert_eq!(type_error("or_d(v:pk(@0),pk(@1))"), ErrorKind::LeftNotDissatisfiable);
        assert_eq!(type_error("s:pkh(@0)"), ErrorKind::SwapNonOne);
        assert_eq!(type_error("or_b(older(1),a:pk(@0))"), ErrorKind::LeftNotDissatisfiable);
        assert_eq!(type_error("thresh(1,pk(@0),pk(@1))"), ErrorKind::ThresholdBase(1, Base::B));
        assert_eq!(type_error("d:pk(@0)"), ErrorKind::ChildBase1(Base::B));
        assert_eq!(type_error("d:v:pk(@0)"), ErrorKind::NonZeroDupIf);
    }

    #[test]
    fn top_level_must_be_b() {
        let err = ms("v:pk(@0)").unwrap_err();
        assert_eq!(err, Error::malformed("v:pk(@0)", SanityError::NotBaseB));
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            ms("pk(@3)"),
            Err(Error::MalformedInput { reason: ParseError::UnknownPlaceholder(..), .. })
        ));
        assert!(matches!(
            ms("pk_q(@0)"),
            Err(Error::MalformedInput { reason: ParseError::UnknownFragment(..), .. })
        ));
        assert!(matches!(
            ms("x:pk(@0)"),
            Err(Error::MalformedInput { reason: ParseError::UnknownWrapper('x'), .. })
        ));
        assert!(matches!(
            ms("multi_a(1,@0,@1)"),
            Err(Error::MalformedInput { reason: ParseError::TapscriptOnly(..), .. })
        ));
        assert!(matches!(
            ms("and_v(v:pk(@0))"),
            Err(Error::MalformedInput { reason: ParseError::Arity { expected: 2, found: 1, .. }, .. })
        ));
        assert!(matches!(
            ms("older(0)"),
            Err(Error::MalformedInput { reason: ParseError::RelativeLockTime(..), .. })
        ));
        assert!(matches!(
            ms("multi(4,@0,@1,@2)"),
            Err(Error::MalformedInput { reason: ParseError::Threshold(..), .. })
        ));
        assert!(matches!(
            ms("and_v(v:sha256(abcd),pk(@0))"),
            Err(Error::MalformedInput { reason: ParseError::HashLiteral { expected_len: 32, .. }, .. })
        ));
    }

    #[test]
    fn sortedmulti_orders_by_key() {
        let ms = ms("sortedmulti(2,@0,@1,@2)").unwrap();
        let order: Vec<usize> = ms.iter_keys().map(|k| k.index).collect();
        // 02c6.. < 02f9.. < 0339..
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn sanity() {
        assert_eq!(ms("or_d(pk(@0),pk(@1))").unwrap().sanity_check(), Ok(()));
        assert_eq!(ms("older(10)").unwrap().sanity_check(), Err(SanityError::SiglessBranch));
        assert_eq!(
            ms("or_i(pk(@0),older(10))").unwrap().sanity_check(),
            Err(SanityError::SiglessBranch)
        );
        assert_eq!(
            ms("and_v(v:pk(@0),or_i(older(10),older(20)))").unwrap().sanity_check(),
            Err(SanityError::Malleable)
        );
        assert_eq!(
            ms("and_v(v:pk(@0),and_v(v:after(100),after(500000001)))").unwrap().sanity_check(),
            Err(SanityError::TimelockMixing)
        );
        assert_eq!(
            ms("and_v(v:pk(@0),or_i(after(100),after(500000001)))").unwrap().sanity_check(),
            Err(SanityError::Malleable)
        );
        let repeated = ms("and_v(v:pk(@0),pk(@0))").unwrap();
        let pk = map().get(0).unwrap().public_key();
        assert_eq!(repeated.sanity_check(), Err(SanityError::RepeatedKey(pk)));
    }

    #[test]
    fn hash_kinds() {
        let preimage = [0u8; 32];
        assert_eq!(
            HashKind::Sha256.hash(&preimage),
            Vec::<u8>::from_hex("66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925")
                .unwrap()
        );
        assert_eq!(HashKind::Hash160.hash(&preimage).len(), 20);
        assert_eq!(HashKind::Ripemd160.digest_len(), 20);
    }
}
