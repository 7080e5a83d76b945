// SPDX-License-Identifier: CC0-1.0

//! # Output Descriptors
//!
//! Tools for representing Bitcoin output's scriptPubKeys as abstract spending
//! policies known as "output descriptors".
//!
//! A [`Descriptor`] is resolved for a single derivation index when it is
//! constructed: keys are derived, the script is compiled and checked against
//! the standardness limits, and the cheapest spending path for the
//! configured signers is planned. Everything after that is a cheap accessor.
//!
//! The supported forms are `addr()`, `pk()`, `pkh()`, `wpkh()`,
//! `sh(wpkh())`, `wsh()`, `sh(wsh())` and `sh()`, the last three over an
//! arbitrary miniscript.

use core::fmt;
use std::collections::BTreeMap;

use bitcoin::bip32::KeySource;
use bitcoin::secp256k1::{self, Secp256k1, Signing, Verification};
use bitcoin::{absolute, Address, Network, PublicKey, Script, ScriptBuf, Sequence};

use crate::expression::Tree;
use crate::miniscript::limits::{check_p2sh_script, check_witness_script};
use crate::miniscript::satisfy::SatisfyError;
use crate::miniscript::{
    expand, Assets, ExpansionMap, Miniscript, PartialSig, Plan, Preimage, Satisfied,
    TimeConstraints,
};
use crate::util::witness_to_scriptsig;
use crate::{Error, ParseError};

mod addr;
mod bare;
pub mod checksum;
pub mod key;
mod options;
mod segwitv0;
mod sh;

pub use self::checksum::{desc_checksum, validate};
pub use self::key::{KeyContext, KeyExpression};
pub use self::options::DescriptorOptions;

/// The script type of a descriptor.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum DescriptorKind {
    /// `addr()`
    Addr,
    /// Bare `pk()`
    Pk,
    /// `pkh()`
    Pkh,
    /// `wpkh()`
    Wpkh,
    /// `sh(wpkh())`
    ShWpkh,
    /// `wsh()`
    Wsh,
    /// `sh(wsh())`
    ShWsh,
    /// `sh()` over a miniscript
    Sh,
}

impl DescriptorKind {
    /// Dispatches on the top-level names of `top`, returning the kind and
    /// its innermost argument: a key token, a miniscript or an address.
    fn from_tree<'t, 'a>(top: &'t Tree<'a>) -> Result<(Self, &'t Tree<'a>), ParseError> {
        let kind = match top.name {
            "addr" => DescriptorKind::Addr,
            "pk" => DescriptorKind::Pk,
            "pkh" => DescriptorKind::Pkh,
            "wpkh" => DescriptorKind::Wpkh,
            "wsh" => DescriptorKind::Wsh,
            "sh" => {
                let inner = single_arg(top)?;
                return match inner.name {
                    "wpkh" => Ok((DescriptorKind::ShWpkh, single_arg(inner)?)),
                    "wsh" => Ok((DescriptorKind::ShWsh, single_arg(inner)?)),
                    _ => Ok((DescriptorKind::Sh, inner)),
                };
            }
            name => return Err(ParseError::UnknownDescriptor(name.to_owned())),
        };
        Ok((kind, single_arg(top)?))
    }

    /// The descriptor function(s), e.g. `sh(wsh)`.
    pub fn name(self) -> &'static str {
        match self {
            DescriptorKind::Addr => "addr",
            DescriptorKind::Pk => "pk",
            DescriptorKind::Pkh => "pkh",
            DescriptorKind::Wpkh => "wpkh",
            DescriptorKind::ShWpkh => "sh(wpkh)",
            DescriptorKind::Wsh => "wsh",
            DescriptorKind::ShWsh => "sh(wsh)",
            DescriptorKind::Sh => "sh",
        }
    }

    /// Whether outputs of this kind are spent from the witness.
    ///
    /// For `addr()` this depends on the address; see [`Descriptor::is_segwit`].
    pub fn is_segwit(self) -> bool {
        match self {
            DescriptorKind::Wpkh
            | DescriptorKind::ShWpkh
            | DescriptorKind::Wsh
            | DescriptorKind::ShWsh => true,
            DescriptorKind::Addr | DescriptorKind::Pk | DescriptorKind::Pkh | DescriptorKind::Sh => {
                false
            }
        }
    }

    /// Rebuilds the descriptor around an expanded inner expression.
    fn wrap(self, inner: &str) -> String {
        match self {
            DescriptorKind::Addr | DescriptorKind::Pk | DescriptorKind::Pkh => inner.to_owned(),
            DescriptorKind::Wpkh => format!("wpkh({})", ExpansionMap::placeholder(0)),
            DescriptorKind::ShWpkh => format!("sh(wpkh({}))", ExpansionMap::placeholder(0)),
            DescriptorKind::Wsh => format!("wsh({})", inner),
            DescriptorKind::ShWsh => format!("sh(wsh({}))", inner),
            DescriptorKind::Sh => format!("sh({})", inner),
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.name()) }
}

fn single_arg<'t, 'a>(tree: &'t Tree<'a>) -> Result<&'t Tree<'a>, ParseError> {
    match tree.args.as_slice() {
        [arg] => Ok(arg),
        args => {
            Err(ParseError::Arity { name: tree.name.to_owned(), expected: 1, found: args.len() })
        }
    }
}

/// Replaces every `*` of a ranged descriptor by `index`.
///
/// Hardened wildcards become hardened steps, since `*'` turns into `5'`.
fn substitute_wildcards(body: &str, index: Option<u32>) -> Result<String, ParseError> {
    match (body.contains('*'), index) {
        (false, None) => Ok(body.to_owned()),
        (false, Some(_)) => Err(ParseError::UnexpectedIndex),
        (true, None) => Err(ParseError::MissingIndex),
        (true, Some(index)) if index >= 1 << 31 => Err(ParseError::IndexOutOfRange(index)),
        (true, Some(index)) => Ok(body.replace('*', &index.to_string())),
    }
}

/// The scripts and address an output pays to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Payment {
    /// The output script.
    pub script_pubkey: ScriptBuf,
    /// The address, for forms that have one.
    pub address: Option<Address>,
    /// P2SH redeem script.
    pub redeem_script: Option<ScriptBuf>,
    /// P2WSH witness script.
    pub witness_script: Option<ScriptBuf>,
}

/// A miniscript resolved against its keys.
struct Resolved {
    expanded: String,
    map: ExpansionMap,
    ms: Miniscript,
}

impl Resolved {
    /// A single key wrapped in the equivalent `pk()` or `pkh()` miniscript.
    fn single_key<C: Signing + Verification>(
        fragment: &str,
        token: &str,
        ctx: &KeyContext,
        secp: &Secp256k1<C>,
    ) -> Result<(Self, PublicKey), Error> {
        let key = KeyExpression::parse(token, ctx, secp)?;
        let pk = key.public_key();
        let map = ExpansionMap::single(key);
        let expanded = format!("{}({})", fragment, ExpansionMap::placeholder(0));
        let ms = Miniscript::parse(&expanded, &map)?;
        Ok((Resolved { expanded, map, ms }, pk))
    }

    /// An arbitrary miniscript, which must pass the sanity checks.
    fn miniscript<C: Signing + Verification>(
        text: &str,
        ctx: &KeyContext,
        secp: &Secp256k1<C>,
    ) -> Result<Self, Error> {
        let (expanded, map) = expand(text, ctx, secp)?;
        let ms = Miniscript::parse(&expanded, &map)?;
        ms.sanity_check().map_err(|e| Error::malformed(text, e))?;
        log::debug!("expanded `{}` to `{}` with {}", text, expanded, map);
        Ok(Resolved { expanded, map, ms })
    }
}

/// An output descriptor resolved for one derivation index.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Descriptor {
    /// The text as written, without checksum.
    expression: String,
    kind: DescriptorKind,
    network: Network,
    ranged: bool,
    segwit: bool,
    payment: Payment,
    expanded_expression: String,
    expanded_miniscript: Option<String>,
    map: ExpansionMap,
    miniscript: Option<Miniscript>,
    key_sources: BTreeMap<secp256k1::PublicKey, KeySource>,
    preimages: Vec<Preimage>,
    plan: Result<Plan, SatisfyError>,
}

impl Descriptor {
    /// Parses and resolves a descriptor.
    ///
    /// The checksum is verified when present (and required if
    /// [`DescriptorOptions::checksum_required`] is set), wildcards are
    /// replaced by [`DescriptorOptions::index`], every key is derived and
    /// the compiled script is checked against the standardness limits.
    pub fn new<C: Signing + Verification>(
        text: &str,
        options: &DescriptorOptions,
        secp: &Secp256k1<C>,
    ) -> Result<Self, Error> {
        let body = checksum::verify_checksum(text, options.checksum_required)
            .map_err(|e| Error::malformed(text, e))?;
        let ranged = body.contains('*');
        let resolved_text =
            substitute_wildcards(body, options.index).map_err(|e| Error::malformed(body, e))?;
        let top = Tree::from_str(&resolved_text).map_err(|e| Error::malformed(&resolved_text, e))?;
        let (kind, inner) =
            DescriptorKind::from_tree(&top).map_err(|e| Error::malformed(&resolved_text, e))?;
        log::debug!("parsing `{}` as a {} descriptor", resolved_text, kind);

        let network = options.network;
        let arg = inner.to_string();
        let limit = |e| Error::limit(&resolved_text, e);
        let uncompressed = |_| {
            Error::malformed(&arg, ParseError::Key(key::KeyParseError::UncompressedInSegwit))
        };

        let (payment, segwit, resolved) = match kind {
            DescriptorKind::Addr => {
                let (payment, segwit) = addr::addr(&arg, network)?;
                (payment, segwit, None)
            }
            DescriptorKind::Pk => {
                let (resolved, _) =
                    Resolved::single_key("pk", &arg, &KeyContext::legacy(network), secp)?;
                (bare::pk(&resolved.ms), false, Some(resolved))
            }
            DescriptorKind::Pkh => {
                let (resolved, pk) =
                    Resolved::single_key("pkh", &arg, &KeyContext::legacy(network), secp)?;
                (bare::pkh(&pk, network), false, Some(resolved))
            }
            DescriptorKind::Wpkh | DescriptorKind::ShWpkh => {
                let (resolved, pk) =
                    Resolved::single_key("pkh", &arg, &KeyContext::segwit(network), secp)?;
                let payment = if kind == DescriptorKind::Wpkh {
                    segwitv0::wpkh(&pk, network)
                } else {
                    sh::sh_wpkh(&pk, network)
                }
                .map_err(uncompressed)?;
                (payment, true, Some(resolved))
            }
            DescriptorKind::Wsh | DescriptorKind::ShWsh => {
                let resolved = Resolved::miniscript(&arg, &KeyContext::segwit(network), secp)?;
                let script = resolved.ms.encode();
                check_witness_script(&script).map_err(limit)?;
                let payment = if kind == DescriptorKind::Wsh {
                    segwitv0::wsh(script, network)
                } else {
                    sh::sh_wsh(script, network)
                };
                (payment, true, Some(resolved))
            }
            DescriptorKind::Sh => {
                if !options.allow_miniscript_in_p2sh {
                    sh::check_standard(inner).map_err(limit)?;
                }
                let resolved = Resolved::miniscript(&arg, &KeyContext::legacy(network), secp)?;
                let script = resolved.ms.encode();
                check_p2sh_script(&script).map_err(limit)?;
                (sh::sh(script, network).map_err(limit)?, false, Some(resolved))
            }
        };

        let (expanded_expression, expanded_miniscript, map, miniscript) = match resolved {
            Some(Resolved { expanded, map, ms }) => {
                (kind.wrap(&expanded), Some(expanded), map, Some(ms))
            }
            None => (resolved_text.clone(), None, ExpansionMap::new(), None),
        };

        let key_sources = map
            .iter()
            .filter_map(|(_, key)| Some((key.public_key().inner, key.key_source(secp)?)))
            .collect();

        let plan = match miniscript {
            Some(ref ms) => {
                let assets = Assets {
                    signers: options.signers.clone().unwrap_or_else(|| map.public_keys()),
                    preimages: options.preimages.clone(),
                    constraints: None,
                };
                ms.plan(&assets)
            }
            None => Err(SatisfyError::UnsupportedKind(kind.name().to_owned())),
        };
        match plan {
            Ok(ref plan) => log::debug!(
                "planned {} for `{}`: {} witness bytes",
                plan,
                expanded_expression,
                plan.witness_size()
            ),
            Err(ref e) => log::debug!("no spending plan for `{}`: {}", expanded_expression, e),
        }

        Ok(Descriptor {
            expression: body.to_owned(),
            kind,
            network,
            ranged,
            segwit,
            payment,
            expanded_expression,
            expanded_miniscript,
            map,
            miniscript,
            key_sources,
            preimages: options.preimages.clone(),
            plan,
        })
    }

    /// Parses a descriptor for `network` with default options.
    pub fn parse(text: &str, network: Network) -> Result<Self, Error> {
        Descriptor::new(text, &DescriptorOptions::new(network), &Secp256k1::new())
    }

    /// The script type.
    pub fn kind(&self) -> DescriptorKind { self.kind }

    /// The network the descriptor was resolved for.
    pub fn network(&self) -> Network { self.network }

    /// Whether the descriptor had a wildcard.
    pub fn is_ranged(&self) -> bool { self.ranged }

    /// Whether outputs are spent from the witness.
    pub fn is_segwit(&self) -> bool { self.segwit }

    /// The output script.
    pub fn script_pubkey(&self) -> &Script { &self.payment.script_pubkey }

    /// The address of the output.
    ///
    /// Bare `pk()` descriptors have no address.
    pub fn address(&self) -> Result<Address, Error> {
        self.payment
            .address
            .clone()
            .ok_or_else(|| Error::malformed(&self.expression, ParseError::NoAddress))
    }

    /// The P2SH redeem script, for `sh` forms.
    pub fn redeem_script(&self) -> Option<&Script> { self.payment.redeem_script.as_deref() }

    /// The witness script, for `wsh` forms.
    pub fn witness_script(&self) -> Option<&Script> { self.payment.witness_script.as_deref() }

    /// All scripts and the address of the output.
    pub fn payment(&self) -> &Payment { &self.payment }

    /// The descriptor with every key replaced by its placeholder, e.g.
    /// `wsh(and_v(v:pk(@0),pk(@1)))`.
    pub fn expanded_expression(&self) -> &str { &self.expanded_expression }

    /// The expanded miniscript that is compiled and satisfied.
    ///
    /// Single-key forms report the equivalent `pk(@0)` or `pkh(@0)`;
    /// `addr()` has none.
    pub fn expanded_miniscript(&self) -> Option<&str> { self.expanded_miniscript.as_deref() }

    /// The placeholder to key mapping.
    pub fn expansion_map(&self) -> &ExpansionMap { &self.map }

    /// The parsed miniscript behind [`Descriptor::expanded_miniscript`].
    pub fn miniscript(&self) -> Option<&Miniscript> { self.miniscript.as_ref() }

    /// Master fingerprint and path of every key that has one, by leaf key.
    pub fn key_sources(&self) -> &BTreeMap<secp256k1::PublicKey, KeySource> {
        &self.key_sources
    }

    /// The spending plan for the configured signers and preimages.
    pub fn plan(&self) -> Result<&Plan, Error> {
        self.plan.as_ref().map_err(|e| Error::unsatisfiable(&self.expression, e.clone()))
    }

    /// The locktime and sequence a spending transaction must commit to
    /// before signing.
    pub fn time_constraints(&self) -> Result<TimeConstraints, Error> {
        self.plan().map(Plan::time_constraints)
    }

    /// The nLockTime required by the planned spending path.
    pub fn lock_time(&self) -> Result<Option<absolute::LockTime>, Error> {
        self.time_constraints().map(|c| c.lock_time())
    }

    /// The relative timelock required by the planned spending path.
    pub fn sequence(&self) -> Result<Option<Sequence>, Error> {
        self.time_constraints().map(|c| c.sequence())
    }

    /// Builds the witness stack from real signatures, committed to the
    /// planned timelocks.
    ///
    /// The stack excludes the redeem and witness scripts.
    pub fn script_satisfaction(&self, sigs: &[PartialSig]) -> Result<Satisfied, Error> {
        self.committed_satisfaction(sigs, &self.time_constraints()?)
    }

    /// Like [`Descriptor::script_satisfaction`], for the locktime and
    /// sequence a transaction actually carries.
    pub fn committed_satisfaction(
        &self,
        sigs: &[PartialSig],
        constraints: &TimeConstraints,
    ) -> Result<Satisfied, Error> {
        let ms = self.miniscript.as_ref().ok_or_else(|| {
            Error::unsatisfiable(
                &self.expression,
                SatisfyError::UnsupportedKind(self.kind.name().to_owned()),
            )
        })?;
        ms.satisfy(sigs, &self.preimages, Some(constraints))
            .map_err(|e| Error::unsatisfiable(&self.expression, e))
    }

    /// Builds the final scriptSig and witness of an input spending this
    /// output.
    pub fn satisfy(&self, sigs: &[PartialSig]) -> Result<(ScriptBuf, bitcoin::Witness), Error> {
        self.satisfy_committed(sigs, &self.time_constraints()?)
    }

    /// Like [`Descriptor::satisfy`], for the locktime and sequence a
    /// transaction actually carries.
    pub fn satisfy_committed(
        &self,
        sigs: &[PartialSig],
        constraints: &TimeConstraints,
    ) -> Result<(ScriptBuf, bitcoin::Witness), Error> {
        let Satisfied { mut stack, .. } = self.committed_satisfaction(sigs, constraints)?;
        stack.extend(self.payment.witness_script.as_ref().map(|s| s.to_bytes()));
        let redeem = self.payment.redeem_script.as_ref().map(|s| s.to_bytes());

        let (script_sig, witness) = if self.segwit {
            (redeem.into_iter().collect(), bitcoin::Witness::from_slice(&stack))
        } else {
            stack.extend(redeem);
            (stack, bitcoin::Witness::new())
        };
        let script_sig = witness_to_scriptsig(&script_sig)
            .map_err(|e| Error::limit(&self.expression, e))?;
        Ok((script_sig, witness))
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use fmt::Write;
        let mut wrapped_f = checksum::Formatter::new(f);
        wrapped_f.write_str(&self.expression)?;
        wrapped_f.write_checksum_if_not_alt()
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::secp256k1::{Message, SecretKey};
    use bitcoin::ecdsa;

    use super::*;
    use crate::miniscript::limits::LimitError;

    fn secret(i: u8) -> SecretKey { SecretKey::from_slice(&[i; 32]).unwrap() }

    fn key(i: u8) -> PublicKey {
        PublicKey::new(secret(i).public_key(&Secp256k1::signing_only()))
    }

    fn sig(i: u8) -> PartialSig {
        let secp = Secp256k1::signing_only();
        let msg = Message::from_digest([0x42; 32]);
        PartialSig::new(key(i), ecdsa::Signature::sighash_all(secp.sign_ecdsa(&msg, &secret(i))))
    }

    fn desc(text: &str) -> Descriptor { Descriptor::parse(text, Network::Bitcoin).unwrap() }

    #[test]
    fn kinds() {
        let k = key(1);
        let cases = [
            (format!("pk({})", k), DescriptorKind::Pk, false),
            (format!("pkh({})", k), DescriptorKind::Pkh, false),
            (format!("wpkh({})", k), DescriptorKind::Wpkh, true),
            (format!("sh(wpkh({}))", k), DescriptorKind::ShWpkh, true),
            (format!("wsh(pk({}))", k), DescriptorKind::Wsh, true),
            (format!("sh(wsh(pk({})))", k), DescriptorKind::ShWsh, true),
            (format!("sh(pk({}))", k), DescriptorKind::Sh, false),
        ];
        for (text, kind, segwit) in cases.iter() {
            let d = desc(text);
            assert_eq!(d.kind(), *kind, "{}", text);
            assert_eq!(d.is_segwit(), *segwit, "{}", text);
            assert_eq!(kind.is_segwit(), *segwit);
            assert!(!d.is_ranged());
        }
    }

    #[test]
    fn expanded_forms() {
        let d = desc(&format!("sh(wpkh({}))", key(1)));
        assert_eq!(d.expanded_expression(), "sh(wpkh(@0))");
        assert_eq!(d.expanded_miniscript(), Some("pkh(@0)"));

        let d = desc(&format!("wsh(and_v(v:pk({}),pk({})))", key(1), key(2)));
        assert_eq!(d.expanded_expression(), "wsh(and_v(v:pk(@0),pk(@1)))");
        assert_eq!(d.expansion_map().public_keys(), vec![key(1), key(2)]);
        assert_eq!(d.witness_script().unwrap().len(), 70);
        assert!(d.redeem_script().is_none());
    }

    #[test]
    fn scripts_agree() {
        let d = desc(&format!("sh(wsh(pk({})))", key(1)));
        let ws = d.witness_script().unwrap();
        assert_eq!(
            d.redeem_script().unwrap(),
            Address::p2wsh(ws, Network::Bitcoin).script_pubkey().as_script()
        );
        assert_eq!(d.address().unwrap().script_pubkey().as_script(), d.script_pubkey());

        let d = desc(&format!("pk({})", key(1)));
        assert!(matches!(
            d.address(),
            Err(Error::MalformedInput { reason: ParseError::NoAddress, .. })
        ));
    }

    #[test]
    fn unknown_and_arity() {
        assert!(matches!(
            Descriptor::parse("tr(x)", Network::Bitcoin),
            Err(Error::MalformedInput { reason: ParseError::UnknownDescriptor(..), .. })
        ));
        let text = format!("pk({},{})", key(1), key(2));
        assert!(matches!(
            Descriptor::parse(&text, Network::Bitcoin),
            Err(Error::MalformedInput { reason: ParseError::Arity { expected: 1, found: 2, .. }, .. })
        ));
    }

    #[test]
    fn wildcards() {
        assert_eq!(substitute_wildcards("a/*", Some(7)).unwrap(), "a/7");
        assert_eq!(substitute_wildcards("a/*'", Some(7)).unwrap(), "a/7'");
        assert_eq!(substitute_wildcards("a", None).unwrap(), "a");
        assert_eq!(substitute_wildcards("a/*", None), Err(ParseError::MissingIndex));
        assert_eq!(substitute_wildcards("a", Some(1)), Err(ParseError::UnexpectedIndex));
        assert_eq!(
            substitute_wildcards("a/*", Some(1 << 31)),
            Err(ParseError::IndexOutOfRange(1 << 31))
        );
    }

    #[test]
    fn sh_standardness() {
        let text = format!("sh(and_v(v:pk({}),pk({})))", key(1), key(2));
        assert!(matches!(
            Descriptor::parse(&text, Network::Bitcoin),
            Err(Error::ResourceLimitExceeded { limit: LimitError::NonStandardP2sh(..), .. })
        ));
        let options = DescriptorOptions::new(Network::Bitcoin).with_miniscript_in_p2sh(true);
        let d = Descriptor::new(&text, &options, &Secp256k1::new()).unwrap();
        assert_eq!(d.kind(), DescriptorKind::Sh);
    }

    #[test]
    fn display_roundtrips_checksum() {
        let text = format!("wpkh({})", key(3));
        let d = desc(&text);
        let shown = d.to_string();
        assert!(shown.starts_with(&text));
        assert!(validate(&shown));
        assert_eq!(format!("{:#}", d), text);
        assert_eq!(desc(&shown), d);
    }

    #[test]
    fn satisfy_legacy_and_segwit() {
        let d = desc(&format!("pkh({})", key(1)));
        let (script_sig, witness) = d.satisfy(&[sig(1)]).unwrap();
        assert!(witness.is_empty());
        assert_eq!(script_sig.instructions().count(), 2);

        let d = desc(&format!("sh(wpkh({}))", key(1)));
        let (script_sig, witness) = d.satisfy(&[sig(1)]).unwrap();
        assert_eq!(witness.len(), 2);
        assert_eq!(script_sig.len(), 23);

        let d = desc(&format!("wsh(pk({}))", key(1)));
        let (script_sig, witness) = d.satisfy(&[sig(1)]).unwrap();
        assert!(script_sig.is_empty());
        assert_eq!(witness.len(), 2);
        assert_eq!(witness.last().unwrap(), d.witness_script().unwrap().as_bytes());

        let err = d.satisfy(&[sig(2)]).unwrap_err();
        assert!(err.is_unsatisfiable());
    }

    #[test]
    fn timelock_plan() {
        let text = format!("wsh(or_d(pk({}),and_v(v:pk({}),older(144))))", key(1), key(2));
        let all = desc(&text);
        assert_eq!(all.sequence().unwrap(), None);

        let options = DescriptorOptions::new(Network::Bitcoin).with_signers(vec![key(2)]);
        let d = Descriptor::new(&text, &options, &Secp256k1::new()).unwrap();
        assert_eq!(d.sequence().unwrap(), Some(Sequence::from_height(144)));
        assert_eq!(d.lock_time().unwrap(), None);
        let sat = d.script_satisfaction(&[sig(2)]).unwrap();
        assert_eq!(sat.sequence, Some(Sequence::from_height(144)));
    }

    #[test]
    fn addr_cannot_be_satisfied() {
        let d = desc("addr(bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq)");
        assert_eq!(d.kind(), DescriptorKind::Addr);
        assert!(d.is_segwit());
        assert!(d.miniscript().is_none());
        assert!(d.satisfy(&[]).unwrap_err().is_unsatisfiable());
        assert!(d.time_constraints().is_err());
    }
}
