// SPDX-License-Identifier: CC0-1.0

//! Key expressions
//!
//! A key expression is one key token of a descriptor: a hex public key, a
//! WIF private key, or an extended key followed by a derivation path, each
//! optionally preceded by `[fingerprint/origin/path]`. Parsing resolves the
//! token to the leaf public key right away, so a [`KeyExpression`] always
//! knows its public key even when the token carries private material.

use core::fmt;
use core::str::FromStr;

use bitcoin::bip32::{self, ChildNumber, DerivationPath, Fingerprint, Xpriv, Xpub};
use bitcoin::hex::FromHex;
use bitcoin::secp256k1::{Secp256k1, Signing, Verification};
use bitcoin::{key, Network, NetworkKind, PrivateKey, PublicKey};

use crate::expression::parse_num;
use crate::{Error, ParseError};

/// The context a key token is interpreted in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyContext {
    /// Whether the key ends up in a segwit v0 script, which forbids uncompressed keys.
    pub segwit: bool,
    /// Network the extended and WIF keys must belong to.
    pub network: Network,
}

impl KeyContext {
    /// Context for a key inside a segwit v0 script.
    pub fn segwit(network: Network) -> Self { KeyContext { segwit: true, network } }

    /// Context for a key inside a legacy script.
    pub fn legacy(network: Network) -> Self { KeyContext { segwit: false, network } }
}

/// Extended key material as written in the token, before child derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtendedKey {
    /// An `xpub`/`tpub`.
    Public(Xpub),
    /// An `xprv`/`tprv`.
    Private(Xpriv),
}

impl ExtendedKey {
    /// Depth of the extended key in its BIP-32 tree.
    pub fn depth(&self) -> u8 {
        match *self {
            ExtendedKey::Public(ref xpub) => xpub.depth,
            ExtendedKey::Private(ref xprv) => xprv.depth,
        }
    }

    /// Chain code of the extended key.
    pub fn chain_code(&self) -> bip32::ChainCode {
        match *self {
            ExtendedKey::Public(ref xpub) => xpub.chain_code,
            ExtendedKey::Private(ref xprv) => xprv.chain_code,
        }
    }

    /// Fingerprint of the extended key's parent.
    pub fn parent_fingerprint(&self) -> Fingerprint {
        match *self {
            ExtendedKey::Public(ref xpub) => xpub.parent_fingerprint,
            ExtendedKey::Private(ref xprv) => xprv.parent_fingerprint,
        }
    }

    /// Network kind the extended key is encoded for.
    pub fn network(&self) -> NetworkKind {
        match *self {
            ExtendedKey::Public(ref xpub) => xpub.network,
            ExtendedKey::Private(ref xprv) => xprv.network,
        }
    }
}

/// Malformed key tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// `[` without a matching `]`, or an empty origin.
    MalformedOrigin,
    /// Origin fingerprint was not exactly 8 hex characters.
    Fingerprint(String),
    /// A derivation step could not be parsed.
    DerivationStep(String),
    /// The token still contains a `*` wildcard.
    UnresolvedWildcard,
    /// A derivation path followed a key which is not an extended key.
    PathOnSingleKey,
    /// Hex public key could not be parsed.
    PublicKey(key::ParsePublicKeyError),
    /// WIF private key could not be parsed.
    Wif(key::FromWifError),
    /// Extended key could not be parsed.
    ExtendedKey(bip32::Error),
    /// The key was encoded for another network.
    NetworkMismatch {
        /// Network kind required by the context.
        expected: NetworkKind,
        /// Network kind of the key.
        found: NetworkKind,
    },
    /// Uncompressed keys are not allowed in segwit scripts.
    UncompressedInSegwit,
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            KeyParseError::MalformedOrigin => f.write_str("malformed key origin"),
            KeyParseError::Fingerprint(ref fp) => {
                write!(f, "key origin fingerprint `{}` must be 8 hex characters", fp)
            }
            KeyParseError::DerivationStep(ref step) => {
                write!(f, "invalid derivation step `{}`", step)
            }
            KeyParseError::UnresolvedWildcard => {
                f.write_str("wildcard must be resolved with a derivation index")
            }
            KeyParseError::PathOnSingleKey => {
                f.write_str("derivation path after a key which is not an extended key")
            }
            KeyParseError::PublicKey(ref e) => write!(f, "invalid public key: {}", e),
            KeyParseError::Wif(ref e) => write!(f, "invalid private key: {}", e),
            KeyParseError::ExtendedKey(ref e) => write!(f, "invalid extended key: {}", e),
            KeyParseError::NetworkMismatch { expected, found } => {
                write!(f, "key is for {:?}, expected {:?}", found, expected)
            }
            KeyParseError::UncompressedInSegwit => {
                f.write_str("uncompressed keys are not allowed in segwit scripts")
            }
        }
    }
}

impl std::error::Error for KeyParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            KeyParseError::PublicKey(ref e) => Some(e),
            KeyParseError::Wif(ref e) => Some(e),
            KeyParseError::ExtendedKey(ref e) => Some(e),
            _ => None,
        }
    }
}

/// Child derivation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// Hardened step requested from an extended public key.
    HardenedAfterPublic(ChildNumber),
    /// The BIP-32 derivation itself failed.
    Bip32(bip32::Error),
}

impl fmt::Display for DerivationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DerivationError::HardenedAfterPublic(step) => {
                write!(f, "cannot derive hardened step {} from an extended public key", step)
            }
            DerivationError::Bip32(ref e) => write!(f, "derivation failed: {}", e),
        }
    }
}

impl std::error::Error for DerivationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            DerivationError::HardenedAfterPublic(_) => None,
            DerivationError::Bip32(ref e) => Some(e),
        }
    }
}

/// A parsed key token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyExpression {
    token: String,
    public_key: PublicKey,
    origin: Option<(Fingerprint, DerivationPath)>,
    extended: Option<ExtendedKey>,
    path: DerivationPath,
    private_key: Option<PrivateKey>,
}

impl KeyExpression {
    /// Parses a single key token.
    pub fn parse<C: Signing + Verification>(
        token: &str,
        ctx: &KeyContext,
        secp: &Secp256k1<C>,
    ) -> Result<Self, Error> {
        let malformed = |reason: KeyParseError| Error::malformed(token, ParseError::Key(reason));
        if token.contains('*') {
            return Err(malformed(KeyParseError::UnresolvedWildcard));
        }

        let (origin, rest) = parse_origin(token).map_err(malformed)?;
        let mut parts = rest.split('/');
        let key_str = parts.next().unwrap_or("");
        let steps = parts
            .map(parse_step)
            .collect::<Result<Vec<ChildNumber>, _>>()
            .map_err(malformed)?;

        let expected = NetworkKind::from(ctx.network);
        let (public_key, extended, private_key) = if is_hex_pubkey(key_str) {
            if !steps.is_empty() {
                return Err(malformed(KeyParseError::PathOnSingleKey));
            }
            let pk = PublicKey::from_str(key_str)
                .map_err(|e| malformed(KeyParseError::PublicKey(e)))?;
            (pk, None, None)
        } else if key_str.starts_with("xpub") || key_str.starts_with("tpub") {
            let xpub =
                Xpub::from_str(key_str).map_err(|e| malformed(KeyParseError::ExtendedKey(e)))?;
            check_network(expected, xpub.network).map_err(malformed)?;
            if let Some(step) = steps.iter().find(|step| step.is_hardened()) {
                return Err(Error::derivation(token, DerivationError::HardenedAfterPublic(*step)));
            }
            let leaf = xpub
                .derive_pub(secp, &steps)
                .map_err(|e| Error::derivation(token, DerivationError::Bip32(e)))?;
            (PublicKey::new(leaf.public_key), Some(ExtendedKey::Public(xpub)), None)
        } else if key_str.starts_with("xprv") || key_str.starts_with("tprv") {
            let xprv =
                Xpriv::from_str(key_str).map_err(|e| malformed(KeyParseError::ExtendedKey(e)))?;
            check_network(expected, xprv.network).map_err(malformed)?;
            let leaf = xprv
                .derive_priv(secp, &steps)
                .map_err(|e| Error::derivation(token, DerivationError::Bip32(e)))?;
            let pk = PublicKey::new(Xpub::from_priv(secp, &leaf).public_key);
            (pk, Some(ExtendedKey::Private(xprv)), Some(leaf.to_priv()))
        } else {
            let sk = PrivateKey::from_wif(key_str).map_err(|e| malformed(KeyParseError::Wif(e)))?;
            if !steps.is_empty() {
                return Err(malformed(KeyParseError::PathOnSingleKey));
            }
            check_network(expected, sk.network).map_err(malformed)?;
            (sk.public_key(secp), None, Some(sk))
        };

        let expr = KeyExpression {
            token: token.to_owned(),
            public_key,
            origin,
            extended,
            path: DerivationPath::from(steps),
            private_key,
        };
        if ctx.segwit && !expr.public_key.compressed {
            return Err(malformed(KeyParseError::UncompressedInSegwit));
        }
        log::trace!("resolved key `{}` to {}", token, expr.public_key);
        Ok(expr)
    }

    /// The token exactly as written.
    pub fn token(&self) -> &str { &self.token }

    /// The leaf public key.
    pub fn public_key(&self) -> PublicKey { self.public_key }

    /// The `[fingerprint/path]` origin, if given.
    pub fn origin(&self) -> Option<&(Fingerprint, DerivationPath)> { self.origin.as_ref() }

    /// Extended key material, for `xpub`/`xprv` tokens.
    pub fn extended_key(&self) -> Option<&ExtendedKey> { self.extended.as_ref() }

    /// Child derivation path applied to the extended key.
    pub fn derivation_path(&self) -> &DerivationPath { &self.path }

    /// The leaf private key, for WIF and `xprv` tokens.
    pub fn private_key(&self) -> Option<&PrivateKey> { self.private_key.as_ref() }

    /// Whether the token carries private key material.
    pub fn has_private_key(&self) -> bool { self.private_key.is_some() }

    /// Master fingerprint and full path of the leaf key, as recorded in PSBTs.
    ///
    /// An extended key without an origin is taken to be a master key.
    pub fn key_source<C: Signing>(&self, secp: &Secp256k1<C>) -> Option<bip32::KeySource> {
        match (&self.origin, &self.extended) {
            (Some((fingerprint, origin_path)), _) => {
                Some((*fingerprint, origin_path.extend(&self.path)))
            }
            (None, Some(ExtendedKey::Public(xpub))) => Some((xpub.fingerprint(), self.path.clone())),
            (None, Some(ExtendedKey::Private(xprv))) => {
                Some((xprv.fingerprint(secp), self.path.clone()))
            }
            (None, None) => None,
        }
    }
}

impl fmt::Display for KeyExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.token) }
}

fn parse_origin(token: &str) -> Result<(Option<(Fingerprint, DerivationPath)>, &str), KeyParseError> {
    if !token.starts_with('[') {
        return Ok((None, token));
    }
    let close = token.find(']').ok_or(KeyParseError::MalformedOrigin)?;
    let mut parts = token[1..close].split('/');
    let fp_str = parts.next().unwrap_or("");
    if fp_str.len() != 8 {
        return Err(KeyParseError::Fingerprint(fp_str.to_owned()));
    }
    let fp_bytes = <[u8; 4]>::from_hex(fp_str)
        .map_err(|_| KeyParseError::Fingerprint(fp_str.to_owned()))?;
    let path = parts.map(parse_step).collect::<Result<Vec<_>, _>>()?;
    Ok((Some((Fingerprint::from(fp_bytes), DerivationPath::from(path))), &token[close + 1..]))
}

/// Parses one `n`, `n'` or `nh` derivation step.
fn parse_step(step: &str) -> Result<ChildNumber, KeyParseError> {
    let err = || KeyParseError::DerivationStep(step.to_owned());
    let (index, hardened) = match step.strip_suffix('\'').or_else(|| step.strip_suffix('h')) {
        Some(index) => (index, true),
        None => (step, false),
    };
    let index = parse_num(index).map_err(|_| err())?;
    if hardened {
        ChildNumber::from_hardened_idx(index).map_err(|_| err())
    } else {
        ChildNumber::from_normal_idx(index).map_err(|_| err())
    }
}

fn is_hex_pubkey(s: &str) -> bool {
    (s.len() == 66 || s.len() == 130) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn check_network(expected: NetworkKind, found: NetworkKind) -> Result<(), KeyParseError> {
    if expected == found {
        Ok(())
    } else {
        Err(KeyParseError::NetworkMismatch { expected, found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-32 test vector 1
    const XPUB: &str = "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8";
    const XPRV: &str = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";

    fn parse(token: &str) -> Result<KeyExpression, Error> {
        KeyExpression::parse(token, &KeyContext::segwit(Network::Bitcoin), &Secp256k1::new())
    }

    fn reason(err: Error) -> ParseError {
        match err {
            Error::MalformedInput { reason, .. } => reason,
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn hex_and_wif() {
        let key =
            parse("031b84c5567b126440995d3ed5aaba0565d71e1834604819ff9c17f5e9d5dd078f").unwrap();
        assert!(key.origin().is_none());
        assert!(!key.has_private_key());

        let wif = parse("KwFfNUhSDaASSAwtG7ssQM1uVX8RgX5GHWnnLfhfiQDigjioWXHH").unwrap();
        assert_eq!(wif.public_key(), key.public_key());
        assert!(wif.has_private_key());
        assert_eq!(wif.token(), "KwFfNUhSDaASSAwtG7ssQM1uVX8RgX5GHWnnLfhfiQDigjioWXHH");
    }

    #[test]
    fn extended_keys() {
        let key = parse(&format!("{}/1/2", XPUB)).unwrap();
        assert_eq!(
            key.public_key().to_string(),
            "03d18a97975c5f2e11dfa22dd686315f27b35c2db5d32cd7d0c11aea146fdd17c2"
        );
        assert_eq!(key.extended_key().unwrap().depth(), 0);
        let (fingerprint, path) = key.key_source(&Secp256k1::new()).unwrap();
        assert_eq!(fingerprint.to_string(), "3442193e");
        assert_eq!(path, DerivationPath::from_str("m/1/2").unwrap());

        let key = parse(&format!("{}/0'/1", XPRV)).unwrap();
        assert_eq!(
            key.public_key().to_string(),
            "03501e454bf00751f24b1b489aa925215d66af2234e3891c3b21a52bedb3cd711c"
        );
        assert!(key.private_key().is_some());
        assert_eq!(parse(&format!("{}/0h/1", XPRV)).unwrap().public_key(), key.public_key());
    }

    #[test]
    fn origins() {
        let key = parse(&format!("[d34db33f/44'/0'/0']{}/1/2", XPUB)).unwrap();
        let (fingerprint, path) = key.origin().unwrap();
        assert_eq!(fingerprint.to_string(), "d34db33f");
        assert_eq!(*path, DerivationPath::from_str("m/44'/0'/0'").unwrap());
        let (_, full) = key.key_source(&Secp256k1::new()).unwrap();
        assert_eq!(full, DerivationPath::from_str("m/44'/0'/0'/1/2").unwrap());

        assert_eq!(
            reason(parse(&format!("[d34db3/0]{}", XPUB)).unwrap_err()),
            ParseError::Key(KeyParseError::Fingerprint("d34db3".to_owned()))
        );
        assert_eq!(
            reason(parse(&format!("[d34db33f{}", XPUB)).unwrap_err()),
            ParseError::Key(KeyParseError::MalformedOrigin)
        );
    }

    #[test]
    fn rejects() {
        assert_eq!(
            reason(parse(&format!("{}/1/*", XPUB)).unwrap_err()),
            ParseError::Key(KeyParseError::UnresolvedWildcard)
        );
        assert_eq!(
            reason(parse(&format!("{}/1/x", XPUB)).unwrap_err()),
            ParseError::Key(KeyParseError::DerivationStep("x".to_owned()))
        );
        assert!(matches!(
            parse(&format!("{}/1'", XPUB)).unwrap_err(),
            Error::KeyDerivation { reason: DerivationError::HardenedAfterPublic(..), .. }
        ));
        assert!(matches!(
            reason(
                KeyExpression::parse(
                    XPUB,
                    &KeyContext::segwit(Network::Testnet),
                    &Secp256k1::new()
                )
                .unwrap_err()
            ),
            ParseError::Key(KeyParseError::NetworkMismatch { .. })
        ));

        let uncompressed = "04a34b99f22c790c4e36b2b3c2c35a36db06226e41c692fc82b8b56ac1c540c5bd\
                            5b8dec5235a0fa8722476c7709c02559e3aa73aa03918ba2d492eea75abea235";
        assert_eq!(
            reason(parse(uncompressed).unwrap_err()),
            ParseError::Key(KeyParseError::UncompressedInSegwit)
        );
        let legacy = KeyContext::legacy(Network::Bitcoin);
        assert!(KeyExpression::parse(uncompressed, &legacy, &Secp256k1::new()).is_ok());
    }
}
