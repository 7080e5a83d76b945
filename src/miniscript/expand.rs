// SPDX-License-Identifier: CC0-1.0

//! Key expansion
//!
//! Replaces every key token of a miniscript by a placeholder `@i`, so that
//! the rest of the pipeline works on short, uniform names while the parsed
//! keys live in an [`ExpansionMap`].

use core::fmt;

use bitcoin::secp256k1::{Secp256k1, Signing, Verification};
use bitcoin::PublicKey;

use crate::descriptor::key::{KeyContext, KeyExpression};
use crate::expression::Tree;
use crate::Error;

/// Placeholder to key mapping produced by [`expand`].
///
/// Placeholders are numbered in order of first occurrence; a token that
/// appears verbatim more than once shares a single placeholder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionMap {
    keys: Vec<KeyExpression>,
}

impl ExpansionMap {
    /// Creates an empty map.
    pub fn new() -> Self { ExpansionMap { keys: vec![] } }

    /// Number of placeholders.
    pub fn len(&self) -> usize { self.keys.len() }

    /// Whether the map has no placeholders.
    pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    /// The key behind placeholder `@index`.
    pub fn get(&self, index: usize) -> Option<&KeyExpression> { self.keys.get(index) }

    /// The name of placeholder number `index`.
    pub fn placeholder(index: usize) -> String { format!("@{}", index) }

    /// Iterates over `(placeholder index, key)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &KeyExpression)> {
        self.keys.iter().enumerate()
    }

    /// The leaf public keys, in placeholder order.
    pub fn public_keys(&self) -> Vec<PublicKey> {
        self.keys.iter().map(KeyExpression::public_key).collect()
    }

    /// The first placeholder whose key is `pk`.
    pub fn index_of(&self, pk: &PublicKey) -> Option<usize> {
        self.keys.iter().position(|key| key.public_key() == *pk)
    }

    /// Parses `token` unless it was seen before, and returns its placeholder index.
    pub(crate) fn insert<C: Signing + Verification>(
        &mut self,
        token: &str,
        ctx: &KeyContext,
        secp: &Secp256k1<C>,
    ) -> Result<usize, Error> {
        if let Some(index) = self.keys.iter().position(|key| key.token() == token) {
            return Ok(index);
        }
        self.keys.push(KeyExpression::parse(token, ctx, secp)?);
        Ok(self.keys.len() - 1)
    }

    /// Wraps a single already-parsed key, as used by `pk()`, `pkh()` and
    /// `wpkh()` descriptors.
    pub(crate) fn single(key: KeyExpression) -> Self { ExpansionMap { keys: vec![key] } }
}

impl fmt::Display for ExpansionMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, key) in self.iter() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "@{}={}", i, key)?;
        }
        Ok(())
    }
}

/// Positions of key arguments by fragment name: `Some(n)` means arguments
/// `n..` are keys.
fn key_args(fragment: &str) -> Option<usize> {
    match fragment {
        "pk" | "pkh" | "pk_k" | "pk_h" => Some(0),
        "multi" | "sortedmulti" | "multi_a" | "sortedmulti_a" => Some(1),
        _ => None,
    }
}

/// Replaces the key tokens of a miniscript by placeholders.
///
/// Returns the expanded text together with the map from placeholders to
/// parsed keys.
pub fn expand<C: Signing + Verification>(
    text: &str,
    ctx: &KeyContext,
    secp: &Secp256k1<C>,
) -> Result<(String, ExpansionMap), Error> {
    let tree = Tree::from_str(text).map_err(|e| Error::malformed(text, e))?;
    let mut map = ExpansionMap::new();
    let mut out = String::with_capacity(text.len());
    expand_tree(&tree, ctx, secp, &mut map, &mut out)?;
    Ok((out, map))
}

/// Writes the expansion of `tree` to `out`, collecting keys into `map`.
fn expand_tree<C: Signing + Verification>(
    tree: &Tree,
    ctx: &KeyContext,
    secp: &Secp256k1<C>,
    map: &mut ExpansionMap,
    out: &mut String,
) -> Result<(), Error> {
    out.push_str(tree.name);
    if tree.args.is_empty() {
        return Ok(());
    }
    let first_key = key_args(tree.wrappers().1).unwrap_or(usize::MAX);
    out.push('(');
    for (i, arg) in tree.args.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if i >= first_key && arg.is_terminal() {
            let index = map.insert(arg.name, ctx, secp)?;
            out.push_str(&ExpansionMap::placeholder(index));
        } else {
            expand_tree(arg, ctx, secp, map, out)?;
        }
    }
    out.push(')');
    Ok(())
}
