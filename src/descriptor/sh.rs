// SPDX-License-Identifier: CC0-1.0

//! # P2SH Descriptors
//!
//! Implementation of p2sh descriptors: `sh(wpkh())`, `sh(wsh())` and
//! `sh()` directly over a miniscript. The redeem script is pushed as the
//! last scriptSig element.

use core::convert::TryFrom;

use bitcoin::key::UncompressedPublicKeyError;
use bitcoin::{Address, CompressedPublicKey, Network, PublicKey, ScriptBuf};

use super::Payment;
use crate::expression::Tree;
use crate::miniscript::limits::{LimitError, MAX_SCRIPT_ELEMENT_SIZE};

/// Fragments relayed by standard nodes when used directly under `sh()`.
const STANDARD_FRAGMENTS: [&str; 8] =
    ["pk", "pkh", "wpkh", "combo", "multi", "sortedmulti", "multi_a", "sortedmulti_a"];

/// `sh(wpkh(KEY))`
pub(super) fn sh_wpkh(
    pk: &PublicKey,
    network: Network,
) -> Result<Payment, UncompressedPublicKeyError> {
    let pk = CompressedPublicKey::try_from(*pk)?;
    let address = Address::p2shwpkh(&pk, network);
    Ok(Payment {
        script_pubkey: address.script_pubkey(),
        address: Some(address),
        redeem_script: Some(ScriptBuf::new_p2wpkh(&pk.wpubkey_hash())),
        witness_script: None,
    })
}

/// `sh(wsh(SCRIPT))`: the redeem script is the P2WSH program of the
/// witness script.
pub(super) fn sh_wsh(witness_script: ScriptBuf, network: Network) -> Payment {
    let address = Address::p2shwsh(&witness_script, network);
    let redeem_script = Address::p2wsh(&witness_script, network).script_pubkey();
    Payment {
        script_pubkey: address.script_pubkey(),
        address: Some(address),
        redeem_script: Some(redeem_script),
        witness_script: Some(witness_script),
    }
}

/// `sh(SCRIPT)`
pub(super) fn sh(redeem_script: ScriptBuf, network: Network) -> Result<Payment, LimitError> {
    let address = Address::p2sh(&redeem_script, network).map_err(|_| LimitError::ScriptSize {
        size: redeem_script.len(),
        max: MAX_SCRIPT_ELEMENT_SIZE,
    })?;
    Ok(Payment {
        script_pubkey: address.script_pubkey(),
        address: Some(address),
        redeem_script: Some(redeem_script),
        witness_script: None,
    })
}

/// Rejects a top-level fragment under `sh()` that standard nodes would not
/// relay.
pub(super) fn check_standard(inner: &Tree) -> Result<(), LimitError> {
    if STANDARD_FRAGMENTS.contains(&inner.name) {
        Ok(())
    } else {
        Err(LimitError::NonStandardP2sh(inner.name.to_owned()))
    }
}
