// SPDX-License-Identifier: CC0-1.0

//! # Bare Output Descriptors
//!
//! `pk()` and `pkh()`, whose script is placed directly in the scriptPubKey
//! and satisfied from the scriptSig.

use bitcoin::{Address, Network, PublicKey};

use super::Payment;
use crate::miniscript::Miniscript;

/// `pk(KEY)`: `<KEY> OP_CHECKSIG`. There is no address for this form.
pub(super) fn pk(ms: &Miniscript) -> Payment {
    Payment {
        script_pubkey: ms.encode(),
        address: None,
        redeem_script: None,
        witness_script: None,
    }
}

/// `pkh(KEY)`
pub(super) fn pkh(pk: &PublicKey, network: Network) -> Payment {
    let address = Address::p2pkh(pk.pubkey_hash(), network);
    Payment {
        script_pubkey: address.script_pubkey(),
        address: Some(address),
        redeem_script: None,
        witness_script: None,
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;
    use crate::descriptor::key::{KeyContext, KeyExpression};
    use crate::miniscript::ExpansionMap;

    const KEY: &str = "03a34b99f22c790c4e36b2b3c2c35a36db06226e41c692fc82b8b56ac1c540c5bd";

    #[test]
    fn pk_has_no_address() {
        let secp = bitcoin::secp256k1::Secp256k1::new();
        let key = KeyExpression::parse(KEY, &KeyContext::legacy(Network::Bitcoin), &secp).unwrap();
        let ms = Miniscript::parse("pk(@0)", &ExpansionMap::single(key)).unwrap();
        let payment = pk(&ms);
        assert_eq!(payment.script_pubkey.len(), 35);
        assert!(payment.address.is_none());
    }

    #[test]
    fn pkh_matches_template() {
        let pk = PublicKey::from_str(KEY).unwrap();
        let payment = pkh(&pk, Network::Bitcoin);
        assert!(payment.script_pubkey.is_p2pkh());
        assert_eq!(payment.address.unwrap().script_pubkey(), payment.script_pubkey);
    }
}
