// SPDX-License-Identifier: CC0-1.0

//! # Segwit Output Descriptors
//!
//! `wpkh()` and `wsh()`, spent from the witness with an empty scriptSig.

use core::convert::TryFrom;

use bitcoin::key::UncompressedPublicKeyError;
use bitcoin::{Address, CompressedPublicKey, Network, PublicKey, ScriptBuf};

use super::Payment;

/// `wpkh(KEY)`
pub(super) fn wpkh(pk: &PublicKey, network: Network) -> Result<Payment, UncompressedPublicKeyError> {
    let pk = CompressedPublicKey::try_from(*pk)?;
    let address = Address::p2wpkh(&pk, network);
    Ok(Payment {
        script_pubkey: address.script_pubkey(),
        address: Some(address),
        redeem_script: None,
        witness_script: None,
    })
}

/// `wsh(SCRIPT)`, where the compiled miniscript becomes the witness script.
pub(super) fn wsh(witness_script: ScriptBuf, network: Network) -> Payment {
    let address = Address::p2wsh(&witness_script, network);
    Payment {
        script_pubkey: address.script_pubkey(),
        address: Some(address),
        redeem_script: None,
        witness_script: Some(witness_script),
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn wpkh_rejects_uncompressed() {
        let pk = PublicKey::from_str(
            "04a34b99f22c790c4e36b2b3c2c35a36db06226e41c692fc82b8b56ac1c540c5bd\
             5b8dec5235a0fa8722476c7709c02559e3aa73aa03918ba2d492eea75abea235",
        )
        .unwrap();
        assert!(wpkh(&pk, Network::Bitcoin).is_err());
    }

    #[test]
    fn wsh_keeps_witness_script() {
        let script = ScriptBuf::from(vec![0x51]);
        let payment = wsh(script.clone(), Network::Testnet);
        assert!(payment.script_pubkey.is_p2wsh());
        assert_eq!(payment.witness_script, Some(script));
        assert!(payment.address.unwrap().to_string().starts_with("tb1q"));
    }
}
