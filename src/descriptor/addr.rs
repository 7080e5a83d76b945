// SPDX-License-Identifier: CC0-1.0

//! # Address Descriptors
//!
//! `addr(ADDRESS)` wraps an already encoded address. It has no keys and
//! cannot be satisfied.

use core::str::FromStr;

use bitcoin::{Address, AddressType, Network};

use super::Payment;
use crate::{Error, ParseError};

/// Address types an `addr()` descriptor may decode to.
const TEMPLATES: [AddressType; 5] = [
    AddressType::P2pkh,
    AddressType::P2sh,
    AddressType::P2wpkh,
    AddressType::P2wsh,
    AddressType::P2tr,
];

/// Decodes `text` for `network`, returning the payment and whether the
/// address is segwit.
pub(super) fn addr(text: &str, network: Network) -> Result<(Payment, bool), Error> {
    let address = Address::from_str(text)
        .and_then(|address| address.require_network(network))
        .map_err(|e| Error::malformed(text, e))?;

    let address_type = address.address_type();
    let template = TEMPLATES
        .iter()
        .rev()
        .find(|template| Some(**template) == address_type)
        .ok_or_else(|| Error::malformed(text, ParseError::UnsupportedAddress))?;
    log::debug!("address `{}` matched the {} template", text, template);

    let segwit =
        matches!(template, AddressType::P2wpkh | AddressType::P2wsh | AddressType::P2tr);
    let payment = Payment {
        script_pubkey: address.script_pubkey(),
        address: Some(address),
        redeem_script: None,
        witness_script: None,
    };
    Ok((payment, segwit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates() {
        let (p, segwit) = addr("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", Network::Bitcoin).unwrap();
        assert!(p.script_pubkey.is_p2pkh());
        assert!(!segwit);

        let (p, segwit) =
            addr("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq", Network::Bitcoin).unwrap();
        assert!(p.script_pubkey.is_p2wpkh());
        assert!(segwit);
    }

    #[test]
    fn wrong_network() {
        let err = addr("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", Network::Testnet).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { reason: ParseError::Address(..), .. }));
        assert!(addr("not an address", Network::Bitcoin).is_err());
    }
}
