// SPDX-License-Identifier: CC0-1.0

//! Descriptor construction options

use bitcoin::{Network, PublicKey};

use crate::miniscript::Preimage;

/// Settings applied while constructing a [`super::Descriptor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorOptions {
    /// Network addresses and extended keys must belong to.
    pub network: Network,
    /// Value substituted for `*` in ranged descriptors.
    pub index: Option<u32>,
    /// Reject descriptors without a `#checksum` suffix.
    pub checksum_required: bool,
    /// Accept arbitrary miniscript directly under `sh()`.
    pub allow_miniscript_in_p2sh: bool,
    /// Keys that will sign. `None` means every key of the descriptor.
    pub signers: Option<Vec<PublicKey>>,
    /// Preimages that will be revealed.
    pub preimages: Vec<Preimage>,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        DescriptorOptions {
            network: Network::Bitcoin,
            index: None,
            checksum_required: false,
            allow_miniscript_in_p2sh: false,
            signers: None,
            preimages: vec![],
        }
    }
}

impl DescriptorOptions {
    /// Default options for `network`.
    pub fn new(network: Network) -> Self { DescriptorOptions { network, ..Default::default() } }

    /// Sets the network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Sets the value substituted for wildcards.
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Requires a `#checksum` suffix.
    pub fn with_checksum_required(mut self, required: bool) -> Self {
        self.checksum_required = required;
        self
    }

    /// Accepts arbitrary miniscript under `sh()`.
    pub fn with_miniscript_in_p2sh(mut self, allow: bool) -> Self {
        self.allow_miniscript_in_p2sh = allow;
        self
    }

    /// Restricts the signing keys.
    pub fn with_signers(mut self, signers: Vec<PublicKey>) -> Self {
        self.signers = Some(signers);
        self
    }

    /// Sets the preimages that will be revealed.
    pub fn with_preimages(mut self, preimages: Vec<Preimage>) -> Self {
        self.preimages = preimages;
        self
    }
}
