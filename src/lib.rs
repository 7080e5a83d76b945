// SPDX-License-Identifier: CC0-1.0

//! Output Descriptors and Miniscript
//!
//! # Introduction
//! ## Output Descriptors
//!
//! Spending policies in Bitcoin are defined by Script, but there are several
//! ways of embedding a Script in a transaction output: bare, P2SH or Segwit
//! v0, and combinations of these. *Output Descriptors*
//! ([described here](https://github.com/bitcoin/bitcoin/blob/master/doc/descriptors.md))
//! are a compact text language naming both the embedding and the keys or
//! script inside it, e.g. `wpkh(xpub.../0/*)` or `sh(wsh(multi(2,A,B)))`.
//!
//! ## Miniscript
//!
//! Miniscript is a subset of Bitcoin Script which can be efficiently analyzed
//! and from which it is easy to extract the data needed to construct
//! witnesses. Essentially, a Miniscript is a monotone function (tree of ANDs,
//! ORs and thresholds) of signature requirements, hash preimage requirements
//! and timelocks. A [full description of Miniscript is available
//! here](https://bitcoin.sipa.be/miniscript/).
//!
//! In this crate a miniscript is processed in stages: keys are first
//! *expanded* into `@i` placeholders, the expanded text is typechecked,
//! compiled to Script, and finally satisfied from signatures and preimages
//! into a witness.
//!
//! # Examples
//!
//! ## Deriving an address from a descriptor
//!
//! ```rust
//! use script_descriptors::{bitcoin, Descriptor};
//!
//! let desc = Descriptor::parse(
//!     "sh(wsh(or_d(\
//!         pk(020e0338c96a8870479f2396c373cc7696ba124e8635d41b0ea581112b67817261),\
//!         pk(0250863ad64a87ae8a2fe83c1af1a8403cb53f53e486d8511dad8a04887e5b2352)\
//!     )))",
//!     bitcoin::Network::Bitcoin,
//! )
//! .unwrap();
//!
//! // Derive the P2SH address
//! assert_eq!(desc.address().unwrap().to_string(), "3CJxbQBfWAe1ZkKiGQNEYrioV73ZwvBWns");
//!
//! // Keys are replaced by placeholders in the expanded form
//! assert_eq!(desc.expanded_expression(), "sh(wsh(or_d(pk(@0),pk(@1))))");
//!
//! // Displaying a descriptor appends its checksum
//! assert!(desc.to_string().ends_with("#wcf2hv56"));
//! ```
//!
//! ## Ranged descriptors
//!
//! ```rust
//! use script_descriptors::{bitcoin, Descriptor, DescriptorOptions};
//!
//! let text = "wpkh([d34db33f/84'/0'/0']xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8/0/*)";
//! let secp = bitcoin::secp256k1::Secp256k1::new();
//! for index in 0..3 {
//!     let options = DescriptorOptions::new(bitcoin::Network::Bitcoin).with_index(index);
//!     let desc = Descriptor::new(text, &options, &secp).unwrap();
//!     assert!(desc.is_ranged());
//!     assert!(desc.script_pubkey().is_p2wpkh());
//! }
//! ```
//!
// Coding conventions
#![deny(unsafe_code)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(missing_docs)]

pub extern crate bitcoin;

pub mod descriptor;
pub mod error;
pub mod expression;
pub mod miniscript;
pub mod primitives;
pub mod psbt;

mod util;

pub use crate::descriptor::checksum::{desc_checksum, validate};
pub use crate::descriptor::key::{KeyContext, KeyExpression};
pub use crate::descriptor::{Descriptor, DescriptorKind, DescriptorOptions, Payment};
pub use crate::error::{Error, ParseError};
pub use crate::expression::{ParseNumError, ParseTreeError};
pub use crate::miniscript::{
    compile, expand, Assets, ExpansionMap, HashKind, KeyRef, Miniscript, PartialSig, Plan,
    Preimage, Satisfied, Terminal, TimeConstraints,
};
pub use crate::primitives::absolute_locktime::{AbsLockTime, AbsLockTimeError};
pub use crate::primitives::relative_locktime::{RelLockTime, RelLockTimeError};
pub use crate::primitives::threshold::{Threshold, ThresholdError};
pub use crate::psbt::PsbtError;
