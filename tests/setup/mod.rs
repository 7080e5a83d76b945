// SPDX-License-Identifier: CC0-1.0

//! Shared fixtures for the integration tests.
//!
//! Descriptors in the tests are written with `K<i>` standing for the i-th
//! test key and `<hash>(H)` standing for the digest of the test preimage
//! of that hash function, e.g. `wsh(and_v(v:pk(K1),sha256(H)))`.
//!
//! Spends are checked by libbitcoinconsensus, against a real transaction
//! whose signatures commit to its sighash.

#![allow(dead_code)]
// https://github.com/rust-lang/rust/issues/46379. Every test file compiles its own copy of this module.

use bitcoin::consensus::encode::serialize;
use bitcoin::hashes::Hash;
use bitcoin::hex::DisplayHex;
use bitcoin::secp256k1::{Message, Secp256k1, SecretKey};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{
    absolute, ecdsa, Amount, OutPoint, PublicKey, ScriptBuf, Transaction, TxIn, TxOut, Txid,
    Witness,
};
use script_descriptors::{Descriptor, HashKind, PartialSig, Preimage, TimeConstraints};

/// Value of every output the tests spend.
pub const AMOUNT: Amount = Amount::from_sat(100_000);

/// Script verification flags of every consensus rule up to segwit v0.
pub const VERIFY_FLAGS: u32 = bitcoinconsensus::VERIFY_ALL;

/// Keys and preimages known to the tests.
#[derive(Debug, Clone)]
pub struct TestData {
    pub sks: Vec<SecretKey>,
    pub pks: Vec<PublicKey>,
    pub preimages: Vec<Preimage>,
}

impl TestData {
    /// `n` keys with secrets `[1; 32]`, `[2; 32]`, ... and one preimage
    /// per hash function.
    pub fn new(n: usize) -> Self {
        let secp = Secp256k1::signing_only();
        let sks = (1..=n)
            .map(|i| SecretKey::from_slice(&[i as u8; 32]).unwrap())
            .collect::<Vec<_>>();
        let pks = sks.iter().map(|sk| PublicKey::new(sk.public_key(&secp))).collect();
        let preimages = HASH_KINDS.iter().map(|kind| Preimage::new(*kind, [0x11; 32])).collect();
        TestData { sks, pks, preimages }
    }

    /// The `i`-th key, counting from 1 like the `K<i>` tokens.
    pub fn pk(&self, i: usize) -> PublicKey { self.pks[i - 1] }

    /// Replaces the `K<i>` and `<hash>(H)` tokens of `text`.
    pub fn subs(&self, text: &str) -> String {
        let mut ret = text.to_owned();
        // highest index first so that K1 does not eat the prefix of K12
        for i in (1..=self.pks.len()).rev() {
            ret = ret.replace(&format!("K{}", i), &self.pk(i).to_string());
        }
        for preimage in &self.preimages {
            let name = preimage.kind().name();
            ret = ret.replace(
                &format!("{}(H)", name),
                &format!("{}({})", name, preimage.digest().to_lower_hex_string()),
            );
        }
        ret
    }

    /// SIGHASH_ALL signatures over `msg` by the keys `K<i>` for each `i` given.
    pub fn sign(&self, msg: &Message, keys: &[usize]) -> Vec<PartialSig> {
        let secp = Secp256k1::signing_only();
        keys.iter()
            .map(|i| {
                let signature = secp.sign_ecdsa(msg, &self.sks[*i - 1]);
                PartialSig::new(self.pk(*i), ecdsa::Signature::sighash_all(signature))
            })
            .collect()
    }

    /// Signatures for input `index` of `tx`, which spends an output of `desc`.
    pub fn sign_input(
        &self,
        tx: &Transaction,
        index: usize,
        desc: &Descriptor,
        keys: &[usize],
    ) -> Vec<PartialSig> {
        self.sign(&sighash(tx, index, desc), keys)
    }
}

/// The hash functions a miniscript can lock with.
pub const HASH_KINDS: [HashKind; 4] =
    [HashKind::Sha256, HashKind::Hash256, HashKind::Ripemd160, HashKind::Hash160];

/// A transaction spending one output worth [`AMOUNT`], with the locktime
/// and sequence of `constraints`.
pub fn spending_tx(constraints: &TimeConstraints) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: constraints.lock_time().unwrap_or(absolute::LockTime::ZERO),
        input: vec![TxIn {
            previous_output: OutPoint::new(Txid::from_byte_array([0x11; 32]), 0),
            script_sig: ScriptBuf::new(),
            sequence: constraints.input_sequence(),
            witness: Witness::new(),
        }],
        output: vec![TxOut { value: Amount::from_sat(90_000), script_pubkey: ScriptBuf::new() }],
    }
}

/// The SIGHASH_ALL digest input `index` of `tx` signs when it spends an
/// output of `desc` worth [`AMOUNT`].
pub fn sighash(tx: &Transaction, index: usize, desc: &Descriptor) -> Message {
    let mut cache = SighashCache::new(tx);
    let digest = if let Some(witness_script) = desc.witness_script() {
        cache
            .p2wsh_signature_hash(index, witness_script, AMOUNT, EcdsaSighashType::All)
            .unwrap()
            .to_byte_array()
    } else if desc.is_segwit() {
        // the inner v0 program of sh(wpkh()) is its redeem script
        let script_pubkey = desc.redeem_script().unwrap_or_else(|| desc.script_pubkey());
        cache
            .p2wpkh_signature_hash(index, script_pubkey, AMOUNT, EcdsaSighashType::All)
            .unwrap()
            .to_byte_array()
    } else {
        let script_code = desc.redeem_script().unwrap_or_else(|| desc.script_pubkey());
        cache
            .legacy_signature_hash(index, script_code, EcdsaSighashType::All.to_u32())
            .unwrap()
            .to_byte_array()
    };
    Message::from_digest(digest)
}

/// Runs input `index` of `tx` against the output script of `desc` in the
/// consensus script interpreter.
pub fn verify_input(tx: &Transaction, index: usize, desc: &Descriptor) -> Result<(), String> {
    desc.script_pubkey()
        .verify_with_flags(index, AMOUNT, &serialize(tx), VERIFY_FLAGS)
        .map_err(|e| format!("{:?}", e))
}

/// Places `script_sig` and `witness` in input `index` of `tx` and verifies it.
pub fn verify_spend(
    mut tx: Transaction,
    index: usize,
    desc: &Descriptor,
    script_sig: ScriptBuf,
    witness: Witness,
) -> Result<(), String> {
    tx.input[index].script_sig = script_sig;
    tx.input[index].witness = witness;
    verify_input(&tx, index, desc)
}
