// SPDX-License-Identifier: CC0-1.0

//! # Partially-Signed Bitcoin Transactions
//!
//! This module implements the Updater and Finalizer roles defined in
//! BIP 174, PSBT, described at
//! `https://github.com/bitcoin/bips/blob/master/bip-0174.mediawiki`,
//! for inputs spending outputs of a [`Descriptor`].
//!

use core::fmt;
use std::error;

use bitcoin::psbt::{self, Psbt};
use bitcoin::sighash::EcdsaSighashType;
use bitcoin::{absolute, OutPoint, PublicKey, ScriptBuf, Transaction, TxIn};

use crate::descriptor::Descriptor;
use crate::miniscript::TimeConstraints;
use crate::Error;

mod finalizer;

pub use self::finalizer::finalize;

/// The PSBT does not have the shape an operation expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PsbtError {
    /// The unsigned transaction and the input map disagree on the number
    /// of inputs.
    WrongInputCount {
        /// Input count in tx
        in_tx: usize,
        /// Input count in psbt
        in_map: usize,
    },
    /// A descriptor is needed for every input.
    DescriptorCount {
        /// Number of descriptors given.
        descriptors: usize,
        /// Number of inputs.
        inputs: usize,
    },
    /// Input index out of range.
    InputIndex {
        /// The requested index.
        index: usize,
        /// Number of inputs.
        inputs: usize,
    },
    /// The previous transaction has no output at `vout`.
    OutputIndex {
        /// The requested output.
        vout: u32,
        /// Number of outputs of the previous transaction.
        outputs: usize,
    },
    /// The previous output does not pay to the descriptor.
    ScriptMismatch {
        /// The descriptor's scriptPubKey.
        expected: ScriptBuf,
        /// The previous output's scriptPubKey.
        found: ScriptBuf,
    },
    /// The transaction already carries a locktime the spending path cannot
    /// use.
    LockTimeConflict {
        /// nLockTime of the transaction.
        current: absolute::LockTime,
        /// nLockTime needed by the spending path.
        required: absolute::LockTime,
    },
    /// The input asks for a sighash type that is not valid for ECDSA.
    NonStandardSighashType(u32),
    /// Sighash did not match
    WrongSighashType {
        /// required sighash type
        required: EcdsaSighashType,
        /// the sighash type we got
        got: EcdsaSighashType,
        /// the corresponding publickey
        pubkey: PublicKey,
    },
}

impl fmt::Display for PsbtError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PsbtError::WrongInputCount { in_tx, in_map } => write!(
                f,
                "PSBT had {} inputs in transaction but {} inputs in map",
                in_tx, in_map
            ),
            PsbtError::DescriptorCount { descriptors, inputs } => {
                write!(f, "{} descriptors given for {} inputs", descriptors, inputs)
            }
            PsbtError::InputIndex { index, inputs } => {
                write!(f, "input {} out of range, PSBT has {} inputs", index, inputs)
            }
            PsbtError::OutputIndex { vout, outputs } => {
                write!(f, "output {} out of range, transaction has {} outputs", vout, outputs)
            }
            PsbtError::ScriptMismatch { ref expected, ref found } => write!(
                f,
                "previous output pays to {} rather than the descriptor's {}",
                found, expected
            ),
            PsbtError::LockTimeConflict { current, required } => {
                write!(f, "transaction locktime {} conflicts with required {}", current, required)
            }
            PsbtError::NonStandardSighashType(ty) => {
                write!(f, "non-standard sighash type {:#x}", ty)
            }
            PsbtError::WrongSighashType { required, got, pubkey } => write!(
                f,
                "signature with key {} had sighash type {} rather than required {}",
                pubkey, got, required
            ),
        }
    }
}

impl error::Error for PsbtError {}

fn sanity_check(psbt: &Psbt) -> Result<(), PsbtError> {
    if psbt.unsigned_tx.input.len() != psbt.inputs.len() {
        return Err(PsbtError::WrongInputCount {
            in_tx: psbt.unsigned_tx.input.len(),
            in_map: psbt.inputs.len(),
        });
    }
    Ok(())
}

impl Descriptor {
    /// Appends an input spending output `vout` of `prev_tx` and fills in
    /// everything a signer needs: the previous output, redeem and witness
    /// scripts and key origins. The input's nSequence and the transaction's
    /// nLockTime are set for the planned spending path.
    ///
    /// Returns the index of the new input.
    pub fn update_psbt_input(
        &self,
        psbt: &mut Psbt,
        prev_tx: &Transaction,
        vout: u32,
    ) -> Result<usize, Error> {
        sanity_check(psbt)?;
        let prev_out = prev_tx
            .output
            .get(vout as usize)
            .ok_or(PsbtError::OutputIndex { vout, outputs: prev_tx.output.len() })?;
        if prev_out.script_pubkey.as_script() != self.script_pubkey() {
            return Err(PsbtError::ScriptMismatch {
                expected: self.script_pubkey().to_owned(),
                found: prev_out.script_pubkey.clone(),
            }
            .into());
        }

        // addr() has no plan and spends without timelocks
        let constraints = match self.miniscript() {
            Some(_) => self.time_constraints()?,
            None => TimeConstraints::default(),
        };
        if let Some(after) = self.plan().ok().and_then(|plan| plan.absolute_timelock) {
            let current = psbt.unsigned_tx.lock_time;
            if current == absolute::LockTime::ZERO {
                psbt.unsigned_tx.lock_time = after.into();
            } else if !after.is_satisfied_by(current) {
                return Err(
                    PsbtError::LockTimeConflict { current, required: after.into() }.into()
                );
            }
        }

        psbt.unsigned_tx.input.push(TxIn {
            previous_output: OutPoint::new(prev_tx.compute_txid(), vout),
            sequence: constraints.input_sequence(),
            ..Default::default()
        });

        let mut input = psbt::Input {
            non_witness_utxo: Some(prev_tx.clone()),
            redeem_script: self.redeem_script().map(ToOwned::to_owned),
            witness_script: self.witness_script().map(ToOwned::to_owned),
            bip32_derivation: self.key_sources().clone(),
            ..Default::default()
        };
        if self.is_segwit() {
            input.witness_utxo = Some(prev_out.clone());
        }
        psbt.inputs.push(input);

        let index = psbt.inputs.len() - 1;
        log::debug!(
            "added input {} spending {}:{} with sequence {}",
            index,
            prev_tx.compute_txid(),
            vout,
            constraints.input_sequence().to_consensus_u32()
        );
        Ok(index)
    }
}
