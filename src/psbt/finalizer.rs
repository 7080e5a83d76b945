// SPDX-License-Identifier: CC0-1.0

//! # Partially-Signed Bitcoin Transactions Finalizer
//!
//! Turns the partial signatures collected in a PSBT input into its final
//! scriptSig and witness, using the locktime and sequence the transaction
//! actually carries.

use bitcoin::psbt::{self, Psbt};
use bitcoin::sighash::EcdsaSighashType;
use bitcoin::{absolute, Sequence};

use super::{sanity_check, PsbtError};
use crate::descriptor::Descriptor;
use crate::miniscript::satisfy::SatisfyError;
use crate::miniscript::{PartialSig, TimeConstraints};
use crate::Error;

/// The timelocks an input commits to. nLockTime only counts when the
/// input's sequence enables it.
fn committed_constraints(
    lock_time: absolute::LockTime,
    sequence: Sequence,
) -> Result<TimeConstraints, SatisfyError> {
    let lock_time = if sequence.enables_absolute_lock_time() && lock_time != absolute::LockTime::ZERO
    {
        Some(lock_time)
    } else {
        None
    };
    TimeConstraints::new(lock_time, Some(sequence))
}

/// Checks that every partial signature uses the input's sighash type,
/// `SIGHASH_ALL` when none is given.
fn check_sighash_types(input: &psbt::Input) -> Result<(), PsbtError> {
    let required = match input.sighash_type {
        Some(ty) => ty
            .ecdsa_hash_ty()
            .map_err(|_| PsbtError::NonStandardSighashType(ty.to_u32()))?,
        None => EcdsaSighashType::All,
    };
    for (pubkey, sig) in &input.partial_sigs {
        if sig.sighash_type != required {
            return Err(PsbtError::WrongSighashType {
                required,
                got: sig.sighash_type,
                pubkey: *pubkey,
            });
        }
    }
    Ok(())
}

impl Descriptor {
    /// Satisfies input `index` from its partial signatures and writes the
    /// final scriptSig and witness.
    ///
    /// The signing fields (partial signatures, sighash type, scripts and
    /// key origins) are cleared afterwards, as BIP 174 asks of finalizers.
    /// If satisfaction fails the input is left untouched.
    pub fn finalize_psbt_input(&self, psbt: &mut Psbt, index: usize) -> Result<(), Error> {
        sanity_check(psbt)?;
        let txin = psbt
            .unsigned_tx
            .input
            .get(index)
            .ok_or(PsbtError::InputIndex { index, inputs: psbt.inputs.len() })?;
        let constraints = committed_constraints(psbt.unsigned_tx.lock_time, txin.sequence)
            .map_err(|e| Error::unsatisfiable(&format!("{:#}", self), e))?;

        let input = &mut psbt.inputs[index];
        check_sighash_types(input)?;
        let sigs = input
            .partial_sigs
            .iter()
            .map(|(pubkey, sig)| PartialSig::new(*pubkey, *sig))
            .collect::<Vec<_>>();
        let (script_sig, witness) = self.satisfy_committed(&sigs, &constraints)?;
        log::debug!("finalized input {} with {} signatures", index, sigs.len());

        //Fill in the satisfactions
        input.final_script_sig = if script_sig.is_empty() { None } else { Some(script_sig) };
        input.final_script_witness = if witness.is_empty() { None } else { Some(witness) };
        //reset everything
        input.partial_sigs.clear();
        input.sighash_type = None;
        input.redeem_script = None;
        input.witness_script = None;
        input.bip32_derivation.clear();
        Ok(())
    }
}

/// Finalizes every input of `psbt`, where input `i` spends an output of
/// `descriptors[i]`.
///
/// Stops at the first input that cannot be finalized; inputs before it
/// stay finalized.
pub fn finalize(psbt: &mut Psbt, descriptors: &[Descriptor]) -> Result<(), Error> {
    sanity_check(psbt)?;
    if descriptors.len() != psbt.inputs.len() {
        return Err(PsbtError::DescriptorCount {
            descriptors: descriptors.len(),
            inputs: psbt.inputs.len(),
        }
        .into());
    }
    for (index, desc) in descriptors.iter().enumerate() {
        desc.finalize_psbt_input(psbt, index)?;
    }
    Ok(())
}
