// SPDX-License-Identifier: CC0-1.0

//! Miscellaneous constraints imposed by Bitcoin.
//! These constraints are Policy (standardness) rules for Segwitv0 or Legacy
//! scripts.

use core::fmt;
use std::error;

use bitcoin::blockdata::opcodes::all::{OP_CHECKMULTISIG, OP_CHECKMULTISIGVERIFY, OP_PUSHNUM_16};
use bitcoin::script::{Instruction, Script};

/// Maximum operations per script
// https://github.com/bitcoin/bitcoin/blob/875e1ccc9fe01e026e564dfd39a64d9a4b332a89/src/script/script.h#L26
pub const MAX_OPS_PER_SCRIPT: usize = 201;
/// Maximum script size allowed by standardness rules
// https://github.com/bitcoin/bitcoin/blob/283a73d7eaea2907a6f7f800f529a0d6db53d7a6/src/policy/policy.h#L44
pub const MAX_STANDARD_P2WSH_SCRIPT_SIZE: usize = 3600;
/// Maximum script element size allowed by consensus rules, which bounds
/// the redeem script pushed in a P2SH scriptSig.
// https://github.com/bitcoin/bitcoin/blob/42b66a6b814bca130a9ccf0a3f747cf33d628232/src/script/script.h#L23
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
/// Maximum pubkeys as arguments to CHECKMULTISIG
// https://github.com/bitcoin/bitcoin/blob/6acda4b00b3fc1bfac02f5de590e1a5386cbc779/src/script/script.h#L30
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// A compiled script is outside the bounds relayed by standard nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// The script is too large.
    ScriptSize {
        /// Size of the script in bytes.
        size: usize,
        /// Largest accepted size.
        max: usize,
    },
    /// The script has too many non-push opcodes.
    OpCount {
        /// Opcodes counted.
        count: usize,
        /// Largest accepted count.
        max: usize,
    },
    /// Arbitrary miniscript directly under P2SH is not standard; the
    /// top-level fragment is given.
    NonStandardP2sh(String),
}

impl fmt::Display for LimitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LimitError::ScriptSize { size, max } => {
                write!(f, "script is {} bytes, the limit is {}", size, max)
            }
            LimitError::OpCount { count, max } => {
                write!(f, "script has {} non-push opcodes, the limit is {}", count, max)
            }
            LimitError::NonStandardP2sh(ref frag) => write!(
                f,
                "fragment `{}` is not standard directly under sh(); \
                 allow miniscript in p2sh to use it anyway",
                frag
            ),
        }
    }
}

impl error::Error for LimitError {}

/// Counts the non-push opcodes of a script the way the interpreter's
/// 201-op limit does: every opcode above `OP_16`, plus the number of keys
/// checked by each `CHECKMULTISIG(VERIFY)`. Both branches of conditionals
/// are counted.
pub fn count_ops(script: &Script) -> usize {
    let mut count = 0;
    let mut last_num = 0;
    for ins in script.instructions() {
        match ins {
            Ok(Instruction::Op(op)) => {
                if op.to_u8() > OP_PUSHNUM_16.to_u8() {
                    count += 1;
                }
                if op == OP_CHECKMULTISIG || op == OP_CHECKMULTISIGVERIFY {
                    count += last_num;
                }
                last_num = match op.to_u8() {
                    n @ 0x51..=0x60 => usize::from(n - 0x50),
                    _ => 0,
                };
            }
            Ok(Instruction::PushBytes(bytes)) => {
                last_num = match bytes.as_bytes() {
                    [n] => usize::from(*n),
                    _ => 0,
                };
            }
            // Scripts compiled here are always well formed.
            Err(_) => break,
        }
    }
    count
}

/// Checks a script used as a P2WSH witness script against the standard
/// size and opcode limits.
pub fn check_witness_script(script: &Script) -> Result<(), LimitError> {
    if script.len() > MAX_STANDARD_P2WSH_SCRIPT_SIZE {
        return Err(LimitError::ScriptSize {
            size: script.len(),
            max: MAX_STANDARD_P2WSH_SCRIPT_SIZE,
        });
    }
    check_op_count(script)
}

/// Checks a script used as a bare P2SH redeem script against the push
/// size and opcode limits.
pub fn check_p2sh_script(script: &Script) -> Result<(), LimitError> {
    if script.len() > MAX_SCRIPT_ELEMENT_SIZE {
        return Err(LimitError::ScriptSize { size: script.len(), max: MAX_SCRIPT_ELEMENT_SIZE });
    }
    check_op_count(script)
}

fn check_op_count(script: &Script) -> Result<(), LimitError> {
    let count = count_ops(script);
    if count > MAX_OPS_PER_SCRIPT {
        return Err(LimitError::OpCount { count, max: MAX_OPS_PER_SCRIPT });
    }
    Ok(())
}
