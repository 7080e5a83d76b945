// SPDX-License-Identifier: CC0-1.0

use core::convert::TryFrom;

use bitcoin::script::{self, PushBytesBuf, ScriptBuf};

use crate::miniscript::limits::{LimitError, MAX_SCRIPT_ELEMENT_SIZE};
use crate::miniscript::satisfy::Placeholder;

pub(crate) fn varint_len(n: usize) -> usize { bitcoin::VarInt(n as u64).size() }

pub(crate) trait ItemSize {
    fn size(&self) -> usize;
}

impl ItemSize for Placeholder {
    fn size(&self) -> usize {
        match self {
            Placeholder::EcdsaSig(_) => 73,
            Placeholder::Pubkey(key) => {
                if key.pk.compressed {
                    34
                } else {
                    66
                }
            }
            Placeholder::HashDissatisfaction | Placeholder::Preimage(..) => 33,
            Placeholder::PushOne => 2, // On legacy this should be 1 ?
            Placeholder::PushZero => 1,
        }
    }
}

impl ItemSize for Vec<u8> {
    fn size(&self) -> usize { varint_len(self.len()) + self.len() }
}

// Helper function to calculate witness size
pub(crate) fn witness_size<T: ItemSize>(wit: &[T]) -> usize {
    wit.iter().map(T::size).sum::<usize>() + varint_len(wit.len())
}

/// Turns a witness stack into the equivalent scriptSig, with small numbers
/// pushed as opcodes.
pub(crate) fn witness_to_scriptsig(witness: &[Vec<u8>]) -> Result<ScriptBuf, LimitError> {
    let mut b = script::Builder::new();
    for wit in witness {
        if let Ok(n) = script::read_scriptint(wit) {
            b = b.push_int(n);
        } else {
            let too_large =
                || LimitError::ScriptSize { size: wit.len(), max: MAX_SCRIPT_ELEMENT_SIZE };
            if wit.len() > MAX_SCRIPT_ELEMENT_SIZE {
                return Err(too_large());
            }
            b = b.push_slice(PushBytesBuf::try_from(wit.clone()).map_err(|_| too_large())?);
        }
    }
    Ok(b.into_script())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scriptsig_pushes() {
        let script = witness_to_scriptsig(&[vec![], vec![1], vec![0xab; 33]]).unwrap();
        let mut expected = vec![0x00, 0x51, 0x21];
        expected.extend([0xab; 33]);
        assert_eq!(script.as_bytes(), &expected[..]);

        assert!(witness_to_scriptsig(&[vec![0xab; 521]]).is_err());
    }

    #[test]
    fn sizes() {
        assert_eq!(witness_size::<Vec<u8>>(&[]), 1);
        assert_eq!(witness_size(&[vec![0u8; 72], vec![]]), 1 + 73 + 1);
        assert_eq!(witness_size(&[Placeholder::PushZero, Placeholder::PushOne]), 4);
    }
}
