//! Counter-chain height commitments carried in coinbase outputs.
//!
//! A commitment is a null-data output:
//!
//! ```text
//! OP_RETURN [PREFIX (4) | height (4, LE i32)] [magic (4, LE u32)]
//! ```
//!
//! The magic push is optional when decoding.

use bitcoin::blockdata::opcodes;
use bitcoin::blockdata::script::{Builder, Instruction, PushBytesBuf, Script, ScriptBuf};
use bitcoin::Transaction;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::HEIGHT_COMMITMENT_PREFIX;

/// Length of an encoded height: prefix plus four height bytes.
pub const ENCODED_HEIGHT_LEN: usize = HEIGHT_COMMITMENT_PREFIX.len() + 4;

/// A decoded commitment. Both fields are `None` when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// Committed counter-chain height.
    pub height: Option<i32>,
    /// Counter-chain network magic, if the commitment carried one.
    pub magic: Option<u32>,
}

impl Commitment {
    /// Whether a commitment was found.
    pub fn is_present(&self) -> bool {
        self.height.is_some()
    }
}

/// Encode `height` as `PREFIX ‖ height_le`.
pub fn encode_commitment_height(height: i32) -> [u8; ENCODED_HEIGHT_LEN] {
    let mut out = [0u8; ENCODED_HEIGHT_LEN];
    out[..HEIGHT_COMMITMENT_PREFIX.len()].copy_from_slice(&HEIGHT_COMMITMENT_PREFIX);
    out[HEIGHT_COMMITMENT_PREFIX.len()..].copy_from_slice(&height.to_le_bytes());
    out
}

/// Build the null-data output script committing to `height` on the counter
/// chain identified by `magic`.
pub fn commitment_script(height: i32, magic: u32) -> Result<ScriptBuf> {
    let encoded = PushBytesBuf::try_from(encode_commitment_height(height).to_vec())?;
    let magic = PushBytesBuf::try_from(magic.to_le_bytes().to_vec())?;

    Ok(Builder::new()
        .push_opcode(opcodes::all::OP_RETURN)
        .push_slice(encoded)
        .push_slice(magic)
        .into_script())
}

/// Scan `scripts` in order and decode the first height commitment found.
///
/// Scripts that fail to parse, are not null-data, do not have exactly two or
/// three elements, or whose second element lacks the prefix are skipped.
pub fn decode_commitment<'a, I>(scripts: I) -> Commitment
where
    I: IntoIterator<Item = &'a Script>,
{
    for (index, script) in scripts.into_iter().enumerate() {
        if !script.is_op_return() {
            continue;
        }

        let elements = match script.instructions().collect::<std::result::Result<Vec<_>, _>>() {
            Ok(elements) => elements,
            Err(e) => {
                trace!(index, error = %e, "Skipping malformed null-data script");
                continue;
            }
        };

        if elements.len() != 2 && elements.len() != 3 {
            continue;
        }

        let Some(data) = push_data(&elements[1]) else {
            continue;
        };
        let Some(height_bytes) = data.strip_prefix(&HEIGHT_COMMITMENT_PREFIX[..]) else {
            continue;
        };
        let Some(height) = read_le4(height_bytes).map(i32::from_le_bytes) else {
            trace!(index, len = data.len(), "Commitment push too short");
            continue;
        };

        let magic = elements
            .get(2)
            .and_then(push_data)
            .and_then(read_le4)
            .map(u32::from_le_bytes);

        return Commitment {
            height: Some(height),
            magic,
        };
    }

    Commitment::default()
}

/// Decode the height commitment carried by a coinbase transaction.
pub fn decode_from_coinbase(coinbase: &Transaction) -> Commitment {
    decode_commitment(coinbase.output.iter().map(|out| out.script_pubkey.as_script()))
}

fn push_data<'a>(instruction: &Instruction<'a>) -> Option<&'a [u8]> {
    match instruction {
        Instruction::PushBytes(bytes) => Some(bytes.as_bytes()),
        Instruction::Op(_) => None,
    }
}

fn read_le4(bytes: &[u8]) -> Option<[u8; 4]> {
    bytes.get(..4)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::{transaction, Amount, TxOut};
    use proptest::prelude::*;

    const MAGIC: u32 = 0x0A0B_0C0D;

    fn null_data(pushes: &[&[u8]]) -> ScriptBuf {
        let mut builder = Builder::new().push_opcode(opcodes::all::OP_RETURN);
        for push in pushes {
            builder = builder.push_slice(PushBytesBuf::try_from(push.to_vec()).unwrap());
        }
        builder.into_script()
    }

    fn decode(scripts: &[ScriptBuf]) -> Commitment {
        decode_commitment(scripts.iter().map(|s| s.as_script()))
    }

    #[test]
    fn test_encode_layout() {
        assert_eq!(encode_commitment_height(1), [121, 13, 6, 253, 1, 0, 0, 0]);
        assert_eq!(
            encode_commitment_height(-1),
            [121, 13, 6, 253, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_script_layout() {
        let script = commitment_script(40, MAGIC).unwrap();
        assert!(script.is_op_return());

        let mut expected = vec![opcodes::all::OP_RETURN.to_u8(), 8];
        expected.extend_from_slice(&encode_commitment_height(40));
        expected.push(4);
        expected.extend_from_slice(&MAGIC.to_le_bytes());
        assert_eq!(script.as_bytes(), &expected[..]);
    }

    #[test]
    fn test_decode_without_magic() {
        let script = null_data(&[&encode_commitment_height(7)]);
        assert_eq!(
            decode(&[script]),
            Commitment {
                height: Some(7),
                magic: None
            }
        );
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(&[]), Commitment::default());
        assert!(!Commitment::default().is_present());
    }

    #[test]
    fn test_decode_skips_non_matching_outputs() {
        let scripts = vec![
            ScriptBuf::from_bytes(vec![opcodes::all::OP_PUSHNUM_1.to_u8()]),
            null_data(&[b"unrelated"]),
            null_data(&[&[1, 2, 3, 4, 5, 6, 7, 8]]),
            commitment_script(99, MAGIC).unwrap(),
        ];
        assert_eq!(decode(&scripts).height, Some(99));
    }

    #[test]
    fn test_decode_first_match_wins() {
        let scripts = vec![
            commitment_script(1, MAGIC).unwrap(),
            commitment_script(2, MAGIC).unwrap(),
        ];
        assert_eq!(decode(&scripts).height, Some(1));
    }

    #[test]
    fn test_decode_rejects_wrong_element_count() {
        let h = encode_commitment_height(5);
        let m = MAGIC.to_le_bytes();

        // OP_RETURN alone
        assert_eq!(decode(&[null_data(&[])]), Commitment::default());
        // Four elements
        assert_eq!(decode(&[null_data(&[&h, &m, &m])]), Commitment::default());
    }

    #[test]
    fn test_decode_short_height_is_not_a_match() {
        let script = null_data(&[&[121, 13, 6, 253, 1, 2]]);
        assert_eq!(decode(&[script]), Commitment::default());
    }

    #[test]
    fn test_decode_short_magic_is_ignored() {
        let script = null_data(&[&encode_commitment_height(3), &[1, 2]]);
        assert_eq!(
            decode(&[script]),
            Commitment {
                height: Some(3),
                magic: None
            }
        );
    }

    #[test]
    fn test_decode_skips_malformed_script() {
        // OP_RETURN followed by a push that runs past the end
        let malformed = ScriptBuf::from_bytes(vec![opcodes::all::OP_RETURN.to_u8(), 0x08, 1, 2]);
        let scripts = vec![malformed, commitment_script(12, MAGIC).unwrap()];
        assert_eq!(decode(&scripts).height, Some(12));
    }

    #[test]
    fn test_decode_from_coinbase() {
        let coinbase = Transaction {
            version: transaction::Version::TWO,
            lock_time: bitcoin::absolute::LockTime::ZERO,
            input: vec![],
            output: vec![
                TxOut {
                    value: Amount::from_sat(5_000),
                    script_pubkey: ScriptBuf::new(),
                },
                TxOut {
                    value: Amount::ZERO,
                    script_pubkey: commitment_script(321, MAGIC).unwrap(),
                },
            ],
        };
        assert_eq!(
            decode_from_coinbase(&coinbase),
            Commitment {
                height: Some(321),
                magic: Some(MAGIC)
            }
        );
    }

    proptest! {
        #[test]
        fn prop_round_trip(height in any::<i32>(), magic in any::<u32>()) {
            let script = commitment_script(height, magic).unwrap();
            let decoded = decode(&[script]);
            prop_assert_eq!(decoded.height, Some(height));
            prop_assert_eq!(decoded.magic, Some(magic));
        }

        #[test]
        fn prop_no_false_match(data in proptest::collection::vec(any::<u8>(), 0..40)) {
            prop_assume!(!data.starts_with(&HEIGHT_COMMITMENT_PREFIX));
            let script = null_data(&[&data, &MAGIC.to_le_bytes()]);
            prop_assert_eq!(decode(&[script]), Commitment::default());
        }
    }
}
