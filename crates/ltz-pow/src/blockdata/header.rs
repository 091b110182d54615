//! Equihash block header.
//!
//! The header extends the Bitcoin layout with a final Sapling root, widens the
//! nonce to 32 bytes and appends a variable-length Equihash solution:
//!
//! | field | size |
//! |---|---|
//! | version | 4 |
//! | previous block hash | 32 |
//! | merkle root | 32 |
//! | final Sapling root | 32 |
//! | time | 4 |
//! | bits | 4 |
//! | nonce | 32 |
//! | solution | compact size + n |
//!
//! The first six fields form the Equihash input `I`, the nonce is `V`.

use bitcoin::hashes::{sha256d, Hash};
use bitcoin::{io, BlockHash, TxMerkleNode};
use serde::{Deserialize, Serialize};

use crate::consensus::encode::{self, serialize};
use crate::consensus::{Decodable, Encodable};
use crate::pow::CompactTarget;

/// Length of the Equihash input: every header field before the nonce.
pub const EQUIHASH_INPUT_SIZE: usize = 4 + 32 + 32 + 32 + 4 + 4; // 108

/// A block header as seen by proof-of-work validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block version.
    pub version: i32,
    /// Reference to the previous block in the chain.
    pub prev_blockhash: BlockHash,
    /// The root hash of the merkle tree of transactions in the block.
    pub merkle_root: TxMerkleNode,
    /// Root of the Sapling note commitment tree after this block.
    pub final_sapling_root: [u8; 32],
    /// The timestamp of the block, as claimed by the miner.
    pub time: u32,
    /// The target value below which the blockhash must lie.
    pub bits: CompactTarget,
    /// The nonce fed to Equihash after the input.
    pub nonce: [u8; 32],
    /// The Equihash solution. Its length selects the Equihash parameters.
    pub solution: Vec<u8>,
}

impl BlockHeader {
    /// Header timestamp widened for comparisons against chain times.
    pub fn block_time(&self) -> i64 {
        i64::from(self.time)
    }

    /// Returns the Equihash input `I`: the header serialized up to, but
    /// excluding, the nonce.
    pub fn equihash_input(&self) -> Vec<u8> {
        let mut input = Vec::with_capacity(EQUIHASH_INPUT_SIZE);
        input.extend_from_slice(&self.version.to_le_bytes());
        input.extend_from_slice(self.prev_blockhash.as_byte_array());
        input.extend_from_slice(self.merkle_root.as_byte_array());
        input.extend_from_slice(&self.final_sapling_root);
        input.extend_from_slice(&self.time.to_le_bytes());
        input.extend_from_slice(&self.bits.to_consensus().to_le_bytes());
        input
    }

    /// Computes the block hash, double SHA-256 over the full serialized
    /// header including nonce and solution.
    pub fn block_hash(&self) -> BlockHash {
        BlockHash::from_raw_hash(sha256d::Hash::hash(&serialize(self)))
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            version: 4,
            prev_blockhash: BlockHash::all_zeros(),
            merkle_root: TxMerkleNode::all_zeros(),
            final_sapling_root: [0; 32],
            time: 0,
            bits: CompactTarget::new(0),
            nonce: [0; 32],
            solution: Vec::new(),
        }
    }
}

impl Encodable for BlockHeader {
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "A header is a few kilobytes at most"
    )]
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = 0;
        len += self.version.consensus_encode(writer)?;
        len += self.prev_blockhash.consensus_encode(writer)?;
        len += self.merkle_root.consensus_encode(writer)?;
        len += self.final_sapling_root.consensus_encode(writer)?;
        len += self.time.consensus_encode(writer)?;
        len += self.bits.to_consensus().consensus_encode(writer)?;
        len += self.nonce.consensus_encode(writer)?;
        len += self.solution.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decodable for BlockHeader {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        Ok(Self {
            version: Decodable::consensus_decode(reader)?,
            prev_blockhash: Decodable::consensus_decode(reader)?,
            merkle_root: Decodable::consensus_decode(reader)?,
            final_sapling_root: Decodable::consensus_decode(reader)?,
            time: Decodable::consensus_decode(reader)?,
            bits: CompactTarget::new(Decodable::consensus_decode(reader)?),
            nonce: Decodable::consensus_decode(reader)?,
            solution: Decodable::consensus_decode(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::encode::deserialize;
    use crate::util::hex_to_blockhash;

    fn header() -> BlockHeader {
        BlockHeader {
            version: 4,
            prev_blockhash: hex_to_blockhash(
                "08ce3d9731b000c08338455c8a4a6bd05da16e26b11daa1b917184ece80f0400",
            )
            .unwrap(),
            merkle_root: TxMerkleNode::from_byte_array([0x11; 32]),
            final_sapling_root: [0x22; 32],
            time: 1_477_641_360,
            bits: CompactTarget::new(0x1f07ffff),
            nonce: [0x33; 32],
            solution: vec![0x44; 1344],
        }
    }

    #[test]
    fn test_equihash_input_layout() {
        let header = header();
        let input = header.equihash_input();
        assert_eq!(input.len(), EQUIHASH_INPUT_SIZE);
        assert_eq!(&input[..4], &[4, 0, 0, 0]);
        assert_eq!(&input[4..36], header.prev_blockhash.as_byte_array());
        assert_eq!(&input[36..68], &[0x11; 32]);
        assert_eq!(&input[68..100], &[0x22; 32]);
        assert_eq!(&input[100..104], &1_477_641_360_u32.to_le_bytes());
        assert_eq!(&input[104..108], &[0xff, 0xff, 0x07, 0x1f]);
    }

    #[test]
    fn test_serialization_layout() {
        let header = header();
        let bytes = serialize(&header);
        // input, nonce, 0xfd + u16 length, solution
        assert_eq!(bytes.len(), EQUIHASH_INPUT_SIZE + 32 + 3 + 1344);
        assert_eq!(&bytes[..EQUIHASH_INPUT_SIZE], header.equihash_input().as_slice());
        assert_eq!(&bytes[108..140], &[0x33; 32]);
        assert_eq!(&bytes[140..143], &[0xfd, 0x40, 0x05]);

        let decoded: BlockHeader = deserialize(&bytes).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_block_hash_commits_to_solution() {
        let header = header();
        let expected = BlockHash::from_raw_hash(sha256d::Hash::hash(&serialize(&header)));
        assert_eq!(header.block_hash(), expected);

        let mut other = header.clone();
        other.solution[0] ^= 1;
        assert_ne!(other.block_hash(), header.block_hash());
    }

    #[test]
    fn test_truncated_header_fails_to_decode() {
        let bytes = serialize(&header());
        assert!(deserialize::<BlockHeader>(&bytes[..120]).is_err());
    }
}
