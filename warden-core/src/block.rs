//! Block types as seen by the federation layer.
//!
//! Only the fields the liveness tracker and the collateral rules read are
//! modelled here; transactions are plain `bitcoin` transactions with the
//! coinbase at index 0.

use bitcoin::hashes::{sha256d, Hash as _};
use bitcoin::Transaction;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Double-SHA256 hash of a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    /// The zero block hash (used for genesis parent).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block height.
    pub height: u64,
    /// Hash of the parent header.
    pub parent: BlockHash,
    /// Unix timestamp in seconds. PoA slots are derived from it.
    pub time: u32,
}

impl BlockHeader {
    /// Create a header.
    pub fn new(height: u64, parent: BlockHash, time: u32) -> Self {
        Self {
            height,
            parent,
            time,
        }
    }

    /// Compute the header hash.
    pub fn hash(&self) -> BlockHash {
        let mut bytes = Vec::with_capacity(8 + 32 + 4);
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(self.parent.as_bytes());
        bytes.extend_from_slice(&self.time.to_le_bytes());
        BlockHash(sha256d::Hash::hash(&bytes).to_byte_array())
    }
}

/// A full block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Header.
    pub header: BlockHeader,
    /// Transactions, coinbase first.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a block.
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// The coinbase transaction.
    pub fn coinbase(&self) -> Result<&Transaction> {
        self.transactions
            .first()
            .ok_or_else(|| Error::invalid_block("block has no coinbase transaction"))
    }

    /// Mutable access to the coinbase transaction.
    pub fn coinbase_mut(&mut self) -> Result<&mut Transaction> {
        self.transactions
            .first_mut()
            .ok_or_else(|| Error::invalid_block("block has no coinbase transaction"))
    }
}

/// A block together with its position in the best chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedBlock {
    /// The block.
    pub block: Block,
    /// Hash of the block header.
    pub hash: BlockHash,
}

impl ChainedBlock {
    /// Wrap a block, computing its hash.
    pub fn new(block: Block) -> Self {
        let hash = block.header.hash();
        Self { block, hash }
    }

    /// The block header.
    pub fn header(&self) -> &BlockHeader {
        &self.block.header
    }

    /// Header timestamp.
    pub fn time(&self) -> u32 {
        self.block.header.time
    }

    /// Block height.
    pub fn height(&self) -> u64 {
        self.block.header.height
    }
}
