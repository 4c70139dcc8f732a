//! The hash-linked, append-only chain
//!
//! `Chain` is the in-memory sequence of sealed blocks. Durability belongs
//! to the [`crate::ledger::Ledger`] service or, for entity-embedded chains,
//! to the owning entity via [`Chain::to_json`] / [`Chain::from_json`].

use serde_json::Value;
use tracing::warn;

use crate::chain::{unix_now, verify_chain, verify_links, Block, ValidationError};
use crate::constants::{GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH};
use crate::mining::{Miner, MiningError};

/// Ordered, hash-linked sequence of blocks
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
    difficulty: usize,
}

impl Chain {
    /// Create a chain with a freshly mined genesis block
    pub fn new(difficulty: usize, miner: &Miner) -> Result<Self, MiningError> {
        let mut chain = Self {
            blocks: Vec::new(),
            difficulty,
        };
        let genesis = chain.next_block(Value::String(GENESIS_PAYLOAD.to_string()));
        let sealed = miner.seal(genesis, difficulty)?;
        chain.blocks.push(sealed);
        Ok(chain)
    }

    /// Rebuild a chain from externally supplied records
    ///
    /// Hashes and nonces are taken as given (trusted input); nothing is
    /// re-mined. Run [`Chain::verify`] to audit untrusted records.
    pub fn from_records(records: Vec<Block>, difficulty: usize) -> Self {
        Self {
            blocks: records,
            difficulty,
        }
    }

    /// Deserialize an entity-embedded chain field
    ///
    /// Unreadable or empty data falls back to a freshly mined genesis,
    /// discarding whatever could not be parsed.
    pub fn from_json(data: &str, difficulty: usize, miner: &Miner) -> Result<Self, MiningError> {
        match serde_json::from_str::<Vec<Block>>(data) {
            Ok(records) if !records.is_empty() => Ok(Self::from_records(records, difficulty)),
            Ok(_) => Self::new(difficulty, miner),
            Err(err) => {
                warn!(%err, "unreadable embedded chain data, reinitializing");
                Self::new(difficulty, miner)
            }
        }
    }

    /// Serialize the chain for embedding into an entity's storage field
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.blocks).expect("chain records serialize")
    }

    /// Build the next unsealed block for the given payload
    pub(crate) fn next_block(&self, data: Value) -> Block {
        let (index, previous_hash) = match self.blocks.last() {
            Some(last) => (last.index + 1, last.hash.clone()),
            None => (0, GENESIS_PREVIOUS_HASH.to_string()),
        };
        Block::new(index, unix_now(), data, previous_hash)
    }

    /// Attach a sealed block and hand back a copy of it
    pub(crate) fn accept(&mut self, block: Block) -> Block {
        let sealed = block.clone();
        self.blocks.push(block);
        sealed
    }

    /// Mine and append a block carrying the given payload
    pub fn add_block(&mut self, data: Value, miner: &Miner) -> Result<Block, MiningError> {
        let candidate = self.next_block(data);
        let sealed = miner.seal(candidate, self.difficulty)?;
        Ok(self.accept(sealed))
    }

    /// Verify hash integrity and linkage from index 1 onward
    pub fn is_valid(&self) -> bool {
        verify_links(&self.blocks).is_ok()
    }

    /// Strict structural audit, including genesis shape and difficulty
    pub fn verify(&self) -> Result<(), ValidationError> {
        verify_chain(&self.blocks, self.difficulty)
    }

    /// Hash of the most recent block, or the genesis sentinel when empty
    pub fn head_hash(&self) -> &str {
        self.blocks
            .last()
            .map(|block| block.hash.as_str())
            .unwrap_or(GENESIS_PREVIOUS_HASH)
    }

    /// The most recent block
    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// All blocks in chain order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }
}
