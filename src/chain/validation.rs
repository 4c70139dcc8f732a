//! Chain validation
//!
//! Pure functions for verifying hash linkage and chain structure.

use thiserror::Error;

use crate::chain::Block;
use crate::constants::GENESIS_PREVIOUS_HASH;
use crate::crypto::meets_difficulty;

/// Validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("block {index}: stored hash does not match recomputed hash")]
    HashMismatch { index: u64 },
    #[error("block {index}: previous_hash does not match prior block hash")]
    BrokenLink { index: u64 },
    #[error("block claims index {index} but position is {expected}")]
    IndexGap { index: u64, expected: u64 },
    #[error("block {index}: hash does not meet difficulty {difficulty}")]
    DifficultyNotMet { index: u64, difficulty: usize },
    #[error("genesis block is malformed")]
    MalformedGenesis,
    #[error("chain is empty")]
    Empty,
}

/// Verify hash integrity and linkage from index 1 onward
///
/// This is the integrity predicate behind `Chain::is_valid`: for every
/// block after genesis, the stored hash must equal the recomputed hash and
/// `previous_hash` must equal the prior block's stored hash.
pub fn verify_links(blocks: &[Block]) -> Result<(), ValidationError> {
    for pair in blocks.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.hash != current.calculate_hash() {
            return Err(ValidationError::HashMismatch {
                index: current.index,
            });
        }
        if current.previous_hash != previous.hash {
            return Err(ValidationError::BrokenLink {
                index: current.index,
            });
        }
    }
    Ok(())
}

/// Strict structural audit of an externally supplied record list
///
/// Beyond `verify_links`, this checks the genesis shape, index contiguity,
/// the genesis hash itself, and the difficulty prefix of every block. Used
/// when records arrive from outside the process (an entity's embedded
/// store, an exported chain) rather than from this chain's own appends.
pub fn verify_chain(blocks: &[Block], difficulty: usize) -> Result<(), ValidationError> {
    let genesis = blocks.first().ok_or(ValidationError::Empty)?;
    if genesis.index != 0 || genesis.previous_hash != GENESIS_PREVIOUS_HASH {
        return Err(ValidationError::MalformedGenesis);
    }

    for (position, block) in blocks.iter().enumerate() {
        let expected = position as u64;
        if block.index != expected {
            return Err(ValidationError::IndexGap {
                index: block.index,
                expected,
            });
        }
        if block.hash != block.calculate_hash() {
            return Err(ValidationError::HashMismatch { index: block.index });
        }
        if !meets_difficulty(&block.hash, difficulty) {
            return Err(ValidationError::DifficultyNotMet {
                index: block.index,
                difficulty,
            });
        }
    }

    verify_links(blocks)
}
