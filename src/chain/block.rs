//! Block structure for the tender ledger
//!
//! Defines the sealed record and its canonical hash function.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto::sha256_hex;

/// One sealed record in a chain
///
/// The serde form of this struct is the persisted machine representation:
/// `{index, timestamp, data, previous_hash, nonce, hash}` with the
/// timestamp in Unix epoch seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    /// Position in the chain, contiguous from 0
    pub index: u64,
    /// Creation time (seconds since Unix epoch)
    pub timestamp: u64,
    /// Opaque JSON payload; the ledger never inspects it
    pub data: Value,
    /// Hex hash of the prior block, or `"0"` for genesis
    pub previous_hash: String,
    /// Nonce found by mining
    pub nonce: u64,
    /// Hex SHA-256 over the canonical encoding of the other five fields
    pub hash: String,
}

impl Block {
    /// Create a new block with nonce 0 and its initial hash computed
    pub fn new(index: u64, timestamp: u64, data: Value, previous_hash: String) -> Self {
        let mut block = Self {
            index,
            timestamp,
            data,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash();
        block
    }

    /// Recompute the hash from the block's current fields
    ///
    /// Object keys serialize in sorted order (serde_json's default map is a
    /// BTreeMap), so the encoding is stable across runs and platforms.
    pub fn calculate_hash(&self) -> String {
        let canonical = serde_json::json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "data": self.data,
            "previous_hash": self.previous_hash,
            "nonce": self.nonce,
        });
        sha256_hex(canonical.to_string().as_bytes())
    }

    /// Check if this is a genesis block
    pub fn is_genesis(&self) -> bool {
        self.previous_hash == crate::constants::GENESIS_PREVIOUS_HASH
    }
}

/// Display/export form of a block with a human-readable timestamp
///
/// All fields except `timestamp` are carried over exactly; `timestamp`
/// is rendered as an RFC 3339 string.
#[derive(Debug, Clone, Serialize)]
pub struct BlockView {
    pub index: u64,
    pub timestamp: String,
    pub data: Value,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        let timestamp = DateTime::from_timestamp(block.timestamp as i64, 0)
            .unwrap_or_default()
            .to_rfc3339();
        Self {
            index: block.index,
            timestamp,
            data: block.data.clone(),
            previous_hash: block.previous_hash.clone(),
            nonce: block.nonce,
            hash: block.hash.clone(),
        }
    }
}

/// Current time in Unix epoch seconds
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
