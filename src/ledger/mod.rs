//! Ledger service
//!
//! An explicit, lock-guarded service object owning one chain and its
//! backing store. Constructed once at startup and passed by reference;
//! there is no ambient global instance. The whole
//! "read last block, mine, append, persist" sequence runs inside one
//! critical section, so concurrent callers cannot produce two blocks
//! claiming the same index.

use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::chain::{Block, BlockView, Chain, ValidationError};
use crate::constants::{DEFAULT_MINING_DEADLINE_SECS, LOCAL_DIFFICULTY, REGISTRY_DIFFICULTY};
use crate::mining::{Miner, MiningError};
use crate::storage::{ChainStore, StoreError};

/// Ledger failures
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("mining: {0}")]
    Mining(#[from] MiningError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// Static per-ledger configuration
///
/// Difficulty is fixed at construction and never retargeted.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Required leading hex zeros for every block in this ledger
    pub difficulty: usize,
    /// Bound on a single proof-of-work search; `None` = unbounded
    pub mining_deadline: Option<Duration>,
}

impl LedgerConfig {
    /// Preset for a per-tender local chain
    pub fn local() -> Self {
        Self {
            difficulty: LOCAL_DIFFICULTY,
            mining_deadline: Some(Duration::from_secs(DEFAULT_MINING_DEADLINE_SECS)),
        }
    }

    /// Preset for the process-wide global registry
    pub fn registry() -> Self {
        Self {
            difficulty: REGISTRY_DIFFICULTY,
            mining_deadline: Some(Duration::from_secs(DEFAULT_MINING_DEADLINE_SECS)),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::local()
    }
}

/// Snapshot of a ledger's current shape
#[derive(Debug, Clone)]
pub struct LedgerStats {
    /// Index of the head block
    pub height: u64,
    /// Hash of the head block
    pub head_hash: String,
    /// Total number of blocks
    pub blocks: usize,
    /// Required leading hex zeros
    pub difficulty: usize,
}

#[derive(Debug)]
struct Inner<S> {
    chain: Chain,
    store: S,
}

/// Lock-guarded chain plus backing store
#[derive(Debug)]
pub struct Ledger<S> {
    inner: Mutex<Inner<S>>,
    miner: Miner,
}

impl<S: ChainStore> Ledger<S> {
    /// Open a ledger from its backing store
    ///
    /// An absent or empty store gets a freshly mined genesis block. A
    /// corrupt store is logged and replaced the same way - unreadable
    /// history is discarded rather than surfaced to the caller.
    pub fn open(mut store: S, config: LedgerConfig) -> Result<Self, LedgerError> {
        let miner = Miner::with_deadline(config.mining_deadline);

        let chain = match store.load() {
            Ok(Some(records)) => {
                info!(blocks = records.len(), "chain loaded");
                Chain::from_records(records, config.difficulty)
            }
            Ok(None) => {
                info!("no chain data found, creating genesis block");
                let chain = Chain::new(config.difficulty, &miner)?;
                store.snapshot(chain.blocks())?;
                chain
            }
            Err(err) => {
                warn!(%err, "failed to load chain, reinitializing with fresh genesis");
                let chain = Chain::new(config.difficulty, &miner)?;
                store.snapshot(chain.blocks())?;
                chain
            }
        };

        Ok(Self {
            inner: Mutex::new(Inner { chain, store }),
            miner,
        })
    }

    fn locked(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mine, persist, and return a block carrying the given payload
    ///
    /// The store is committed before the block joins the in-memory chain,
    /// so a failed persist leaves both sides consistent.
    pub fn append(&self, data: Value) -> Result<Block, LedgerError> {
        let mut inner = self.locked();
        let candidate = inner.chain.next_block(data);
        let sealed = self.miner.seal(candidate, inner.chain.difficulty())?;

        let Inner { chain, store } = &mut *inner;
        store.commit(chain.blocks(), &sealed)?;
        Ok(chain.accept(sealed))
    }

    /// Hash of the most recent block
    pub fn head_hash(&self) -> String {
        self.locked().chain.head_hash().to_string()
    }

    /// Verify hash integrity and linkage from index 1 onward
    pub fn is_valid(&self) -> bool {
        self.locked().chain.is_valid()
    }

    /// Strict structural audit of the full chain
    pub fn verify(&self) -> Result<(), ValidationError> {
        self.locked().chain.verify()
    }

    /// All blocks in chain order (machine form)
    pub fn list_blocks(&self) -> Vec<Block> {
        self.locked().chain.blocks().to_vec()
    }

    /// All blocks in chain order (display form, RFC 3339 timestamps)
    pub fn block_views(&self) -> Vec<BlockView> {
        self.locked().chain.blocks().iter().map(BlockView::from).collect()
    }

    /// Rewrite the backing store from the current chain
    pub fn compact(&self) -> Result<(), LedgerError> {
        let mut inner = self.locked();
        let Inner { chain, store } = &mut *inner;
        store.snapshot(chain.blocks())?;
        Ok(())
    }

    /// Current shape of the ledger
    pub fn stats(&self) -> LedgerStats {
        let inner = self.locked();
        LedgerStats {
            height: inner.chain.last().map(|block| block.index).unwrap_or(0),
            head_hash: inner.chain.head_hash().to_string(),
            blocks: inner.chain.len(),
            difficulty: inner.chain.difficulty(),
        }
    }

    pub fn len(&self) -> usize {
        self.locked().chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked().chain.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn fast_config() -> LedgerConfig {
        LedgerConfig {
            difficulty: 1,
            ..LedgerConfig::local()
        }
    }

    #[test]
    fn test_open_fresh_store_mines_genesis() {
        let ledger = Ledger::open(MemoryStore::new(), fast_config()).unwrap();
        let blocks = ledger.list_blocks();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].index, 0);
        assert_eq!(blocks[0].previous_hash, "0");
        assert!(blocks[0].hash.starts_with('0'));
    }

    #[test]
    fn test_append_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chain.json");

        let ledger = Ledger::open(JsonFileStore::new(&path), fast_config()).unwrap();
        let block = ledger.append(json!({"action": "Tender Created"})).unwrap();
        assert_eq!(block.index, 1);

        let reloaded = Ledger::open(JsonFileStore::new(&path), fast_config()).unwrap();
        assert_eq!(reloaded.list_blocks(), ledger.list_blocks());
        assert_eq!(reloaded.head_hash(), block.hash);
        assert!(reloaded.is_valid());
    }

    #[test]
    fn test_corrupt_store_reinitializes_with_genesis() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chain.json");
        fs::write(&path, "{definitely not a chain").unwrap();

        let ledger = Ledger::open(JsonFileStore::new(&path), fast_config()).unwrap();
        assert_eq!(ledger.len(), 1);

        // The fresh genesis replaced the corrupt document on disk.
        let reloaded = Ledger::open(JsonFileStore::new(&path), fast_config()).unwrap();
        assert_eq!(reloaded.list_blocks(), ledger.list_blocks());
    }

    #[test]
    fn test_mining_timeout_surfaces() {
        let config = LedgerConfig {
            difficulty: 64,
            mining_deadline: Some(Duration::from_millis(20)),
        };
        let err = Ledger::open(MemoryStore::new(), config).unwrap_err();
        assert!(matches!(err, LedgerError::Mining(MiningError::Timeout)));
    }

    #[test]
    fn test_stats_track_head() {
        let ledger = Ledger::open(MemoryStore::new(), fast_config()).unwrap();
        ledger.append(json!({"seq": 1})).unwrap();
        ledger.append(json!({"seq": 2})).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.height, 2);
        assert_eq!(stats.blocks, 3);
        assert_eq!(stats.difficulty, 1);
        assert_eq!(stats.head_hash, ledger.head_hash());
    }

    #[test]
    fn test_views_match_blocks() {
        let ledger = Ledger::open(MemoryStore::new(), fast_config()).unwrap();
        ledger.append(json!({"action": "Bid Submitted"})).unwrap();

        let blocks = ledger.list_blocks();
        let views = ledger.block_views();
        assert_eq!(blocks.len(), views.len());
        for (block, view) in blocks.iter().zip(&views) {
            assert_eq!(view.index, block.index);
            assert_eq!(view.hash, block.hash);
            assert_eq!(view.data, block.data);
        }
    }

    #[test]
    fn test_compact_rewrites_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chain.jsonl");
        let ledger = Ledger::open(crate::storage::AppendLogStore::new(&path), fast_config()).unwrap();
        ledger.append(json!({"seq": 1})).unwrap();
        ledger.compact().unwrap();

        let reloaded = Ledger::open(crate::storage::AppendLogStore::new(&path), fast_config()).unwrap();
        assert_eq!(reloaded.list_blocks(), ledger.list_blocks());
    }
}
