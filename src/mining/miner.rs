//! Block miner implementation
//!
//! Performs the PoW nonce search under a stop signal and an optional
//! deadline, so an unreasonable difficulty surfaces as an error instead
//! of an unbounded hang.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use crate::chain::Block;
use crate::constants::DEFAULT_MINING_DEADLINE_SECS;
use crate::crypto::meets_difficulty;

/// Mining failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MiningError {
    #[error("mining deadline exceeded")]
    Timeout,
    #[error("mining interrupted by stop signal")]
    Interrupted,
}

/// Block miner
#[derive(Debug, Clone)]
pub struct Miner {
    /// Stop signal shared with whoever needs to interrupt the search
    stop_signal: Arc<AtomicBool>,
    /// Upper bound on a single seal; `None` searches without limit
    deadline: Option<Duration>,
}

impl Miner {
    /// Create a miner with the default deadline
    pub fn new() -> Self {
        Self {
            stop_signal: Arc::new(AtomicBool::new(false)),
            deadline: Some(Duration::from_secs(DEFAULT_MINING_DEADLINE_SECS)),
        }
    }

    /// Create a miner with an explicit deadline (`None` = unbounded)
    pub fn with_deadline(deadline: Option<Duration>) -> Self {
        Self {
            stop_signal: Arc::new(AtomicBool::new(false)),
            deadline,
        }
    }

    /// Get a stop signal handle
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Stop mining
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Reset stop signal
    pub fn reset(&self) {
        self.stop_signal.store(false, Ordering::SeqCst);
    }

    /// Seal a block: find a nonce whose hash meets the difficulty
    ///
    /// Increments the nonce and recomputes the hash until the required
    /// leading-zero prefix appears. With difficulty 0 the block's initial
    /// hash already qualifies and the nonce stays 0.
    pub fn seal(&self, mut block: Block, difficulty: usize) -> Result<Block, MiningError> {
        let started = Instant::now();

        loop {
            if self.stop_signal.load(Ordering::SeqCst) {
                return Err(MiningError::Interrupted);
            }

            if meets_difficulty(&block.hash, difficulty) {
                debug!(index = block.index, nonce = block.nonce, hash = %block.hash, "block sealed");
                return Ok(block);
            }

            if let Some(deadline) = self.deadline {
                if started.elapsed() >= deadline {
                    return Err(MiningError::Timeout);
                }
            }

            block.nonce = block.nonce.wrapping_add(1);
            block.hash = block.calculate_hash();
        }
    }
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}
