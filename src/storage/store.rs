//! Backing stores for the persisted chain representation
//!
//! The persisted form of a chain is a sequence of block records
//! `{index, timestamp, data, previous_hash, nonce, hash}` in chain order.
//! `JsonFileStore` keeps them as one JSON array document (full rewrite per
//! commit); `MemoryStore` backs tests and entity-embedded chains.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::chain::Block;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("store parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A durable location holding the serialized block sequence
pub trait ChainStore {
    /// Read the stored records, `None` when the store is absent or empty
    fn load(&mut self) -> Result<Option<Vec<Block>>, StoreError>;

    /// Make the store reflect `chain` extended by `new_block`
    fn commit(&mut self, chain: &[Block], new_block: &Block) -> Result<(), StoreError>;

    /// Rewrite the store from the full chain
    fn snapshot(&mut self, chain: &[Block]) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<Block>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records (an entity's embedded field)
    pub fn with_records(records: Vec<Block>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Block] {
        &self.records
    }
}

impl ChainStore for MemoryStore {
    fn load(&mut self) -> Result<Option<Vec<Block>>, StoreError> {
        if self.records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.records.clone()))
        }
    }

    fn commit(&mut self, _chain: &[Block], new_block: &Block) -> Result<(), StoreError> {
        self.records.push(new_block.clone());
        Ok(())
    }

    fn snapshot(&mut self, chain: &[Block]) -> Result<(), StoreError> {
        self.records = chain.to_vec();
        Ok(())
    }
}

/// JSON array document on disk, rewritten in full on every commit
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_records(&self, records: &[&Block]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ChainStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<Vec<Block>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let records: Vec<Block> = serde_json::from_str(&raw)?;
        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records))
        }
    }

    fn commit(&mut self, chain: &[Block], new_block: &Block) -> Result<(), StoreError> {
        let full: Vec<&Block> = chain.iter().chain(std::iter::once(new_block)).collect();
        self.write_records(&full)
    }

    fn snapshot(&mut self, chain: &[Block]) -> Result<(), StoreError> {
        let full: Vec<&Block> = chain.iter().collect();
        self.write_records(&full)
    }
}
