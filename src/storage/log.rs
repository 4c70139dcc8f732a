//! Append-only log store
//!
//! One JSON record per line, flushed to disk per commit, so append cost
//! stays constant as the chain grows. `snapshot` compacts the log by
//! rewriting it from the full chain.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::chain::Block;
use crate::storage::{ChainStore, StoreError};

/// Append-only record log on disk
#[derive(Debug, Clone)]
pub struct AppendLogStore {
    path: PathBuf,
}

impl AppendLogStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(file: &mut File, block: &Block) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(block)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl ChainStore for AppendLogStore {
    fn load(&mut self) -> Result<Option<Vec<Block>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for line in raw.lines().filter(|line| !line.trim().is_empty()) {
            records.push(serde_json::from_str(line)?);
        }
        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records))
        }
    }

    fn commit(&mut self, _chain: &[Block], new_block: &Block) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Self::write_line(&mut file, new_block)?;
        file.sync_data()?;
        Ok(())
    }

    fn snapshot(&mut self, chain: &[Block]) -> Result<(), StoreError> {
        let mut file = File::create(&self.path)?;
        for block in chain {
            Self::write_line(&mut file, block)?;
        }
        file.sync_data()?;
        Ok(())
    }
}
