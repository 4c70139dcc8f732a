//! Mining module - bounded proof-of-work nonce search

mod miner;

pub use miner::*;
