//! Property-based and adversarial tests for the tender ledger
//!
//! These tests verify hash, linkage, and tamper-evidence invariants hold
//! under random inputs.

use proptest::prelude::*;
use serde_json::json;
use tender_ledger::chain::{Block, Chain};
use tender_ledger::crypto::meets_difficulty;
use tender_ledger::mining::Miner;

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

proptest! {
    /// Block hash is a pure function of the block's fields
    #[test]
    fn prop_block_hash_deterministic(
        index in 0u64..1_000_000u64,
        timestamp in 0u64..4_000_000_000u64,
        nonce in 0u64..u64::MAX,
        payload in ".*"
    ) {
        let block1 = Block {
            index,
            timestamp,
            data: json!(payload),
            previous_hash: "0".to_string(),
            nonce,
            hash: String::new(),
        };
        let block2 = block1.clone();

        prop_assert_eq!(block1.calculate_hash(), block2.calculate_hash());
    }

    /// Different nonces produce different hashes
    #[test]
    fn prop_different_nonce_different_hash(nonce in 0u64..u64::MAX / 2) {
        let block1 = Block::new(1, 42, json!("payload"), "0".to_string());
        let mut block2 = block1.clone();
        block2.nonce = nonce.wrapping_add(1);

        prop_assert_ne!(block1.calculate_hash(), block2.calculate_hash());
    }

    /// Sealing always satisfies the difficulty prefix
    #[test]
    fn prop_sealed_hash_meets_difficulty(
        difficulty in 0usize..=2,
        seq in any::<u32>()
    ) {
        let miner = Miner::new();
        let candidate = Block::new(1, 1700000000, json!({ "seq": seq }), "0".to_string());
        let sealed = miner.seal(candidate, difficulty).unwrap();

        prop_assert!(meets_difficulty(&sealed.hash, difficulty));
        prop_assert_eq!(&sealed.hash, &sealed.calculate_hash());
    }

    /// Chains stay valid and contiguous across random appends
    #[test]
    fn prop_chain_valid_after_appends(
        payloads in proptest::collection::vec(any::<u32>(), 1..6)
    ) {
        let miner = Miner::new();
        let mut chain = Chain::new(0, &miner).unwrap();
        for payload in &payloads {
            chain.add_block(json!({ "value": payload }), &miner).unwrap();
        }

        prop_assert!(chain.is_valid());
        prop_assert!(chain.verify().is_ok());
        for (position, block) in chain.blocks().iter().enumerate() {
            prop_assert_eq!(block.index, position as u64);
        }
    }

    /// Reconstruction from records preserves every field and stays valid
    #[test]
    fn prop_reconstruct_roundtrip(
        payloads in proptest::collection::vec(any::<u32>(), 1..5)
    ) {
        let miner = Miner::new();
        let mut chain = Chain::new(0, &miner).unwrap();
        for payload in &payloads {
            chain.add_block(json!(payload), &miner).unwrap();
        }

        let rebuilt = Chain::from_records(chain.blocks().to_vec(), 0);
        prop_assert_eq!(rebuilt.blocks(), chain.blocks());
        prop_assert_eq!(rebuilt.head_hash(), chain.head_hash());
        prop_assert!(rebuilt.is_valid());
    }

    /// Tampering with any non-genesis payload is detected
    #[test]
    fn prop_tamper_detected(
        payloads in proptest::collection::vec(any::<u32>(), 2..6),
        victim in any::<prop::sample::Index>()
    ) {
        let miner = Miner::new();
        let mut chain = Chain::new(0, &miner).unwrap();
        for payload in &payloads {
            chain.add_block(json!({ "value": payload }), &miner).unwrap();
        }

        let mut records = chain.blocks().to_vec();
        let target = 1 + victim.index(records.len() - 1);
        records[target].data = json!({ "value": "tampered" });

        let tampered = Chain::from_records(records, 0);
        prop_assert!(!tampered.is_valid());
    }
}

// ============================================================================
// ADVERSARIAL TESTS
// ============================================================================

/// Rewriting history also requires re-linking every later block
#[test]
fn test_remined_tamper_still_breaks_downstream_links() {
    let miner = Miner::new();
    let mut chain = Chain::new(1, &miner).unwrap();
    chain.add_block(json!({"amount": 100}), &miner).unwrap();
    chain.add_block(json!({"amount": 200}), &miner).unwrap();

    // Attacker rewrites block 1 and even re-mines it correctly.
    let mut records = chain.blocks().to_vec();
    records[1].data = json!({"amount": 1});
    let remined = miner
        .seal(
            Block::new(
                records[1].index,
                records[1].timestamp,
                records[1].data.clone(),
                records[1].previous_hash.clone(),
            ),
            1,
        )
        .unwrap();
    records[1] = remined;

    // Block 2 still points at the old hash of block 1.
    let tampered = Chain::from_records(records, 1);
    assert!(!tampered.is_valid());
}

/// A swapped-in block claiming a foreign parent is rejected
#[test]
fn test_foreign_parent_rejected() {
    let miner = Miner::new();
    let mut chain_a = Chain::new(0, &miner).unwrap();
    chain_a.add_block(json!("a1"), &miner).unwrap();
    let mut chain_b = Chain::new(0, &miner).unwrap();
    chain_b.add_block(json!("b1"), &miner).unwrap();
    chain_b.add_block(json!("b2"), &miner).unwrap();

    let mut records = chain_a.blocks().to_vec();
    // Both genesis blocks can seal identically, so splice a block whose
    // parent is unmistakably foreign.
    records[1] = chain_b.blocks()[2].clone();

    let spliced = Chain::from_records(records, 0);
    assert!(!spliced.is_valid());
}
