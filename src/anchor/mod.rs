//! Cross-chain anchoring
//!
//! After a tender's local chain gains a block, a referencing event is
//! appended to the global registry: the registry payload embeds the local
//! chain's head hash (`local_chain_root_hash`), and the registry's own new
//! head hash goes back to the caller as the entity's anchor pointer. The
//! reference is one-directional and timestamped; the local chain stores no
//! back-link.

use serde_json::{Map, Value};
use std::fmt;

use crate::chain::Chain;
use crate::ledger::{Ledger, LedgerError};
use crate::mining::Miner;
use crate::storage::ChainStore;

/// Lifecycle event kinds recorded in the global registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenderAction {
    Created,
    Updated,
    Deleted,
    Closed,
    Awarded,
    BidSubmitted,
}

impl TenderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenderAction::Created => "Tender Created",
            TenderAction::Updated => "Tender Updated",
            TenderAction::Deleted => "Tender Deleted",
            TenderAction::Closed => "Tender Closed",
            TenderAction::Awarded => "Tender Awarded",
            TenderAction::BidSubmitted => "Bid Submitted",
        }
    }
}

impl fmt::Display for TenderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed registry event, built at the boundary before it reaches the ledger
///
/// `detail` carries pre-flattened extras (title, winner, final price, ...).
/// The reserved keys `action`, `tender_id`, and `local_chain_root_hash` are
/// set by the protocol and win over colliding detail keys.
#[derive(Debug, Clone)]
pub struct RegistryEvent {
    pub tender_id: u64,
    pub action: TenderAction,
    detail: Map<String, Value>,
}

impl RegistryEvent {
    pub fn new(tender_id: u64, action: TenderAction) -> Self {
        Self {
            tender_id,
            action,
            detail: Map::new(),
        }
    }

    /// Attach a pre-flattened detail field
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.detail.insert(key.into(), value);
        self
    }

    /// Flatten into the registry payload, embedding the local head hash
    fn into_payload(self, local_root: &str) -> Value {
        let mut payload = self.detail;
        payload.insert("action".into(), Value::String(self.action.as_str().into()));
        payload.insert("tender_id".into(), Value::from(self.tender_id));
        payload.insert(
            "local_chain_root_hash".into(),
            Value::String(local_root.to_string()),
        );
        Value::Object(payload)
    }
}

/// Both heads produced by one anchoring round
///
/// `global_link` is what the caller stores on the entity as its anchor
/// pointer; `local_root` is the local head the registry block references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorReceipt {
    pub local_root: String,
    pub global_link: String,
}

/// Run the anchoring protocol across two store-backed ledgers
///
/// Appends `payload` to the local ledger, then appends a registry event
/// embedding the resulting local head hash to the registry ledger.
pub fn anchor_block<S: ChainStore, R: ChainStore>(
    local: &Ledger<S>,
    registry: &Ledger<R>,
    event: RegistryEvent,
    payload: Value,
) -> Result<AnchorReceipt, LedgerError> {
    let local_block = local.append(payload)?;
    let local_root = local_block.hash;
    let global_block = registry.append(event.into_payload(&local_root))?;
    Ok(AnchorReceipt {
        local_root,
        global_link: global_block.hash,
    })
}

/// Run the anchoring protocol for an entity-embedded local chain
///
/// The caller re-serializes `local` (via [`Chain::to_json`]) into the
/// entity's storage field and stores the returned `global_link` on the
/// entity afterwards.
pub fn anchor_embedded<R: ChainStore>(
    local: &mut Chain,
    miner: &Miner,
    registry: &Ledger<R>,
    event: RegistryEvent,
    payload: Value,
) -> Result<AnchorReceipt, LedgerError> {
    let local_block = local.add_block(payload, miner)?;
    let local_root = local_block.hash;
    let global_block = registry.append(event.into_payload(&local_root))?;
    Ok(AnchorReceipt {
        local_root,
        global_link: global_block.hash,
    })
}
