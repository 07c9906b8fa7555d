use ethers::types::H256;
use std::collections::HashSet;

/// Transaction ids already handed to the sweep path during one monitor start.
/// Lives in memory only; a restart begins with an empty ledger.
#[derive(Debug, Default)]
pub struct DeduplicationLedger {
    processed: HashSet<H256>,
}

impl DeduplicationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_processed(&self, tx_hash: &H256) -> bool {
        self.processed.contains(tx_hash)
    }

    /// Record `tx_hash`; returns `false` if it was already recorded
    pub fn mark_processed(&mut self, tx_hash: H256) -> bool {
        self.processed.insert(tx_hash)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}
