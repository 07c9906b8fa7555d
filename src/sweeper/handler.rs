use std::time::Duration;
use tokio::time::sleep;

use crate::logging::SweepLogger;
use crate::models::TransferLogEntry;
use crate::sweeper::executor::{SweepExecutor, SweepOutcome};
use crate::sweeper::ledger::DeduplicationLedger;
use crate::sweeper::token_details::TokenDetailsResolver;
use crate::wallet::WalletIdentity;

#[derive(Debug, Clone, PartialEq)]
pub enum HandleOutcome {
    /// The transaction was already handled during this monitor start
    Duplicate,
    Handled(SweepOutcome),
}

/// Turns one inbound transfer into at most one sweep
#[derive(Clone)]
pub struct IncomingTransferHandler {
    resolver: TokenDetailsResolver,
    executor: SweepExecutor,
    settle_delay: Duration,
    network: String,
}

impl IncomingTransferHandler {
    pub fn new(resolver: TokenDetailsResolver, executor: SweepExecutor, settle_delay: Duration, network: &str) -> Self {
        Self {
            resolver,
            executor,
            settle_delay,
            network: network.to_string(),
        }
    }

    /// Dedup, resolve details, wait out the settling delay, then sweep.
    /// The ledger entry is written before the first await and is kept whatever the sweep result.
    pub async fn handle(
        &self,
        entry: &TransferLogEntry,
        wallet: &WalletIdentity,
        ledger: &mut DeduplicationLedger,
    ) -> HandleOutcome {
        if ledger.has_processed(&entry.transaction_hash) {
            return HandleOutcome::Duplicate;
        }
        ledger.mark_processed(entry.transaction_hash);

        SweepLogger::log_transfer_detected(
            &self.network,
            entry.transaction_hash,
            entry.token,
            entry.amount,
            entry.block_number,
        );

        let details = self.resolver.resolve(entry.token).await;
        sleep(self.settle_delay).await;

        HandleOutcome::Handled(self.executor.sweep(entry.token, &details, wallet).await)
    }
}
