use ethers::types::{Address, TransactionRequest, H256, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::blockchain::erc20::{balance_of_calldata, decode_uint, transfer_calldata};
use crate::blockchain::ChainClient;
use crate::error::{SweepError, SweeperError};
use crate::logging::SweepLogger;
use crate::models::{TokenDetails, TransactionReceiptSummary};
use crate::wallet::WalletIdentity;

/// Result of one sweep attempt. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    Swept {
        token: Address,
        amount: U256,
        formatted: String,
        tx_hash: H256,
        block_number: Option<u64>,
    },
    /// Nothing to move; no transaction was sent
    Skipped { token: Address },
    Failed { token: Address, error: SweepError },
}

/// Moves a wallet's whole balance of one token to the recipient
#[derive(Clone)]
pub struct SweepExecutor {
    chain: Arc<dyn ChainClient>,
    recipient: Address,
    receipt_poll_interval: Duration,
    network: String,
}

impl SweepExecutor {
    pub fn new(chain: Arc<dyn ChainClient>, recipient: Address, receipt_poll_interval: Duration, network: &str) -> Self {
        Self {
            chain,
            recipient,
            receipt_poll_interval,
            network: network.to_string(),
        }
    }

    pub async fn sweep(&self, token: Address, details: &TokenDetails, wallet: &WalletIdentity) -> SweepOutcome {
        let balance = match self.balance_of(token, wallet.address()).await {
            Ok(balance) => balance,
            Err(e) => return self.failed(token, SweepError::BalanceRead(e.to_string())),
        };

        if balance.is_zero() {
            SweepLogger::log_sweep_skipped(&self.network, token, &details.symbol);
            return SweepOutcome::Skipped { token };
        }

        let tx_hash = match self.submit(token, balance, wallet).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return self.failed(token, SweepError::Submission(e.to_string())),
        };
        SweepLogger::log_sweep_submitted(&self.network, token, balance, tx_hash);

        let receipt = match self.wait_for_receipt(tx_hash).await {
            Ok(receipt) => receipt,
            Err(e) => return self.failed(token, SweepError::Confirmation(e.to_string())),
        };
        if receipt.is_reverted() {
            return self.failed(token, SweepError::Reverted { tx_hash });
        }

        let formatted = details.format_amount(balance);
        SweepLogger::log_sweep_succeeded(&self.network, token, &details.symbol, &formatted, tx_hash);

        SweepOutcome::Swept {
            token,
            amount: balance,
            formatted,
            tx_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
        }
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, SweeperError> {
        let output = self.chain.call(token, balance_of_calldata(owner)).await?;
        Ok(decode_uint(&output)?)
    }

    /// Build, sign and broadcast `transfer(recipient, amount)`
    async fn submit(&self, token: Address, amount: U256, wallet: &WalletIdentity) -> Result<H256, SweeperError> {
        let from = wallet.address();
        let data = transfer_calldata(self.recipient, amount);

        let nonce = self.chain.transaction_count(from).await?;
        let gas_price = self.chain.gas_price().await?;
        let gas = self.chain.estimate_gas(from, token, &data).await?;

        let tx = TransactionRequest::new()
            .from(from)
            .to(token)
            .data(data)
            .nonce(nonce)
            .gas(gas)
            .gas_price(gas_price)
            .chain_id(wallet.chain_id());

        let raw = wallet.sign_transaction(tx.into()).await?;
        Ok(self.chain.send_raw_transaction(raw).await?)
    }

    /// Poll until the transaction is mined. There is no upper bound on the wait.
    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceiptSummary, SweeperError> {
        loop {
            if let Some(receipt) = self.chain.transaction_receipt(tx_hash).await? {
                if receipt.is_mined() {
                    return Ok(receipt);
                }
            }
            sleep(self.receipt_poll_interval).await;
        }
    }

    fn failed(&self, token: Address, error: SweepError) -> SweepOutcome {
        SweepLogger::log_sweep_failed(&self.network, token, &error);
        SweepOutcome::Failed { token, error }
    }
}
