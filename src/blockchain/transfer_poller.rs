use ethers::types::{Address, H256};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::chain::ChainClient;
use crate::blockchain::erc20::{address_topic_hex, topic_to_address, TRANSFER_EVENT_SIGNATURE};
use crate::blockchain::rpc_client::{parse_hex_to_u256, LogFilter};
use crate::error::RpcError;
use crate::logging::LogContext;
use crate::models::{RawLog, TransferLogEntry};

#[derive(Error, Debug, PartialEq)]
pub enum TransferDecodeError {
    #[error("Invalid log format: {0}")]
    InvalidLog(String),
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),
}

/// Fetches inbound ERC20 transfers to one wallet, across every token contract
#[derive(Clone)]
pub struct TransferLogPoller {
    chain: Arc<dyn ChainClient>,
    network: String,
}

impl TransferLogPoller {
    pub fn new(chain: Arc<dyn ChainClient>, network: &str) -> Self {
        Self {
            chain,
            network: network.to_string(),
        }
    }

    /// Filter matching `Transfer(*, wallet, *)` on any contract
    pub fn transfer_filter(wallet: Address, from_block: u64, to_block: u64) -> LogFilter {
        LogFilter::for_range(
            from_block,
            to_block,
            vec![
                Some(TRANSFER_EVENT_SIGNATURE.to_string()),
                None,
                Some(address_topic_hex(wallet)),
            ],
        )
    }

    /// Inbound transfers in the inclusive range `[from_block, to_block]`, in log order.
    /// Logs that do not decode as an ERC20 transfer are skipped.
    pub async fn poll(
        &self,
        wallet: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferLogEntry>, RpcError> {
        let filter = Self::transfer_filter(wallet, from_block, to_block);
        let logs = self.chain.get_logs(&filter).await?;

        let mut entries = Vec::with_capacity(logs.len());
        for log in &logs {
            match decode_transfer_log(log) {
                Ok(entry) if entry.to == wallet => entries.push(entry),
                Ok(entry) => {
                    LogContext::new("transfer_poller", "decode")
                        .with_network(&self.network)
                        .with_transaction_hash(entry.transaction_hash)
                        .debug("Ignoring transfer addressed to another wallet");
                }
                Err(e) => {
                    LogContext::new("transfer_poller", "decode")
                        .with_network(&self.network)
                        .with_block_number(log.block_number)
                        .with_metadata("transaction_hash", serde_json::json!(log.transaction_hash))
                        .warn(&format!("Skipping undecodable transfer log: {}", e));
                }
            }
        }

        Ok(entries)
    }
}

/// Decode an ERC20 `Transfer` log into a [`TransferLogEntry`]
pub fn decode_transfer_log(log: &RawLog) -> Result<TransferLogEntry, TransferDecodeError> {
    // ERC-20 Transfer has exactly [signature, from, to]; ERC-721 adds the token id
    if log.topics.len() != 3 {
        return Err(TransferDecodeError::InvalidLog(format!(
            "Expected 3 topics, got {}",
            log.topics.len()
        )));
    }

    if !log.topics[0].eq_ignore_ascii_case(TRANSFER_EVENT_SIGNATURE) {
        return Err(TransferDecodeError::InvalidLog(format!(
            "Unexpected event signature {}",
            log.topics[0]
        )));
    }

    let from = topic_to_address(&log.topics[1])
        .ok_or_else(|| TransferDecodeError::InvalidAddress(log.topics[1].clone()))?;
    let to = topic_to_address(&log.topics[2])
        .ok_or_else(|| TransferDecodeError::InvalidAddress(log.topics[2].clone()))?;

    let token = Address::from_str(log.address.trim())
        .map_err(|_| TransferDecodeError::InvalidAddress(log.address.clone()))?;

    let transaction_hash = H256::from_str(log.transaction_hash.trim())
        .map_err(|_| TransferDecodeError::InvalidLog(format!("Bad transaction hash {}", log.transaction_hash)))?;

    let amount = extract_amount_from_data(&log.data)?;

    Ok(TransferLogEntry {
        transaction_hash,
        token,
        block_number: log.block_number,
        log_index: log.log_index,
        from,
        to,
        amount,
    })
}

/// Extract the amount from the data field (32-byte big-endian integer)
fn extract_amount_from_data(data: &str) -> Result<ethers::types::U256, TransferDecodeError> {
    let digits = data.trim().trim_start_matches("0x");
    if digits.len() != 64 {
        return Err(TransferDecodeError::InvalidAmount(format!(
            "Data should be 64 characters, got {}",
            digits.len()
        )));
    }
    parse_hex_to_u256(digits).map_err(|e| TransferDecodeError::InvalidAmount(e.to_string()))
}
