use ethers::types::{Address, H256, U256, U64};
use serde::{Deserialize, Serialize};

/// An `eth_getLogs` entry with block number and log index already decoded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: u64,
    pub transaction_hash: String,
    pub log_index: u32,
}

/// An inbound ERC20 `Transfer` to the watched wallet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferLogEntry {
    pub transaction_hash: H256,
    pub token: Address,
    pub block_number: u64,
    pub log_index: u32,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

/// The parts of a transaction receipt the sweeper looks at
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceiptSummary {
    pub transaction_hash: H256,
    pub block_number: Option<U64>,
    /// 1 on success, 0 on revert; absent on pre-Byzantium chains
    pub status: Option<U64>,
}

impl TransactionReceiptSummary {
    pub fn is_mined(&self) -> bool {
        self.block_number.is_some()
    }

    pub fn is_reverted(&self) -> bool {
        self.status == Some(U64::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[test]
    fn test_raw_log_serialization() {
        let raw_log = RawLog {
            address: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string(),
            topics: vec![
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef".to_string(),
                "0x000000000000000000000000f977814e90da44bfa03b6295a0616a897441acec".to_string(),
            ],
            data: "0x00000000000000000000000000000000000000000000000000000000000003e8".to_string(),
            block_number: 54321,
            transaction_hash: "0xdef456".to_string(),
            log_index: 2,
        };

        let json = serde_json::to_string(&raw_log).expect("Failed to serialize");
        assert!(json.contains("\"block_number\":54321"));
        assert!(json.contains("\"log_index\":2"));

        let deserialized: RawLog = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(raw_log, deserialized);
    }

    #[test]
    fn test_receipt_summary_from_rpc_json() {
        let json = serde_json::json!({
            "transactionHash": "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060",
            "blockNumber": "0x10",
            "status": "0x1",
            "gasUsed": "0x5208",
            "logs": []
        });

        let receipt: TransactionReceiptSummary = serde_json::from_value(json).expect("Failed to deserialize");
        assert!(receipt.is_mined());
        assert!(!receipt.is_reverted());
        assert_eq!(receipt.block_number, Some(U64::from(16)));
    }

    #[test]
    fn test_receipt_summary_reverted_and_pending() {
        let reverted = TransactionReceiptSummary {
            transaction_hash: H256::zero(),
            block_number: Some(U64::from(5)),
            status: Some(U64::zero()),
        };
        assert!(reverted.is_reverted());

        let pending = TransactionReceiptSummary {
            transaction_hash: H256::zero(),
            block_number: None,
            status: None,
        };
        assert!(!pending.is_mined());
        assert!(!pending.is_reverted());
    }
}
