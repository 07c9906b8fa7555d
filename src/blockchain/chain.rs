use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256, U256};

use crate::blockchain::rpc_client::LogFilter;
use crate::error::RpcError;
use crate::models::{RawLog, TransactionReceiptSummary};

/// Everything the sweeper needs from a chain connection.
///
/// `RpcClient` is the production implementation; tests substitute an in-memory chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, RpcError>;

    async fn block_number(&self) -> Result<u64, RpcError>;

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError>;

    /// `eth_call` against the latest block
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError>;

    /// Pending nonce for `address`
    async fn transaction_count(&self, address: Address) -> Result<U256, RpcError>;

    async fn gas_price(&self) -> Result<U256, RpcError>;

    async fn estimate_gas(&self, from: Address, to: Address, data: &Bytes) -> Result<U256, RpcError>;

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256, RpcError>;

    /// `None` while the transaction is still pending
    async fn transaction_receipt(&self, tx_hash: H256) -> Result<Option<TransactionReceiptSummary>, RpcError>;
}
