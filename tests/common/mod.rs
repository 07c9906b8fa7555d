#![allow(dead_code)]

use async_trait::async_trait;
use ethers::abi::AbiEncode;
use ethers::types::{Address, Bytes, H256, U256, U64};
use ethers::utils::keccak256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

use token_sweeper::blockchain::erc20::{address_topic_hex, TRANSFER_EVENT_SIGNATURE};
use token_sweeper::blockchain::{ChainClient, LogFilter};
use token_sweeper::config::{MonitorConfig, WalletConfig};
use token_sweeper::error::RpcError;
use token_sweeper::models::{RawLog, TransactionReceiptSummary};
use token_sweeper::sweeper::MonitorStatus;
use token_sweeper::WalletIdentity;

pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const RECIPIENT: &str = "0x1234567890123456789012345678901234567890";
pub const SENDER_TOPIC: &str = "0x000000000000000000000000f977814e90da44bfa03b6295a0616a897441acec";

const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
const SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];
const DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];
const NAME: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];

/// In-memory chain. Token metadata that was not registered reverts.
pub struct MockChain {
    pub chain_id: u64,
    pub chain_id_failures: AtomicU32,
    pub chain_id_calls: AtomicU32,
    pub block_number: AtomicU64,
    pub fail_block_number: AtomicBool,
    pub fail_logs: AtomicBool,
    pub fail_send: AtomicBool,
    pub revert_sweeps: AtomicBool,
    /// Receipt lookups that report the transaction as still pending
    pub pending_receipt_polls: AtomicU32,
    pub receipt_polls: AtomicU32,
    pub logs: Mutex<Vec<RawLog>>,
    pub log_queries: Mutex<Vec<LogFilter>>,
    pub balances: Mutex<HashMap<Address, U256>>,
    pub symbols: Mutex<HashMap<Address, String>>,
    pub decimals: Mutex<HashMap<Address, u8>>,
    pub names: Mutex<HashMap<Address, String>>,
    pub estimates: Mutex<Vec<(Address, Address, Bytes)>>,
    pub sent: Mutex<Vec<Bytes>>,
}

impl MockChain {
    pub fn new(chain_id: u64, block_number: u64) -> Self {
        Self {
            chain_id,
            chain_id_failures: AtomicU32::new(0),
            chain_id_calls: AtomicU32::new(0),
            block_number: AtomicU64::new(block_number),
            fail_block_number: AtomicBool::new(false),
            fail_logs: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            revert_sweeps: AtomicBool::new(false),
            pending_receipt_polls: AtomicU32::new(0),
            receipt_polls: AtomicU32::new(0),
            logs: Mutex::new(Vec::new()),
            log_queries: Mutex::new(Vec::new()),
            balances: Mutex::new(HashMap::new()),
            symbols: Mutex::new(HashMap::new()),
            decimals: Mutex::new(HashMap::new()),
            names: Mutex::new(HashMap::new()),
            estimates: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Register a token with full metadata and the wallet's balance
    pub fn add_token(&self, token: Address, symbol: &str, decimals: u8, balance: u64) {
        self.symbols.lock().unwrap().insert(token, symbol.to_string());
        self.decimals.lock().unwrap().insert(token, decimals);
        self.names.lock().unwrap().insert(token, format!("{} Token", symbol));
        self.set_balance(token, balance);
    }

    pub fn set_balance(&self, token: Address, balance: u64) {
        self.balances.lock().unwrap().insert(token, U256::from(balance));
    }

    pub fn set_block_number(&self, block_number: u64) {
        self.block_number.store(block_number, Ordering::SeqCst);
    }

    pub fn push_log(&self, log: RawLog) {
        self.logs.lock().unwrap().push(log);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn log_query_count(&self) -> usize {
        self.log_queries.lock().unwrap().len()
    }
}

fn parse_block(hex: &str) -> u64 {
    u64::from_str_radix(hex.trim_start_matches("0x"), 16).unwrap()
}

fn reverted() -> RpcError {
    RpcError::Method {
        code: 3,
        message: "execution reverted".to_string(),
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.chain_id_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.chain_id_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RpcError::Connection("connection refused".to_string()));
        }
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        if self.fail_block_number.load(Ordering::SeqCst) {
            return Err(RpcError::Timeout { seconds: 30 });
        }
        Ok(self.block_number.load(Ordering::SeqCst))
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError> {
        self.log_queries.lock().unwrap().push(filter.clone());
        if self.fail_logs.load(Ordering::SeqCst) {
            return Err(RpcError::Method {
                code: -32005,
                message: "query returned more than 10000 results".to_string(),
            });
        }

        let from = parse_block(&filter.from_block);
        let to = parse_block(&filter.to_block);
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.block_number >= from && log.block_number <= to)
            .cloned()
            .collect())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let selector: [u8; 4] = data[..4].try_into().unwrap();
        let encoded = match selector {
            BALANCE_OF => {
                let balance = self.balances.lock().unwrap().get(&to).copied().unwrap_or_default();
                balance.encode()
            }
            SYMBOL => self.symbols.lock().unwrap().get(&to).cloned().ok_or_else(reverted)?.encode(),
            NAME => self.names.lock().unwrap().get(&to).cloned().ok_or_else(reverted)?.encode(),
            DECIMALS => {
                let decimals = self.decimals.lock().unwrap().get(&to).copied().ok_or_else(reverted)?;
                U256::from(decimals).encode()
            }
            _ => return Err(reverted()),
        };
        Ok(Bytes::from(encoded))
    }

    async fn transaction_count(&self, _address: Address) -> Result<U256, RpcError> {
        Ok(U256::from(self.sent.lock().unwrap().len()))
    }

    async fn gas_price(&self) -> Result<U256, RpcError> {
        Ok(U256::from(1_000_000_000u64))
    }

    async fn estimate_gas(&self, from: Address, to: Address, data: &Bytes) -> Result<U256, RpcError> {
        self.estimates.lock().unwrap().push((from, to, data.clone()));
        Ok(U256::from(60_000u64))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256, RpcError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(RpcError::Method {
                code: -32000,
                message: "insufficient funds for gas".to_string(),
            });
        }

        // The swept token is the target of the matching gas estimate
        if let Some((_, token, _)) = self.estimates.lock().unwrap().last() {
            self.balances.lock().unwrap().insert(*token, U256::zero());
        }

        let tx_hash = H256::from(keccak256(&raw));
        self.sent.lock().unwrap().push(raw);
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: H256) -> Result<Option<TransactionReceiptSummary>, RpcError> {
        self.receipt_polls.fetch_add(1, Ordering::SeqCst);
        let pending = self.pending_receipt_polls.load(Ordering::SeqCst);
        if pending > 0 {
            self.pending_receipt_polls.store(pending - 1, Ordering::SeqCst);
            return Ok(None);
        }

        let status = if self.revert_sweeps.load(Ordering::SeqCst) { 0u64 } else { 1u64 };
        Ok(Some(TransactionReceiptSummary {
            transaction_hash: tx_hash,
            block_number: Some(U64::from(self.block_number.load(Ordering::SeqCst) + 1)),
            status: Some(U64::from(status)),
        }))
    }
}

pub fn wallet_address() -> Address {
    WalletIdentity::from_private_key(TEST_KEY).unwrap().address()
}

pub fn recipient() -> Address {
    RECIPIENT.parse().unwrap()
}

pub fn token(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn tx_hash(byte: u8) -> H256 {
    H256::repeat_byte(byte)
}

/// An ERC20 transfer of `amount` into the test wallet
pub fn transfer_log(token: Address, tx: H256, block_number: u64, log_index: u32, amount: u64) -> RawLog {
    RawLog {
        address: format!("{:?}", token),
        topics: vec![
            TRANSFER_EVENT_SIGNATURE.to_string(),
            SENDER_TOPIC.to_string(),
            address_topic_hex(wallet_address()),
        ],
        data: format!("0x{:064x}", amount),
        block_number,
        transaction_hash: format!("{:?}", tx),
        log_index,
    }
}

pub fn wallet_config(custom_tokens: Vec<Address>) -> WalletConfig {
    WalletConfig {
        private_key: TEST_KEY.to_string(),
        recipient: RECIPIENT.to_string(),
        custom_tokens: custom_tokens.iter().map(|t| format!("{:?}", t)).collect(),
    }
}

pub fn fast_monitor_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval_ms: 10,
        settle_delay_ms: 0,
        restart_delay_ms: 20,
        receipt_poll_interval_ms: 1,
    }
}

/// Wait until the published status satisfies `predicate`
pub async fn wait_for_status<F>(rx: &mut watch::Receiver<MonitorStatus>, predicate: F) -> MonitorStatus
where
    F: Fn(&MonitorStatus) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            let status = rx.borrow_and_update().clone();
            if predicate(&status) {
                return status;
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    })
    .await
    .expect("monitor status was not reached in time")
}
