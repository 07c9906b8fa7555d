use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256, U256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::blockchain::chain::ChainClient;
use crate::error::RpcError;
use crate::logging::LogContext;
use crate::models::{RawLog, TransactionReceiptSummary};

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    result: Option<Value>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogFilter {
    #[serde(rename = "fromBlock")]
    pub from_block: String,
    #[serde(rename = "toBlock")]
    pub to_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub topics: Option<Vec<Option<String>>>,
}

impl LogFilter {
    /// Inclusive block range, any contract
    pub fn for_range(from_block: u64, to_block: u64, topics: Vec<Option<String>>) -> Self {
        Self {
            from_block: format!("0x{:x}", from_block),
            to_block: format!("0x{:x}", to_block),
            address: None,
            topics: Some(topics),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EthLog {
    address: String,
    topics: Vec<String>,
    data: String,
    #[serde(rename = "blockNumber")]
    block_number: String,
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
    #[serde(rename = "logIndex")]
    log_index: String,
}

/// JSON-RPC over HTTP client for one network endpoint
#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: String,
    timeout_seconds: u64,
}

impl RpcClient {
    pub fn new(endpoint: String) -> Result<Self, RpcError> {
        Self::new_with_config(endpoint, 30)
    }

    /// RPC client with a request timeout and connection pooling
    pub fn new_with_config(endpoint: String, timeout_seconds: u64) -> Result<Self, RpcError> {
        let context = LogContext::new("rpc_client", "initialization")
            .with_metadata("endpoint", json!(endpoint))
            .with_metadata("timeout_seconds", json!(timeout_seconds));
        context.debug("Initializing RPC client");

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RpcError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout_seconds,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a request; a JSON `null` result is returned as `None`
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Option<Value>, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout { seconds: self.timeout_seconds }
                } else if e.is_connect() {
                    RpcError::Connection(e.to_string())
                } else {
                    RpcError::Http(e)
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RpcError::RateLimit { seconds: 60 });
        }
        if !status.is_success() {
            return Err(RpcError::Connection(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let rpc_response: JsonRpcResponse = response.json().await?;

        LogContext::new("rpc_client", "request")
            .with_metadata("method", json!(method))
            .with_duration_ms(started.elapsed().as_millis() as u64)
            .trace("RPC call completed");

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Method {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc_response.result.filter(|value| !value.is_null()))
    }

    async fn make_request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.request(method, params)
            .await?
            .ok_or_else(|| RpcError::InvalidResponse(format!("No result in {} response", method)))
    }

    async fn request_quantity(&self, method: &str, params: Vec<Value>) -> Result<U256, RpcError> {
        let result = self.make_request(method, params).await?;
        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} result is not a string", method)))?;
        parse_hex_to_u256(hex_string)
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        let result = self.make_request("eth_chainId", vec![]).await?;
        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("Chain id is not a string".to_string()))?;
        parse_hex_to_u64(hex_string)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let result = self.make_request("eth_blockNumber", vec![]).await?;
        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("Block number is not a string".to_string()))?;
        parse_hex_to_u64(hex_string)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError> {
        let params = vec![serde_json::to_value(filter)?];
        let result = self.make_request("eth_getLogs", params).await?;

        let eth_logs: Vec<EthLog> = serde_json::from_value(result)?;

        let mut raw_logs = Vec::with_capacity(eth_logs.len());
        for eth_log in eth_logs {
            raw_logs.push(RawLog {
                block_number: parse_hex_to_u64(&eth_log.block_number)?,
                log_index: parse_hex_to_u32(&eth_log.log_index)?,
                address: eth_log.address,
                topics: eth_log.topics,
                data: eth_log.data,
                transaction_hash: eth_log.transaction_hash,
            });
        }

        Ok(raw_logs)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let params = vec![json!({ "to": to, "data": data }), json!("latest")];
        let result = self.make_request("eth_call", params).await?;
        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("Call result is not a string".to_string()))?;
        hex_string
            .parse::<Bytes>()
            .map_err(|e| RpcError::InvalidResponse(format!("Invalid call result: {}", e)))
    }

    async fn transaction_count(&self, address: Address) -> Result<U256, RpcError> {
        self.request_quantity("eth_getTransactionCount", vec![json!(address), json!("pending")])
            .await
    }

    async fn gas_price(&self) -> Result<U256, RpcError> {
        self.request_quantity("eth_gasPrice", vec![]).await
    }

    async fn estimate_gas(&self, from: Address, to: Address, data: &Bytes) -> Result<U256, RpcError> {
        let params = vec![json!({ "from": from, "to": to, "data": data })];
        self.request_quantity("eth_estimateGas", params).await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256, RpcError> {
        let result = self.make_request("eth_sendRawTransaction", vec![json!(raw)]).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn transaction_receipt(&self, tx_hash: H256) -> Result<Option<TransactionReceiptSummary>, RpcError> {
        match self.request("eth_getTransactionReceipt", vec![json!(tx_hash)]).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

fn strip_hex_prefix(hex_str: &str) -> &str {
    hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .unwrap_or(hex_str)
}

fn parse_hex_to_u64(hex_str: &str) -> Result<u64, RpcError> {
    u64::from_str_radix(strip_hex_prefix(hex_str), 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex '{}' to u64: {}", hex_str, e)))
}

fn parse_hex_to_u32(hex_str: &str) -> Result<u32, RpcError> {
    u32::from_str_radix(strip_hex_prefix(hex_str), 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex '{}' to u32: {}", hex_str, e)))
}

pub(crate) fn parse_hex_to_u256(hex_str: &str) -> Result<U256, RpcError> {
    let digits = strip_hex_prefix(hex_str);
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex '{}' to U256: {}", hex_str, e)))
}
