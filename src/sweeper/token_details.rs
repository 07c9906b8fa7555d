use ethers::abi::AbiError;
use ethers::types::{Address, Bytes};
use std::sync::Arc;

use crate::blockchain::erc20::{decimals_calldata, decode_string, decode_u8, name_calldata, symbol_calldata};
use crate::blockchain::ChainClient;
use crate::error::SweeperError;
use crate::logging::LogContext;
use crate::models::token::{DEFAULT_DECIMALS, DEFAULT_NAME, DEFAULT_SYMBOL};
use crate::models::TokenDetails;

/// Reads ERC20 metadata, falling back to defaults field by field
#[derive(Clone)]
pub struct TokenDetailsResolver {
    chain: Arc<dyn ChainClient>,
}

impl TokenDetailsResolver {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Query `symbol()`, `decimals()` and `name()` concurrently. Never fails.
    pub async fn resolve(&self, token: Address) -> TokenDetails {
        let (symbol, decimals, name) = tokio::join!(
            self.lookup(token, symbol_calldata(), decode_string),
            self.lookup(token, decimals_calldata(), decode_u8),
            self.lookup(token, name_calldata(), decode_string),
        );

        TokenDetails {
            symbol: or_default(token, "symbol", symbol, DEFAULT_SYMBOL.to_string()),
            decimals: or_default(token, "decimals", decimals, DEFAULT_DECIMALS),
            name: or_default(token, "name", name, DEFAULT_NAME.to_string()),
        }
    }

    async fn lookup<T>(
        &self,
        token: Address,
        calldata: Bytes,
        decode: fn(&Bytes) -> Result<T, AbiError>,
    ) -> Result<T, SweeperError> {
        let output = self.chain.call(token, calldata).await?;
        Ok(decode(&output)?)
    }
}

fn or_default<T>(token: Address, field: &str, result: Result<T, SweeperError>, default: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            LogContext::new("token_details", field)
                .with_token(token)
                .debug(&format!("Using default {}: {}", field, e));
            default
        }
    }
}
