use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::LogContext;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub networks: Vec<NetworkConfig>,
    pub wallet: WalletConfig,
    pub monitor: MonitorConfig,
    pub rpc: RpcConfig,
    pub logging: LoggingConfig,
}

/// One monitored chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Display name, used in logs
    pub name: String,
    /// JSON-RPC HTTP endpoint
    pub endpoint: String,
}

/// Signing key, sweep destination and startup token list
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Hex private key shared by every network
    pub private_key: String,
    /// Address that receives swept balances
    pub recipient: String,
    /// Tokens swept once when a monitor starts
    pub custom_tokens: Vec<String>,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &if self.private_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("recipient", &self.recipient)
            .field("custom_tokens", &self.custom_tokens)
            .finish()
    }
}

/// Monitor timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Block polling cadence in milliseconds
    pub poll_interval_ms: u64,
    /// Wait between detecting a transfer and sweeping it, in milliseconds
    pub settle_delay_ms: u64,
    /// Wait before restarting a monitor after a startup failure, in milliseconds
    pub restart_delay_ms: u64,
    /// Receipt polling cadence while waiting for a sweep to be mined, in milliseconds
    pub receipt_poll_interval_ms: u64,
}

/// RPC client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 15_000,
            settle_delay_ms: 60_000,
            restart_delay_ms: 30_000,
            receipt_poll_interval_ms: 3_000,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl WalletConfig {
    /// Parsed recipient address
    pub fn recipient_address(&self) -> Result<Address, ConfigError> {
        parse_address("wallet.recipient", &self.recipient)
    }

    /// Parsed startup token list, in configured order
    pub fn custom_token_addresses(&self) -> Result<Vec<Address>, ConfigError> {
        self.custom_tokens
            .iter()
            .map(|token| parse_address("wallet.custom_tokens", token))
            .collect()
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the TOML file and environment variables.
    /// Environment variables take precedence over file values.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let config_path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_with_file(&config_path)
    }

    /// Same as [`AppConfig::load`] with an explicit config file path
    pub fn load_with_file(config_path: &str) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(config_path)?;
        config.apply_env_overrides()?;
        config.retain_usable_networks();
        config.filter_custom_tokens();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load_from_file(config_path: &str) -> Result<Self, ConfigError> {
        if !Path::new(config_path).exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .map_err(|_| ConfigError::FileNotFound(config_path.to_string()))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parsing(e.to_string()))?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(private_key) = env::var("PRIVATE_KEY") {
            self.wallet.private_key = private_key;
        }
        if let Ok(recipient) = env::var("RECIPIENT_ADDRESS") {
            self.wallet.recipient = recipient;
        }
        if let Ok(tokens) = env::var("CUSTOM_TOKENS") {
            self.wallet.custom_tokens = tokens
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Ok(urls) = env::var("RPC_URLS") {
            self.networks = parse_rpc_urls(&urls)?;
        }

        if let Ok(interval) = env::var("POLL_INTERVAL_MS") {
            self.monitor.poll_interval_ms = parse_env("POLL_INTERVAL_MS", interval)?;
        }
        if let Ok(delay) = env::var("SETTLE_DELAY_MS") {
            self.monitor.settle_delay_ms = parse_env("SETTLE_DELAY_MS", delay)?;
        }
        if let Ok(delay) = env::var("RESTART_DELAY_MS") {
            self.monitor.restart_delay_ms = parse_env("RESTART_DELAY_MS", delay)?;
        }
        if let Ok(interval) = env::var("RECEIPT_POLL_INTERVAL_MS") {
            self.monitor.receipt_poll_interval_ms = parse_env("RECEIPT_POLL_INTERVAL_MS", interval)?;
        }
        if let Ok(timeout) = env::var("RPC_TIMEOUT_SECONDS") {
            self.rpc.timeout_seconds = parse_env("RPC_TIMEOUT_SECONDS", timeout)?;
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Drop networks without an endpoint
    pub fn retain_usable_networks(&mut self) {
        self.networks.retain(|network| {
            let usable = !network.endpoint.trim().is_empty();
            if !usable {
                LogContext::new("config", "networks")
                    .with_network(&network.name)
                    .warn("Skipping network without an RPC endpoint");
            }
            usable
        });
    }

    /// Keep only well-formed token addresses in the startup list
    pub fn filter_custom_tokens(&mut self) {
        let (valid, invalid): (Vec<String>, Vec<String>) = self
            .wallet
            .custom_tokens
            .drain(..)
            .map(|t| t.trim().to_string())
            .partition(|t| is_token_address(t));

        for token in invalid {
            LogContext::new("config", "custom_tokens")
                .with_metadata("value", serde_json::json!(token))
                .warn("Ignoring malformed token address");
        }
        self.wallet.custom_tokens = valid;
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wallet.private_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("PRIVATE_KEY".to_string()));
        }

        if self.wallet.recipient.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("RECIPIENT_ADDRESS".to_string()));
        }
        self.wallet.recipient_address()?;

        if self.networks.is_empty() {
            return Err(ConfigError::NoNetworks);
        }

        for network in &self.networks {
            if !network.endpoint.starts_with("http://") && !network.endpoint.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(network.endpoint.clone()));
            }
            if network.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "networks.name".to_string(),
                    value: network.endpoint.clone(),
                });
            }
        }

        let intervals = [
            ("monitor.poll_interval_ms", self.monitor.poll_interval_ms),
            ("monitor.receipt_poll_interval_ms", self.monitor.receipt_poll_interval_ms),
            ("rpc.timeout_seconds", self.rpc.timeout_seconds),
        ];
        for (key, value) in intervals {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: self.logging.format.clone(),
            });
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        let mut config = Self::default();
        config.networks = vec![NetworkConfig {
            name: "ethereum".to_string(),
            endpoint: "https://eth.llamarpc.com".to_string(),
        }];
        config.wallet.recipient = format!("{:?}", Address::zero());
        toml::to_string_pretty(&config).map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}

/// Parse `name=url,name=url` into network entries. Entries with an empty URL
/// are kept here and dropped by [`AppConfig::retain_usable_networks`].
pub fn parse_rpc_urls(raw: &str) -> Result<Vec<NetworkConfig>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, endpoint) = entry.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
                key: "RPC_URLS".to_string(),
                value: entry.to_string(),
            })?;
            Ok(NetworkConfig {
                name: name.trim().to_string(),
                endpoint: endpoint.trim().to_string(),
            })
        })
        .collect()
}

/// `0x` followed by 40 hex digits, case-insensitive
pub fn is_token_address(value: &str) -> bool {
    value.len() == 42
        && (value.starts_with("0x") || value.starts_with("0X"))
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn parse_address(key: &str, value: &str) -> Result<Address, ConfigError> {
    let value = value.trim();
    if !is_token_address(value) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Address::from_str(&value[2..]).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_env<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}
