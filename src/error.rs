use ethers::types::H256;
use thiserror::Error;

/// Main error type for the token sweeper
#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("ABI decoding error: {0}")]
    Abi(String),

    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),
}

/// JSON-RPC transport errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC method error: code={code}, message={message}")]
    Method { code: i32, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Rate limit exceeded, retry after {seconds} seconds")]
    RateLimit { seconds: u64 },

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("No usable network endpoint configured")]
    NoNetworks,
}

/// Signing credential errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Malformed private key: {0}")]
    MalformedKey(String),

    #[error("Transaction signing failed: {0}")]
    Signing(String),
}

/// Failures of a single sweep, by stage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    #[error("balance read failed: {0}")]
    BalanceRead(String),

    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error("confirmation failed: {0}")]
    Confirmation(String),

    #[error("transaction {tx_hash:?} reverted")]
    Reverted { tx_hash: H256 },
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Stops a monitor or the process
    Critical,
    /// Affects a single sweep
    High,
    /// Transient, usually resolved on the next tick
    Medium,
    /// Informational
    Low,
}

/// How a monitor reacts to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Chain connectivity; retried on the next tick or restart
    Transient,
    /// Aborts the current monitor start, which is restarted after a delay
    Fatal,
    /// Ends the monitor for good
    Terminal,
}

impl SweeperError {
    /// Classify the error for the monitor's restart policy
    pub fn kind(&self) -> ErrorKind {
        match self {
            SweeperError::Config(_) | SweeperError::Wallet(WalletError::MalformedKey(_)) => ErrorKind::Terminal,
            SweeperError::Rpc(_) => ErrorKind::Transient,
            SweeperError::Wallet(WalletError::Signing(_)) | SweeperError::Abi(_) | SweeperError::Sweep(_) => {
                ErrorKind::Fatal
            }
        }
    }

    /// Get the severity level of an error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SweeperError::Config(_) => ErrorSeverity::Critical,
            SweeperError::Wallet(WalletError::MalformedKey(_)) => ErrorSeverity::Critical,

            SweeperError::Sweep(_) => ErrorSeverity::High,
            SweeperError::Wallet(WalletError::Signing(_)) => ErrorSeverity::High,
            SweeperError::Rpc(RpcError::Connection(_)) => ErrorSeverity::High,

            SweeperError::Rpc(_) => ErrorSeverity::Medium,

            SweeperError::Abi(_) => ErrorSeverity::Low,
        }
    }

    /// Whether a monitor that hit this error may be started again.
    /// A bad signing key or bad configuration will fail identically on every attempt.
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::Terminal
    }
}

impl From<ethers::abi::AbiError> for SweeperError {
    fn from(err: ethers::abi::AbiError) -> Self {
        SweeperError::Abi(err.to_string())
    }
}
