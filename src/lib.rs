pub mod blockchain;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod sweeper;
pub mod wallet;

pub use blockchain::{ChainClient, RpcClient};
pub use config::{AppConfig, LoggingConfig, MonitorConfig, NetworkConfig, RpcConfig, WalletConfig};
pub use error::{ErrorKind, SweeperError};
pub use logging::{ErrorLogger, LogContext, SweepLogger};
pub use sweeper::{MonitorPhase, MonitorStatus, NetworkMonitor, SweepOutcome};
pub use wallet::WalletIdentity;
