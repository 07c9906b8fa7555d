pub mod chain;
pub mod erc20;
pub mod rpc_client;
pub mod transfer_poller;

pub use chain::ChainClient;
pub use rpc_client::{LogFilter, RpcClient};
pub use transfer_poller::{decode_transfer_log, TransferDecodeError, TransferLogPoller};
