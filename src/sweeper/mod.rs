pub mod executor;
pub mod handler;
pub mod ledger;
pub mod monitor;
pub mod supervisor;
pub mod token_details;

pub use executor::{SweepExecutor, SweepOutcome};
pub use handler::{HandleOutcome, IncomingTransferHandler};
pub use ledger::DeduplicationLedger;
pub use monitor::{MonitorPhase, MonitorSession, MonitorState, MonitorStatus, NetworkMonitor};
pub use supervisor::{spawn_monitors, MonitorHandle};
pub use token_details::TokenDetailsResolver;
