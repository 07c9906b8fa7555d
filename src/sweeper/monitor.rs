use ethers::types::Address;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

use crate::blockchain::{ChainClient, TransferLogPoller};
use crate::config::{MonitorConfig, WalletConfig};
use crate::error::{ConfigError, ErrorKind, SweeperError};
use crate::logging::{ErrorLogger, LogContext, SweepLogger};
use crate::sweeper::executor::{SweepExecutor, SweepOutcome};
use crate::sweeper::handler::{HandleOutcome, IncomingTransferHandler};
use crate::sweeper::ledger::DeduplicationLedger;
use crate::sweeper::token_details::TokenDetailsResolver;
use crate::wallet::WalletIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorPhase {
    Starting,
    Monitoring,
    FatalError,
    Restarting,
    Stopped,
}

impl MonitorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorPhase::Starting => "starting",
            MonitorPhase::Monitoring => "monitoring",
            MonitorPhase::FatalError => "fatal_error",
            MonitorPhase::Restarting => "restarting",
            MonitorPhase::Stopped => "stopped",
        }
    }
}

/// Per-start state, owned by the polling loop
#[derive(Debug, Default)]
pub struct MonitorState {
    /// Highest block whose logs have been fully handled
    pub last_checked_block: u64,
    pub ledger: DeduplicationLedger,
    pub sweeps_succeeded: u64,
    pub sweeps_skipped: u64,
    pub sweeps_failed: u64,
}

impl MonitorState {
    pub fn new(checkpoint: u64) -> Self {
        Self {
            last_checked_block: checkpoint,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &SweepOutcome) {
        match outcome {
            SweepOutcome::Swept { .. } => self.sweeps_succeeded += 1,
            SweepOutcome::Skipped { .. } => self.sweeps_skipped += 1,
            SweepOutcome::Failed { .. } => self.sweeps_failed += 1,
        }
    }
}

/// Snapshot published after every phase change and every tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub network: String,
    pub phase: MonitorPhase,
    pub last_checked_block: Option<u64>,
    pub processed_transactions: usize,
    pub sweeps_succeeded: u64,
    pub sweeps_skipped: u64,
    pub sweeps_failed: u64,
    pub restarts: u64,
}

impl MonitorStatus {
    fn new(network: &str) -> Self {
        Self {
            network: network.to_string(),
            phase: MonitorPhase::Starting,
            last_checked_block: None,
            processed_transactions: 0,
            sweeps_succeeded: 0,
            sweeps_skipped: 0,
            sweeps_failed: 0,
            restarts: 0,
        }
    }
}

/// A started monitor: the chain-bound wallet plus fresh state
pub struct MonitorSession {
    pub wallet: WalletIdentity,
    pub state: MonitorState,
}

/// Supervises one network: startup sweep, block polling and restarts
pub struct NetworkMonitor {
    network: String,
    chain: Arc<dyn ChainClient>,
    private_key: String,
    custom_tokens: Vec<Address>,
    config: MonitorConfig,
    poller: TransferLogPoller,
    resolver: TokenDetailsResolver,
    executor: SweepExecutor,
    handler: IncomingTransferHandler,
    status: watch::Sender<MonitorStatus>,
    pub shutdown_signal: Arc<AtomicBool>,
}

impl NetworkMonitor {
    pub fn new(
        network: &str,
        chain: Arc<dyn ChainClient>,
        wallet: &WalletConfig,
        config: MonitorConfig,
    ) -> Result<Self, ConfigError> {
        let recipient = wallet.recipient_address()?;
        let custom_tokens = wallet.custom_token_addresses()?;

        let poller = TransferLogPoller::new(Arc::clone(&chain), network);
        let resolver = TokenDetailsResolver::new(Arc::clone(&chain));
        let executor = SweepExecutor::new(Arc::clone(&chain), recipient, config.receipt_poll_interval(), network);
        let handler = IncomingTransferHandler::new(resolver.clone(), executor.clone(), config.settle_delay(), network);
        let (status, _) = watch::channel(MonitorStatus::new(network));

        Ok(Self {
            network: network.to_string(),
            chain,
            private_key: wallet.private_key.clone(),
            custom_tokens,
            config,
            poller,
            resolver,
            executor,
            handler,
            status,
            shutdown_signal: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Share a shutdown flag with other monitors
    pub fn with_shutdown_signal(mut self, shutdown_signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = shutdown_signal;
        self
    }

    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.subscribe()
    }

    /// Derive and bind the wallet, take the checkpoint and sweep the custom token list
    pub async fn start(&self) -> Result<MonitorSession, SweeperError> {
        self.set_phase(MonitorPhase::Starting);

        let wallet = WalletIdentity::from_private_key(&self.private_key)?;
        let chain_id = self.chain.chain_id().await?;
        let wallet = wallet.bind_to_chain(chain_id);

        let checkpoint = self.chain.block_number().await?;
        let mut state = MonitorState::new(checkpoint);

        LogContext::new("monitor", "start")
            .with_network(&self.network)
            .with_metadata("chain_id", json!(chain_id))
            .with_metadata("wallet", json!(wallet.address()))
            .with_block_number(checkpoint)
            .info("Monitor connected");

        if !self.custom_tokens.is_empty() {
            self.sweep_custom_tokens(&wallet, &mut state).await;
        }

        self.publish(&state);
        self.set_phase(MonitorPhase::Monitoring);
        Ok(MonitorSession { wallet, state })
    }

    /// One pass over the startup token list, in configured order. The ledger is not consulted.
    async fn sweep_custom_tokens(&self, wallet: &WalletIdentity, state: &mut MonitorState) {
        LogContext::new("monitor", "custom_tokens")
            .with_network(&self.network)
            .with_metadata("count", json!(self.custom_tokens.len()))
            .info("Sweeping custom token list");

        for token in &self.custom_tokens {
            let details = self.resolver.resolve(*token).await;
            let outcome = self.executor.sweep(*token, &details, wallet).await;
            state.record(&outcome);
        }
    }

    /// Handle every inbound transfer in `(checkpoint, current]`, then advance the checkpoint.
    /// On error the checkpoint is left untouched. Returns the number of log entries seen.
    pub async fn poll_once(&self, session: &mut MonitorSession) -> Result<usize, SweeperError> {
        let current = self.chain.block_number().await?;
        let checkpoint = session.state.last_checked_block;
        if current <= checkpoint {
            return Ok(0);
        }

        let from_block = checkpoint + 1;
        let entries = self.poller.poll(session.wallet.address(), from_block, current).await?;

        for entry in &entries {
            match self
                .handler
                .handle(entry, &session.wallet, &mut session.state.ledger)
                .await
            {
                HandleOutcome::Duplicate => {
                    LogContext::new("monitor", "dedup")
                        .with_network(&self.network)
                        .with_transaction_hash(entry.transaction_hash)
                        .debug("Transaction already handled");
                }
                HandleOutcome::Handled(outcome) => session.state.record(&outcome),
            }
        }

        session.state.last_checked_block = current;
        SweepLogger::log_blocks_checked(&self.network, from_block, current, entries.len());
        Ok(entries.len())
    }

    /// Run until shutdown or a terminal error, restarting after startup failures.
    /// Returns the final phase.
    pub async fn run(self) -> MonitorPhase {
        loop {
            if self.is_shutting_down() {
                break;
            }

            match self.start().await {
                Ok(session) => {
                    self.monitor(session).await;
                    break;
                }
                Err(e) => {
                    self.set_phase(MonitorPhase::FatalError);
                    ErrorLogger::log_error(
                        &e,
                        Some(LogContext::new("monitor", "start").with_network(&self.network)),
                    );

                    if e.kind() == ErrorKind::Terminal {
                        LogContext::new("monitor", "stop")
                            .with_network(&self.network)
                            .error("Monitor stopped permanently");
                        break;
                    }

                    let restarts = self.status.borrow().restarts + 1;
                    self.status.send_modify(|status| {
                        status.restarts = restarts;
                        status.last_checked_block = None;
                        status.processed_transactions = 0;
                        status.sweeps_succeeded = 0;
                        status.sweeps_skipped = 0;
                        status.sweeps_failed = 0;
                    });
                    self.set_phase(MonitorPhase::Restarting);
                    SweepLogger::log_restart_scheduled(&self.network, self.config.restart_delay_ms, restarts);
                    sleep(self.config.restart_delay()).await;
                }
            }
        }

        self.set_phase(MonitorPhase::Stopped);
        MonitorPhase::Stopped
    }

    /// Polling loop. A tick's batch is drained before the next tick is taken.
    async fn monitor(&self, mut session: MonitorSession) {
        let poll_interval = self.config.poll_interval();
        let mut ticker = interval_at(Instant::now() + poll_interval, poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if self.is_shutting_down() {
                LogContext::new("monitor", "shutdown")
                    .with_network(&self.network)
                    .with_block_number(session.state.last_checked_block)
                    .info("Shutdown signal received, stopping monitor");
                return;
            }

            let result = self.poll_once(&mut session).await;
            self.publish(&session.state);

            match result {
                Ok(0) => {}
                Ok(_) => {
                    LogContext::new("monitor", "status")
                        .with_network(&self.network)
                        .with_metadata("status", json!(self.status()))
                        .info("Monitor status");
                }
                Err(e) => {
                    LogContext::new("monitor", "tick")
                        .with_network(&self.network)
                        .with_block_number(session.state.last_checked_block)
                        .debug(&format!("Polling tick failed: {}", e));
                }
            }
        }
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown_signal.load(Ordering::Relaxed)
    }

    fn set_phase(&self, phase: MonitorPhase) {
        self.status.send_modify(|status| status.phase = phase);
        SweepLogger::log_phase_change(&self.network, phase.as_str());
    }

    fn publish(&self, state: &MonitorState) {
        self.status.send_modify(|status| {
            status.last_checked_block = Some(state.last_checked_block);
            status.processed_transactions = state.ledger.len();
            status.sweeps_succeeded = state.sweeps_succeeded;
            status.sweeps_skipped = state.sweeps_skipped;
            status.sweeps_failed = state.sweeps_failed;
        });
    }
}
