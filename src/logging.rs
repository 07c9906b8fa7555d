use ethers::types::{Address, H256, U256};
use log::{debug, error, info, trace, warn};
use once_cell::sync::OnceCell;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::config::LoggingConfig;
use crate::error::{ErrorSeverity, SweepError, SweeperError};

/// How `LogContext` renders its lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

static LOG_FORMAT: OnceCell<LogFormat> = OnceCell::new();

fn current_format() -> LogFormat {
    LOG_FORMAT.get().copied().unwrap_or(LogFormat::Pretty)
}

/// Structured logging context for the sweeper
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub metadata: BTreeMap<String, Value>,
}

impl LogContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn with_network(self, network: &str) -> Self {
        self.with_metadata("network", json!(network))
    }

    pub fn with_block_number(self, block_number: u64) -> Self {
        self.with_metadata("block_number", json!(block_number))
    }

    pub fn with_transaction_hash<T: serde::Serialize>(self, tx_hash: T) -> Self {
        self.with_metadata("transaction_hash", json!(tx_hash))
    }

    pub fn with_token<T: serde::Serialize>(self, token: T) -> Self {
        self.with_metadata("token", json!(token))
    }

    pub fn with_amount(self, amount: &str) -> Self {
        self.with_metadata("amount", json!(amount))
    }

    pub fn with_duration_ms(self, duration_ms: u64) -> Self {
        self.with_metadata("duration_ms", json!(duration_ms))
    }

    fn format_message(&self, level: &str, message: &str) -> String {
        match current_format() {
            LogFormat::Json => self.format_json(level, message),
            LogFormat::Pretty => self.format_pretty(message),
        }
    }

    fn format_json(&self, level: &str, message: &str) -> String {
        let mut log_entry = json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "level": level,
            "component": self.component,
            "operation": self.operation,
            "message": message,
        });

        for (key, value) in &self.metadata {
            log_entry[key] = value.clone();
        }

        log_entry.to_string()
    }

    fn format_pretty(&self, message: &str) -> String {
        let mut line = format!("[{}::{}] {}", self.component, self.operation, message);
        for (key, value) in &self.metadata {
            match value {
                Value::String(s) => line.push_str(&format!(" {}={}", key, s)),
                other => line.push_str(&format!(" {}={}", key, other)),
            }
        }
        line
    }

    pub fn info(&self, message: &str) {
        info!("{}", self.format_message("INFO", message));
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", self.format_message("WARN", message));
    }

    pub fn error(&self, message: &str) {
        error!("{}", self.format_message("ERROR", message));
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", self.format_message("DEBUG", message));
    }

    pub fn trace(&self, message: &str) {
        trace!("{}", self.format_message("TRACE", message));
    }
}

/// Error logging utilities
pub struct ErrorLogger;

impl ErrorLogger {
    pub fn log_error(error: &SweeperError, context: Option<LogContext>) {
        let severity = error.severity();

        let log_context = context
            .unwrap_or_else(|| LogContext::new("error", "unknown"))
            .with_metadata("severity", json!(format!("{:?}", severity)))
            .with_metadata("recoverable", json!(error.is_recoverable()));

        let message = format!("Error occurred: {}", error);

        match severity {
            ErrorSeverity::Critical | ErrorSeverity::High => log_context.error(&message),
            ErrorSeverity::Medium => log_context.warn(&message),
            ErrorSeverity::Low => log_context.info(&message),
        }
    }
}

/// Sweep lifecycle events
pub struct SweepLogger;

impl SweepLogger {
    pub fn log_transfer_detected(network: &str, tx_hash: H256, token: Address, amount: U256, block_number: u64) {
        let context = LogContext::new("sweep", "transfer_detected")
            .with_network(network)
            .with_transaction_hash(tx_hash)
            .with_token(token)
            .with_amount(&amount.to_string())
            .with_block_number(block_number);

        context.info(&format!("Incoming transfer of {:?} detected in block {}", token, block_number));
    }

    pub fn log_sweep_submitted(network: &str, token: Address, amount: U256, tx_hash: H256) {
        LogContext::new("sweep", "submitted")
            .with_network(network)
            .with_token(token)
            .with_amount(&amount.to_string())
            .with_transaction_hash(tx_hash)
            .debug("Sweep transaction submitted, waiting for receipt");
    }

    pub fn log_sweep_succeeded(network: &str, token: Address, symbol: &str, formatted: &str, tx_hash: H256) {
        let context = LogContext::new("sweep", "succeeded")
            .with_network(network)
            .with_token(token)
            .with_amount(formatted)
            .with_transaction_hash(tx_hash)
            .with_metadata("symbol", json!(symbol));

        context.info(&format!("Swept {} {}", formatted, symbol));
    }

    pub fn log_sweep_skipped(network: &str, token: Address, symbol: &str) {
        LogContext::new("sweep", "skipped")
            .with_network(network)
            .with_token(token)
            .with_metadata("symbol", json!(symbol))
            .info(&format!("No {} balance to sweep", symbol));
    }

    pub fn log_sweep_failed(network: &str, token: Address, error: &SweepError) {
        LogContext::new("sweep", "failed")
            .with_network(network)
            .with_token(token)
            .error(&format!("Sweep failed: {}", error));
    }

    pub fn log_blocks_checked(network: &str, from_block: u64, to_block: u64, transfer_count: usize) {
        let context = LogContext::new("monitor", "blocks_checked")
            .with_network(network)
            .with_metadata("from_block", json!(from_block))
            .with_metadata("to_block", json!(to_block))
            .with_metadata("transfer_count", json!(transfer_count));

        if transfer_count > 0 {
            context.info(&format!("Found {} incoming transfers in blocks {}..={}", transfer_count, from_block, to_block));
        } else {
            context.debug(&format!("No incoming transfers in blocks {}..={}", from_block, to_block));
        }
    }

    pub fn log_phase_change(network: &str, phase: &str) {
        LogContext::new("monitor", "phase")
            .with_network(network)
            .with_metadata("phase", json!(phase))
            .debug(&format!("Monitor is now {}", phase));
    }

    pub fn log_restart_scheduled(network: &str, delay_ms: u64, restarts: u64) {
        LogContext::new("monitor", "restart")
            .with_network(network)
            .with_metadata("delay_ms", json!(delay_ms))
            .with_metadata("restarts", json!(restarts))
            .warn(&format!("Restarting monitor in {}ms", delay_ms));
    }
}

/// Initialize logging from configuration. `RUST_LOG` still takes precedence.
pub fn init_logging(config: &LoggingConfig) -> Result<(), log::SetLoggerError> {
    let format = LogFormat::parse(&config.format).unwrap_or(LogFormat::Pretty);
    let _ = LOG_FORMAT.set(format);

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.level.as_str()),
    );

    if format == LogFormat::Json {
        // The JSON line already carries timestamp and level
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "{}", record.args())
        });
    } else {
        builder.format_timestamp_millis();
    }

    builder.try_init()
}
