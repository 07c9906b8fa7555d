use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "token-sweeper")]
#[command(about = "Watches EVM networks for incoming ERC20 transfers and sweeps them to a recipient")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file (defaults to $CONFIG_FILE or ./config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start one monitor per configured network (default)
    Run,
    /// Load and validate the configuration, then print a summary
    CheckConfig,
    /// Print a sample configuration file
    SampleConfig,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }

    /// Load configuration from `--config` if given, otherwise from the default locations
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        match &self.config {
            Some(path) => {
                dotenv::dotenv().ok();
                AppConfig::load_with_file(path)
            }
            None => AppConfig::load(),
        }
    }
}

/// Human-readable configuration summary. Never includes the private key.
pub fn config_summary(config: &AppConfig) -> String {
    let mut lines = vec![format!("Networks ({}):", config.networks.len())];
    for network in &config.networks {
        lines.push(format!("  {} -> {}", network.name, network.endpoint));
    }
    lines.push(format!("Recipient: {}", config.wallet.recipient));
    lines.push(format!("Custom tokens: {}", config.wallet.custom_tokens.len()));
    for token in &config.wallet.custom_tokens {
        lines.push(format!("  {}", token));
    }
    lines.push(format!(
        "Poll interval: {}ms, settle delay: {}ms, restart delay: {}ms",
        config.monitor.poll_interval_ms, config.monitor.settle_delay_ms, config.monitor.restart_delay_ms
    ));
    lines.push(format!("Logging: {} ({})", config.logging.level, config.logging.format));
    lines.join("\n")
}
