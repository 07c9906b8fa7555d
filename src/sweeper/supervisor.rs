use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::blockchain::ChainClient;
use crate::config::{AppConfig, NetworkConfig};
use crate::error::{ConfigError, RpcError, SweeperError};
use crate::logging::{ErrorLogger, LogContext};
use crate::sweeper::monitor::{MonitorPhase, NetworkMonitor};

/// A spawned per-network monitor task
pub struct MonitorHandle {
    pub network: String,
    pub task: JoinHandle<MonitorPhase>,
}

/// Spawn one monitor per network that `connect` can reach.
/// Networks whose connection cannot be built are logged and skipped; if none remain
/// the result is [`ConfigError::NoNetworks`].
pub fn spawn_monitors<F>(
    config: &AppConfig,
    shutdown_signal: &Arc<AtomicBool>,
    connect: F,
) -> Result<Vec<MonitorHandle>, ConfigError>
where
    F: Fn(&NetworkConfig) -> Result<Arc<dyn ChainClient>, RpcError>,
{
    let mut monitors = Vec::with_capacity(config.networks.len());

    for network in &config.networks {
        let chain = match connect(network) {
            Ok(chain) => chain,
            Err(e) => {
                ErrorLogger::log_error(
                    &SweeperError::Rpc(e),
                    Some(LogContext::new("supervisor", "connect").with_network(&network.name)),
                );
                continue;
            }
        };

        let monitor = NetworkMonitor::new(&network.name, chain, &config.wallet, config.monitor.clone())?
            .with_shutdown_signal(Arc::clone(shutdown_signal));

        monitors.push(MonitorHandle {
            network: network.name.clone(),
            task: tokio::spawn(monitor.run()),
        });
    }

    if monitors.is_empty() {
        return Err(ConfigError::NoNetworks);
    }
    Ok(monitors)
}
