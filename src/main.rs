use clap::Parser;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use token_sweeper::cli::{config_summary, Cli, Commands};
use token_sweeper::config::AppConfig;
use token_sweeper::logging::{init_logging, LogContext};
use token_sweeper::sweeper::{spawn_monitors, MonitorHandle};
use token_sweeper::{ChainClient, RpcClient};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command() {
        Commands::SampleConfig => match AppConfig::generate_sample_config() {
            Ok(sample) => print!("{}", sample),
            Err(e) => {
                eprintln!("Failed to render sample configuration: {}", e);
                std::process::exit(1);
            }
        },
        Commands::CheckConfig => {
            let config = load_config_or_exit(&cli);
            println!("Configuration OK");
            println!("{}", config_summary(&config));
        }
        Commands::Run => {
            let config = load_config_or_exit(&cli);
            run(config).await;
        }
    }
}

fn load_config_or_exit(cli: &Cli) -> AppConfig {
    match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(config: AppConfig) {
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    LogContext::new("main", "startup")
        .with_metadata("networks", json!(config.networks.iter().map(|n| &n.name).collect::<Vec<_>>()))
        .with_metadata("custom_tokens", json!(config.wallet.custom_tokens.len()))
        .info("Starting token sweeper");

    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let monitors = match spawn_monitors(&config, &shutdown_signal, |network| {
        let client = RpcClient::new_with_config(network.endpoint.clone(), config.rpc.timeout_seconds)?;
        Ok(Arc::new(client) as Arc<dyn ChainClient>)
    }) {
        Ok(monitors) => monitors,
        Err(e) => {
            LogContext::new("main", "startup").error(&format!("Failed to start monitors: {}", e));
            std::process::exit(1);
        }
    };

    match signal::ctrl_c().await {
        Ok(()) => LogContext::new("main", "shutdown").info("Received shutdown signal"),
        Err(e) => LogContext::new("main", "shutdown").error(&format!("Unable to listen for shutdown signal: {}", e)),
    }
    shutdown_signal.store(true, Ordering::Relaxed);

    // Monitors notice the flag on their next tick; in-flight sweeps are not interrupted
    let grace = config.monitor.poll_interval() + Duration::from_secs(5);
    for MonitorHandle { network, task } in monitors {
        let abort = task.abort_handle();
        match tokio::time::timeout(grace, task).await {
            Ok(Ok(phase)) => LogContext::new("main", "shutdown")
                .with_network(&network)
                .debug(&format!("Monitor finished in phase {}", phase.as_str())),
            Ok(Err(e)) => LogContext::new("main", "shutdown")
                .with_network(&network)
                .error(&format!("Monitor task failed: {}", e)),
            Err(_) => {
                abort.abort();
                LogContext::new("main", "shutdown")
                    .with_network(&network)
                    .warn("Monitor did not stop in time, aborting");
            }
        }
    }

    LogContext::new("main", "shutdown").info("Token sweeper stopped");
}
