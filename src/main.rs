//! appflow collector.
//!
//! Receives HTTP flow datagrams over UDP, decodes them and logs one
//! structured event per record.
//!
//! ```text
//!   instrumented app ──UDP──▶ Collector::run ──decode──▶ LogSink ──▶ stdout
//!                                  │
//!                                  └── malformed → counted, debug log
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use appflow::collector::{Collector, LogSink};
use appflow::config::validation::validate_config;
use appflow::config::{load_config, CollectorConfig, ConfigError};
use appflow::lifecycle::{trigger_on_ctrl_c, Shutdown};
use appflow::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "appflow-collector")]
#[command(about = "Receive and log HTTP application flow records", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// UDP address to listen on (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CollectorConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);

    tracing::info!("appflow-collector v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let collector = Collector::bind(&config.listener, LogSink).await?;

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(trigger_on_ctrl_c(shutdown.clone()));

    collector.run(stop).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
