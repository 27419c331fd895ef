//! # Forkmine Node
//!
//! Runs a single-node development chain: a block tree with heaviest-chain
//! fork choice and a background miner extending the current head.
//!
//! ## Usage
//!
//! ```text
//! forkmine-node run --config forkmine.toml --cpu-pct 25
//! ```
//!
//! `RUST_LOG` takes precedence over `logging.level` and `--log-level`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use node_runtime::container::LoggingConfig;
use node_runtime::{NodeConfig, NodeRuntime};

#[derive(Parser)]
#[command(name = "forkmine-node")]
#[command(about = "Development chain node with a background miner", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the node until interrupted
    Run(RunArgs),
    /// Print the effective configuration and exit
    Config(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default log filter, e.g. `info` or `fm_02_mining=debug`
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,

    /// Share of wall time spent hashing (1-100)
    #[arg(long)]
    cpu_pct: Option<u8>,

    /// Pause before each mining attempt, in milliseconds
    #[arg(long)]
    mining_delay_ms: Option<u64>,

    /// Do not start the miner
    #[arg(long)]
    no_mining: bool,
}

impl RunArgs {
    fn load(&self) -> Result<NodeConfig> {
        let mut config = NodeConfig::from_file(self.config.as_deref())?;
        config.apply_env()?;

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }
        if let Some(cpu_pct) = self.cpu_pct {
            config.mining.cpu_pct = cpu_pct;
        }
        if let Some(delay) = self.mining_delay_ms {
            config.mining.warmup_delay_ms = delay;
        }
        if self.no_mining {
            config.mining.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true);

    if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
    .map_err(|e| anyhow::anyhow!(e))
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            let config = args.load()?;
            println!("{config:#?}");
            Ok(())
        }
        Commands::Run(args) => {
            let config = args.load()?;
            init_logging(&config.logging)?;

            let mut runtime = NodeRuntime::new(config)?;
            runtime.start()?;

            info!("Node is running. Press Ctrl+C to stop.");
            wait_for_signal().await?;

            runtime.shutdown().await
        }
    }
}
