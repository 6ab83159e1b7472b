//! farmlens - yield farm position lens
//!
//! Run with: cargo run -- balances <ADDRESS>
//!
//! JSON results go to stdout, logs and the banner go to stderr.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use console::style;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use farmlens::chain::RpcChainReader;
use farmlens::config::Config;
use farmlens::service::{FarmService, ServiceSettings};

#[derive(Parser)]
#[command(name = "farmlens", version, about = "Yield farm position lens")]
struct Cli {
    /// Read settings from a TOML file instead of the environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rescan the registry and print every pool
    UpdateCache,

    /// Print the staked positions of an address
    Balances {
        address: String,

        /// Rebuild the pool cache before querying
        #[arg(long)]
        refresh: bool,
    },
}

fn print_banner() {
    eprintln!();
    eprintln!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    eprintln!(
        "{}",
        style(" 🌾 FARMLENS - Yield Farm Position Lens").cyan().bold()
    );
    eprintln!(
        "{}",
        style("    Registry scan | LP decomposition | Pending rewards").cyan()
    );
    eprintln!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    eprintln!();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("farmlens=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    print_banner();

    // Load configuration
    let config = load_config(cli.config.as_ref())?;

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file or --config");
        return Err(e);
    }

    config.print_summary();
    eprintln!();

    let reader = RpcChainReader::new(&config.rpc_url, config.registry_address)
        .wrap_err("Failed to set up RPC provider")?;
    info!("Reading farm registry {}", reader.registry());
    let service = FarmService::new(Arc::new(reader), ServiceSettings::try_from(&config)?);

    let start = Instant::now();

    match cli.command {
        Command::UpdateCache => {
            let response = service.update_cache().await?;
            info!(
                "✅ Cached {} pools in {:?}",
                response.pools.len(),
                start.elapsed()
            );
            print_json(&response)?;
        }
        Command::Balances { address, refresh } => {
            if refresh {
                service.update_cache().await?;
            }
            let response = service.get_address_balances(&address).await?;
            let status = service.cache_status().await;
            info!(
                "✅ {} positions from {} cached pools (generation {}) in {:?}",
                response.farms.len(),
                status.pools,
                status.generation,
                start.elapsed()
            );
            print_json(&response)?;
        }
    }

    Ok(())
}
