//! Diagnostic tool - Check configuration and registry reachability
//!
//! Run with: cargo run --bin diagnose

use std::env;
use std::time::Instant;

use farmlens::chain::{ChainReader, RpcChainReader};
use farmlens::config::Config;
use farmlens::farms::BatchRunner;
use farmlens::service::ServiceSettings;

#[tokio::main]
async fn main() {
    println!("🔍 FARMLENS DIAGNOSTIC CHECK\n");

    // Load .env
    dotenvy::dotenv().ok();

    println!("═══════════════════════════════════════════════════");
    println!("                  CONFIGURATION                     ");
    println!("═══════════════════════════════════════════════════\n");

    // Key settings
    let checks = [
        ("RPC_URL", "https://bsc-dataseed.binance.org/", "JSON-RPC endpoint"),
        ("REGISTRY_ADDRESS", "0x0895196562C7868C5Be92459FaE7f877ED450452", "Farm registry contract"),
        ("REWARD_TOKEN_ADDRESS", "0xa184088a740c695e156f91f5cc086a06bb78b827", "Reward token reported for every pool"),
        ("CONCURRENT_NUM", "20", "Pools processed per batch"),
        ("RPC_TIMEOUT_SECS", "15", "Deadline per RPC call"),
        ("TOKEN_DECIMALS", "18", "Decimals used for display"),
    ];

    for (key, default, desc) in checks {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let is_default = env::var(key).is_err();
        let marker = if is_default { "(default)" } else { "(from .env)" };
        println!("  {}: {} {}", key, value, marker);
        println!("    └─ {}\n", desc);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("  ❌ Could not parse configuration: {:#}", e);
            return;
        }
    };

    match config.validate() {
        Ok(()) => println!("  ✅ Configuration valid"),
        Err(e) => {
            println!("  ❌ {}", e);
            return;
        }
    }

    println!("\n═══════════════════════════════════════════════════");
    println!("                    REGISTRY                        ");
    println!("═══════════════════════════════════════════════════\n");

    let settings = match ServiceSettings::try_from(&config) {
        Ok(settings) => settings,
        Err(e) => {
            println!("  ❌ {}", e);
            return;
        }
    };

    let reader = match RpcChainReader::new(&config.rpc_url, config.registry_address) {
        Ok(reader) => reader,
        Err(e) => {
            println!("  ❌ RPC provider: {}", e);
            return;
        }
    };

    let start = Instant::now();
    let timeout = settings.call_timeout;
    match tokio::time::timeout(timeout, reader.pool_length()).await {
        Ok(Ok(length)) => {
            println!("  ✅ poolLength: {} ({:?})", length, start.elapsed());
            println!("     → {} pools will be scanned (pool 0 is skipped)", length.saturating_sub(1));

            let batches = BatchRunner::new(settings.batch_size).batch_count(length);
            println!("     → {} batches of up to {}", batches, settings.batch_size);
        }
        Ok(Err(e)) => println!("  ❌ poolLength failed: {}", e),
        Err(_) => println!("  ❌ poolLength timed out after {:?}", timeout),
    }

    println!("\n✅ Diagnostic complete!\n");
}
