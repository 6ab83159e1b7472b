//! Configuration for farmlens
//!
//! Values come from environment variables (a `.env` file is honoured) or
//! from a TOML file. Every option has a working default for the AutoFarm V2
//! deployment on BNB Chain.

use alloy_primitives::{address, Address};
use console::style;
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

// ============================================
// DEFAULTS
// ============================================

/// Public BNB Chain endpoint
pub const DEFAULT_RPC_URL: &str = "https://bsc-dataseed.binance.org/";

/// AutoFarm V2 master contract
pub const DEFAULT_REGISTRY: Address = address!("0895196562C7868C5Be92459FaE7f877ED450452");

/// AUTO token, paid out as the reward for every pool
pub const DEFAULT_REWARD_TOKEN: Address = address!("a184088a740c695e156f91f5cc086a06bb78b827");

const DEFAULT_CONCURRENT_NUM: usize = 20;
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Largest decimals value we accept for display scaling
const MAX_TOKEN_DECIMALS: u8 = 36;

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Network Settings ==========
    /// JSON-RPC endpoint of the chain the registry lives on
    pub rpc_url: String,

    /// Farm registry (master) contract
    pub registry_address: Address,

    // ========== Reward Settings ==========
    /// Token every pool's pending reward is denominated in
    pub reward_token_address: Address,

    /// Decimals used to scale amounts for display
    pub token_decimals: u8,

    // ========== Rate Limiting ==========
    /// Maximum RPC-backed pool operations in flight at once (batch size)
    pub concurrent_num: usize,

    /// Deadline for a single RPC call
    pub rpc_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            registry_address: match env::var("REGISTRY_ADDRESS") {
                Ok(s) => s.trim().parse().wrap_err("Invalid REGISTRY_ADDRESS")?,
                Err(_) => DEFAULT_REGISTRY,
            },
            reward_token_address: match env::var("REWARD_TOKEN_ADDRESS") {
                Ok(s) => s.trim().parse().wrap_err("Invalid REWARD_TOKEN_ADDRESS")?,
                Err(_) => DEFAULT_REWARD_TOKEN,
            },
            token_decimals: env::var("TOKEN_DECIMALS")
                .unwrap_or_else(|_| DEFAULT_TOKEN_DECIMALS.to_string())
                .parse()
                .wrap_err("TOKEN_DECIMALS must be an integer between 0 and 255")?,
            concurrent_num: env::var("CONCURRENT_NUM")
                .unwrap_or_else(|_| DEFAULT_CONCURRENT_NUM.to_string())
                .parse()
                .wrap_err("CONCURRENT_NUM must be a positive integer")?,
            rpc_timeout_secs: env::var("RPC_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_RPC_TIMEOUT_SECS.to_string())
                .parse()
                .wrap_err("RPC_TIMEOUT_SECS must be a positive integer")?,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read {}", path.as_ref().display()))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() || self.rpc_url.contains("YOUR_API_KEY") {
            return Err(eyre!("Invalid RPC_URL - please set a reachable JSON-RPC endpoint"));
        }

        if self.registry_address == Address::ZERO {
            return Err(eyre!("REGISTRY_ADDRESS must not be the zero address"));
        }

        if self.concurrent_num == 0 {
            return Err(eyre!("CONCURRENT_NUM must be at least 1"));
        }

        if self.rpc_timeout_secs == 0 {
            return Err(eyre!("RPC_TIMEOUT_SECS must be at least 1"));
        }

        if self.token_decimals > MAX_TOKEN_DECIMALS {
            return Err(eyre!(
                "TOKEN_DECIMALS must be at most {} (currently {})",
                MAX_TOKEN_DECIMALS,
                self.token_decimals
            ));
        }

        Ok(())
    }

    /// Print configuration summary (stderr, stdout is reserved for JSON)
    pub fn print_summary(&self) {
        let rpc = abbreviate(&self.rpc_url, 40, 25, 12);

        eprintln!("{}", style("╔════════════════════════════════════════════════════════════╗").cyan());
        eprintln!("{}", style("║                 FARMLENS - CONFIGURATION                   ║").cyan());
        eprintln!("{}", style("╠════════════════════════════════════════════════════════════╣").cyan());
        eprintln!("║ RPC:              {:<40} ║", rpc);
        eprintln!("║ Registry:         {:<40} ║", format!("{:#}", self.registry_address));
        eprintln!("║ Reward Token:     {:<40} ║", format!("{:#}", self.reward_token_address));
        eprintln!("║ Token Decimals:   {:<40} ║", self.token_decimals);
        eprintln!("║ Batch Size:       {:<40} ║", self.concurrent_num);
        eprintln!("║ Call Timeout:     {:<40} ║", format!("{}s", self.rpc_timeout_secs));
        eprintln!("{}", style("╚════════════════════════════════════════════════════════════╝").cyan());
    }
}

/// Keep the first `head` and last `tail` characters of strings longer than `max`
fn abbreviate(s: &str, max: usize, head: usize, tail: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    let start: String = s.chars().take(head).collect();
    let end: String = s.chars().skip(len - tail).collect();
    format!("{start}...{end}")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            registry_address: DEFAULT_REGISTRY,
            reward_token_address: DEFAULT_REWARD_TOKEN,
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            concurrent_num: DEFAULT_CONCURRENT_NUM,
            rpc_timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
        }
    }
}

// ============================================
// TESTS
// ============================================
