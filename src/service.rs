//! The two operations exposed to callers: rebuild the pool cache, and
//! report one address's positions.

use alloy_primitives::Address;
use eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::chain::ChainReader;
use crate::config::Config;
use crate::farms::{
    BalanceAggregator, BatchRunner, CacheStatus, CallDeadline, Decomposer, FarmBalance, PoolRecord,
    PoolRegistry, RESERVED_POOL_ID,
};

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCacheResponse {
    pub pools: Vec<PoolRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressBalancesResponse {
    pub farms: Vec<FarmBalance>,
}

/// Engine tunables, usually taken from [`Config`]
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub batch_size: NonZeroUsize,
    pub call_timeout: Duration,
    pub reward_token: Address,
    pub token_decimals: u8,
}

impl TryFrom<&Config> for ServiceSettings {
    type Error = eyre::Report;

    fn try_from(config: &Config) -> Result<Self> {
        Ok(Self {
            batch_size: NonZeroUsize::new(config.concurrent_num)
                .ok_or_else(|| eyre!("CONCURRENT_NUM must be at least 1"))?,
            call_timeout: Duration::from_secs(config.rpc_timeout_secs),
            reward_token: config.reward_token_address,
            token_decimals: config.token_decimals,
        })
    }
}

pub struct FarmService<R> {
    reader: Arc<R>,
    registry: PoolRegistry<R>,
    aggregator: BalanceAggregator<R>,
    deadline: CallDeadline,
}

impl<R: ChainReader> FarmService<R> {
    pub fn new(reader: Arc<R>, settings: ServiceSettings) -> Self {
        let runner = BatchRunner::new(settings.batch_size);
        let deadline = CallDeadline(settings.call_timeout);
        let decomposer = Decomposer::new(
            reader.clone(),
            deadline,
            settings.reward_token,
            settings.token_decimals,
        );

        Self {
            registry: PoolRegistry::new(reader.clone(), runner, deadline),
            aggregator: BalanceAggregator::new(reader.clone(), runner, deadline, decomposer),
            reader,
            deadline,
        }
    }

    /// Rescan the registry and replace the pool cache
    pub async fn update_cache(&self) -> Result<UpdateCacheResponse> {
        let pools = self.registry.update().await?;
        Ok(UpdateCacheResponse {
            pools: pools.as_ref().clone(),
        })
    }

    /// Positions held by `address` (hex string). Builds the pool cache first
    /// if it has never been built.
    pub async fn get_address_balances(&self, address: &str) -> Result<AddressBalancesResponse> {
        let user: Address = address
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid address: {address}"))?;

        let pools = self.registry.ensure_populated().await?;

        let pool_length = self
            .deadline
            .within("poolLength", self.reader.pool_length())
            .await
            .wrap_err("Failed to read registry pool length")?;
        let expected = pool_length.saturating_sub(RESERVED_POOL_ID + 1) as usize;
        if expected != pools.len() {
            warn!(
                "Registry has {} pools but cache holds {} - run update-cache to refresh",
                expected,
                pools.len()
            );
        }

        let farms = self.aggregator.collect(&pools, user).await;
        Ok(AddressBalancesResponse { farms })
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.registry.status().await
    }
}
