//! Balance Aggregator
//!
//! For one address, walks the cached pools batch by batch: fetch staked and
//! pending amounts for every pool of the batch, drop pools without a
//! position, then decompose what is left. A pool that cannot be read counts
//! as "no position" so one bad pool never hides the others.

use alloy_primitives::Address;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::batch::{BatchRunner, CallDeadline};
use super::decomposer::Decomposer;
use super::types::{FarmBalance, PoolRecord, RawPoolBalance};
use crate::chain::{ChainReader, FetchError};

pub struct BalanceAggregator<R> {
    reader: Arc<R>,
    runner: BatchRunner,
    deadline: CallDeadline,
    decomposer: Decomposer<R>,
}

impl<R: ChainReader> BalanceAggregator<R> {
    pub fn new(
        reader: Arc<R>,
        runner: BatchRunner,
        deadline: CallDeadline,
        decomposer: Decomposer<R>,
    ) -> Self {
        Self {
            reader,
            runner,
            deadline,
            decomposer,
        }
    }

    /// Positions of `user` across `pools`, in batch order. Within a batch the
    /// order is not meaningful to callers.
    pub async fn collect(&self, pools: &[PoolRecord], user: Address) -> Vec<FarmBalance> {
        let start = Instant::now();
        let mut farms = Vec::new();

        for batch in self.runner.batches(pools) {
            let raw = join_all(batch.iter().map(|pool| self.raw_balance_or_zero(pool, user))).await;

            let held: Vec<(&PoolRecord, RawPoolBalance)> = batch
                .iter()
                .zip(raw)
                .filter(|(_, raw)| !raw.is_empty())
                .collect();

            if held.is_empty() {
                continue;
            }

            let decomposed = join_all(
                held.iter()
                    .map(|(pool, raw)| self.decomposer.decompose_or_empty(pool, *raw)),
            )
            .await;
            farms.extend(decomposed);
        }

        info!(
            "📊 {}: {} positions across {} pools in {:?}",
            user,
            farms.len(),
            pools.len(),
            start.elapsed()
        );

        farms
    }

    pub async fn raw_balance(&self, pool_id: u64, user: Address) -> Result<RawPoolBalance, FetchError> {
        let staked = self
            .deadline
            .within("stakedWantTokens", self.reader.staked_want_tokens(pool_id, user))
            .await?;
        let reward = self
            .deadline
            .within("pendingAUTO", self.reader.pending_reward(pool_id, user))
            .await?;

        Ok(RawPoolBalance { staked, reward })
    }

    async fn raw_balance_or_zero(&self, pool: &PoolRecord, user: Address) -> RawPoolBalance {
        match self.raw_balance(pool.pool_id, user).await {
            Ok(raw) => {
                debug!(
                    "pool {} | staked: {}, reward: {}",
                    pool.pool_id, raw.staked, raw.reward
                );
                raw
            }
            Err(e) => {
                warn!("Balance read failed for pool {}: {} - treating as zero", pool.pool_id, e);
                RawPoolBalance::default()
            }
        }
    }
}
