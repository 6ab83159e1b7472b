//! Pool Registry Cache
//!
//! Scans every pool index of the registry contract in bounded batches,
//! classifies each pool's deposit token and keeps the result in memory.
//!
//! The cache is only ever replaced as a whole. Rebuilds are single-flight:
//! a caller that queued behind a rebuild which then succeeded gets that
//! rebuild's snapshot instead of scanning the chain a second time.

use chrono::{DateTime, Utc};
use eyre::{eyre, Result, WrapErr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::batch::{BatchRunner, CallDeadline};
use super::classifier::classify;
use super::types::PoolRecord;
use crate::chain::ChainReader;

/// Pool 0 is a placeholder in the registry contract and is never scanned
pub const RESERVED_POOL_ID: u64 = 0;

/// Current contents of the cache
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub pools: usize,
    /// Number of successful rebuilds so far
    pub generation: u64,
    pub built_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Snapshot {
    pools: Arc<Vec<PoolRecord>>,
    built_at: Option<DateTime<Utc>>,
}

pub struct PoolRegistry<R> {
    reader: Arc<R>,
    runner: BatchRunner,
    deadline: CallDeadline,
    snapshot: RwLock<Snapshot>,
    rebuild: Mutex<()>,
    generation: AtomicU64,
}

impl<R: ChainReader> PoolRegistry<R> {
    pub fn new(reader: Arc<R>, runner: BatchRunner, deadline: CallDeadline) -> Self {
        Self {
            reader,
            runner,
            deadline,
            snapshot: RwLock::new(Snapshot::default()),
            rebuild: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Cached pools, possibly empty
    pub async fn pools(&self) -> Arc<Vec<PoolRecord>> {
        self.snapshot.read().await.pools.clone()
    }

    pub async fn status(&self) -> CacheStatus {
        let snapshot = self.snapshot.read().await;
        CacheStatus {
            pools: snapshot.pools.len(),
            generation: self.generation.load(Ordering::Acquire),
            built_at: snapshot.built_at,
        }
    }

    /// Rebuild the cache from the chain and return the new contents.
    ///
    /// If another rebuild finishes while this call waits for its turn, that
    /// result is returned as is.
    pub async fn update(&self) -> Result<Arc<Vec<PoolRecord>>> {
        let seen = self.generation.load(Ordering::Acquire);
        let _flight = self.rebuild.lock().await;

        if self.generation.load(Ordering::Acquire) != seen {
            debug!("Joined a pool cache rebuild that completed while waiting");
            return Ok(self.pools().await);
        }

        self.rebuild_locked().await
    }

    /// Return the cached pools, building the cache first if it is empty.
    /// Concurrent first callers share a single build.
    pub async fn ensure_populated(&self) -> Result<Arc<Vec<PoolRecord>>> {
        let pools = self.pools().await;
        if !pools.is_empty() {
            return Ok(pools);
        }

        let _flight = self.rebuild.lock().await;
        let pools = self.pools().await;
        if !pools.is_empty() {
            return Ok(pools);
        }

        info!("Pool cache is empty, building it before the balance query");
        self.rebuild_locked().await
    }

    /// Caller must hold `self.rebuild`
    async fn rebuild_locked(&self) -> Result<Arc<Vec<PoolRecord>>> {
        let start = Instant::now();
        let pools = Arc::new(self.scan().await?);

        let mut snapshot = self.snapshot.write().await;
        *snapshot = Snapshot {
            pools: pools.clone(),
            built_at: Some(Utc::now()),
        };
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(snapshot);

        info!(
            "⚡ Pool cache rebuilt: {} pools in {:?} (generation {})",
            pools.len(),
            start.elapsed(),
            generation
        );

        Ok(pools)
    }

    /// Full registry scan. Any failure other than a negative pair probe
    /// aborts the scan: a partial registry would silently hide positions.
    async fn scan(&self) -> Result<Vec<PoolRecord>> {
        let pool_length = self
            .deadline
            .within("poolLength", self.reader.pool_length())
            .await
            .wrap_err("Failed to read registry pool length")?;

        info!("Registry reports {} pools", pool_length);

        // grows per batch: the reported length is untrusted
        let mut pools = Vec::new();
        for batch in self.runner.index_batches(pool_length) {
            let ids: Vec<u64> = batch.filter(|id| *id != RESERVED_POOL_ID).collect();
            let records = self
                .runner
                .try_run(&ids, |&pool_id| self.fetch_record(pool_id))
                .await?;

            for record in &records {
                debug!("{:?}", record);
            }
            pools.extend(records);
        }

        Ok(pools)
    }

    async fn fetch_record(&self, pool_id: u64) -> Result<PoolRecord> {
        let info = self
            .deadline
            .within("poolInfo", self.reader.pool_info(pool_id))
            .await
            .map_err(|e| eyre!("Failed to read poolInfo({}): {}", pool_id, e))?;

        let kind = classify(self.reader.as_ref(), self.deadline, info.want)
            .await
            .map_err(|e| eyre!("Failed to classify pool {} ({}): {}", pool_id, info.want, e))?;

        Ok(PoolRecord {
            pool_id,
            want: info.want,
            kind,
        })
    }
}
