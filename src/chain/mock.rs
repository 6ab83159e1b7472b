//! In-memory chain for tests.
//!
//! Pools are indexed by id exactly like the registry; index 0 is whatever
//! the test puts there. Every call sleeps for `latency` so that concurrent
//! calls really overlap, and the in-flight high-water mark is recorded.

use alloy_primitives::{Address, U256};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use super::{ChainReader, FetchError, PairReserves, PoolInfo};

#[derive(Debug, Clone)]
pub struct MockPair {
    pub token0: Address,
    pub token1: Address,
    pub reserves: PairReserves,
    pub total_supply: U256,
}

#[derive(Default)]
pub struct MockChain {
    pools: Vec<Address>,
    pairs: HashMap<Address, MockPair>,
    positions: HashMap<(u64, Address), (U256, U256)>,
    /// Deposit tokens whose pair probe fails with a network error
    broken_tokens: HashSet<Address>,
    /// Pool ids whose `pending_reward` fails with a network error
    failing_rewards: HashSet<u64>,
    /// Pool ids whose `staked_want_tokens` never answers
    hanging_stakes: HashSet<u64>,
    /// Pairs whose reserve read fails
    failing_reserves: HashSet<Address>,
    pool_length_error: AtomicBool,
    /// Overrides the pool count `pool_length` reports
    reported_pool_length: Option<u64>,
    latency: Duration,

    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    pool_length_calls: AtomicUsize,
    pool_info_calls: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Deterministic test address
pub fn addr(n: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    Address::from(bytes)
}

/// `n` whole tokens in 18-decimal smallest units
pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register a pool whose deposit token is a plain token
    pub fn single_pool(mut self, want: Address) -> Self {
        self.pools.push(want);
        self
    }

    /// Register a pool whose deposit token is a pair
    pub fn pair_pool(mut self, want: Address, pair: MockPair) -> Self {
        self.pools.push(want);
        self.pairs.insert(want, pair);
        self
    }

    pub fn position(mut self, pool_id: u64, user: Address, staked: U256, reward: U256) -> Self {
        self.positions.insert((pool_id, user), (staked, reward));
        self
    }

    pub fn broken_token(mut self, want: Address) -> Self {
        self.broken_tokens.insert(want);
        self
    }

    pub fn failing_reward(mut self, pool_id: u64) -> Self {
        self.failing_rewards.insert(pool_id);
        self
    }

    pub fn hanging_stake(mut self, pool_id: u64) -> Self {
        self.hanging_stakes.insert(pool_id);
        self
    }

    pub fn failing_reserves(mut self, pair: Address) -> Self {
        self.failing_reserves.insert(pair);
        self
    }

    /// Report `length` pools regardless of how many are registered
    pub fn reporting_pool_length(mut self, length: u64) -> Self {
        self.reported_pool_length = Some(length);
        self
    }

    pub fn failing_pool_length(self) -> Self {
        self.set_pool_length_error(true);
        self
    }

    /// Make the registry unreadable (or readable again) mid-test
    pub fn set_pool_length_error(&self, failing: bool) {
        self.pool_length_error.store(failing, Ordering::SeqCst);
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn pool_info_calls(&self) -> usize {
        self.pool_info_calls.load(Ordering::SeqCst)
    }

    pub fn pool_length_calls(&self) -> usize {
        self.pool_length_calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        guard
    }

    fn want(&self, pool_id: u64) -> Result<Address, FetchError> {
        self.pools
            .get(pool_id as usize)
            .copied()
            .ok_or_else(|| FetchError::CallException(format!("pool {pool_id} out of range")))
    }

    fn pair(&self, pair: Address) -> Result<&MockPair, FetchError> {
        if self.broken_tokens.contains(&pair) {
            return Err(FetchError::Transport("connection reset by peer".to_string()));
        }
        self.pairs
            .get(&pair)
            .ok_or_else(|| FetchError::CallException("execution reverted".to_string()))
    }
}

impl ChainReader for MockChain {
    async fn pool_length(&self) -> Result<u64, FetchError> {
        let _call = self.enter().await;
        self.pool_length_calls.fetch_add(1, Ordering::SeqCst);
        if self.pool_length_error.load(Ordering::SeqCst) {
            return Err(FetchError::Transport("503 service unavailable".to_string()));
        }
        Ok(self.reported_pool_length.unwrap_or(self.pools.len() as u64))
    }

    async fn pool_info(&self, pool_id: u64) -> Result<PoolInfo, FetchError> {
        let _call = self.enter().await;
        self.pool_info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PoolInfo { want: self.want(pool_id)? })
    }

    async fn staked_want_tokens(&self, pool_id: u64, user: Address) -> Result<U256, FetchError> {
        let _call = self.enter().await;
        if self.hanging_stakes.contains(&pool_id) {
            std::future::pending::<()>().await;
        }
        self.want(pool_id)?;
        Ok(self
            .positions
            .get(&(pool_id, user))
            .map(|(staked, _)| *staked)
            .unwrap_or_default())
    }

    async fn pending_reward(&self, pool_id: u64, user: Address) -> Result<U256, FetchError> {
        let _call = self.enter().await;
        if self.failing_rewards.contains(&pool_id) {
            return Err(FetchError::Transport("connection refused".to_string()));
        }
        self.want(pool_id)?;
        Ok(self
            .positions
            .get(&(pool_id, user))
            .map(|(_, reward)| *reward)
            .unwrap_or_default())
    }

    async fn pair_token0(&self, pair: Address) -> Result<Address, FetchError> {
        let _call = self.enter().await;
        Ok(self.pair(pair)?.token0)
    }

    async fn pair_token1(&self, pair: Address) -> Result<Address, FetchError> {
        let _call = self.enter().await;
        Ok(self.pair(pair)?.token1)
    }

    async fn pair_reserves(&self, pair: Address) -> Result<PairReserves, FetchError> {
        let _call = self.enter().await;
        if self.failing_reserves.contains(&pair) {
            return Err(FetchError::Transport("upstream timeout".to_string()));
        }
        Ok(self.pair(pair)?.reserves)
    }

    async fn pair_total_supply(&self, pair: Address) -> Result<U256, FetchError> {
        let _call = self.enter().await;
        Ok(self.pair(pair)?.total_supply)
    }
}
