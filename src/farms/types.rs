use alloy_primitives::{Address, U256};
use serde::Serialize;

/// What a pool's deposit token turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    SingleToken,
    /// Constant-product pair share backed by two reserve tokens
    LiquidityPair { token0: Address, token1: Address },
}

impl PoolKind {
    pub fn is_liquidity_pair(&self) -> bool {
        matches!(self, PoolKind::LiquidityPair { .. })
    }
}

/// One registered pool, as classified during a cache build. Immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "PoolRecordJson")]
pub struct PoolRecord {
    pub pool_id: u64,
    /// Token the pool accepts as stake
    pub want: Address,
    pub kind: PoolKind,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PoolRecordJson {
    pool_id: u64,
    is_liquidity_pair: bool,
    deposit_token_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    token0_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token1_address: Option<Address>,
}

impl From<PoolRecord> for PoolRecordJson {
    fn from(record: PoolRecord) -> Self {
        let (token0_address, token1_address) = match record.kind {
            PoolKind::SingleToken => (None, None),
            PoolKind::LiquidityPair { token0, token1 } => (Some(token0), Some(token1)),
        };

        Self {
            pool_id: record.pool_id,
            is_liquidity_pair: record.kind.is_liquidity_pair(),
            deposit_token_address: record.want,
            token0_address,
            token1_address,
        }
    }
}

/// Raw staked/reward amounts for one (pool, address) pair, in smallest units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawPoolBalance {
    pub staked: U256,
    pub reward: U256,
}

impl RawPoolBalance {
    pub fn is_empty(&self) -> bool {
        self.staked.is_zero() && self.reward.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalance {
    pub address: Address,
    /// Display-scaled decimal string
    pub balance: String,
}

/// A user's position in one pool, broken down into underlying tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmBalance {
    #[serde(skip)]
    pub pool_id: u64,
    pub tokens: Vec<TokenBalance>,
    /// Staked amount in the deposit token's own unit
    pub balance: String,
    pub rewards: Vec<TokenBalance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lp_address: Option<Address>,
}

impl FarmBalance {
    /// Placeholder reported when a pool's position could not be decomposed
    pub fn empty(pool_id: u64) -> Self {
        Self {
            pool_id,
            tokens: Vec::new(),
            balance: "0".to_string(),
            rewards: Vec::new(),
            lp_address: None,
        }
    }
}
