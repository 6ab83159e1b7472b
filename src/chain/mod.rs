//! Chain Reader
//!
//! Typed, read-only access to the farm registry and to liquidity-pair
//! contracts. Everything above this layer talks to the chain through the
//! [`ChainReader`] trait, so the engine can be driven by the HTTP reader in
//! production and by an in-memory chain in tests.

pub mod contracts;
mod rpc;

#[cfg(test)]
pub(crate) mod mock;

pub use rpc::RpcChainReader;

use alloy_primitives::{Address, U256};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single chain read.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The call reverted or hit an address without the requested function.
    /// For the pair probe this is a classification signal, not a fault.
    #[error("call exception: {0}")]
    CallException(String),

    /// Network, HTTP or node-side failure unrelated to the called contract
    #[error("rpc transport error: {0}")]
    Transport(String),

    /// The node answered but the payload did not match the ABI
    #[error("failed to decode {call} response: {reason}")]
    Decode { call: &'static str, reason: String },

    /// No answer within the per-call deadline
    #[error("{call} timed out after {after:?}")]
    Timeout { call: &'static str, after: Duration },
}

impl FetchError {
    pub fn is_call_exception(&self) -> bool {
        matches!(self, FetchError::CallException(_))
    }
}

/// Registry entry as returned by `poolInfo`. Only the deposit token matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolInfo {
    pub want: Address,
}

/// Current reserves of a liquidity pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairReserves {
    pub reserve0: U256,
    pub reserve1: U256,
}

/// Read-only view of the registry contract and of pair contracts.
///
/// One method per external call. Implementations never retry; deadlines are
/// applied by the caller.
pub trait ChainReader: Send + Sync {
    /// Number of pools registered in the registry
    fn pool_length(&self) -> impl Future<Output = Result<u64, FetchError>> + Send;

    fn pool_info(&self, pool_id: u64) -> impl Future<Output = Result<PoolInfo, FetchError>> + Send;

    /// Deposit tokens `user` has staked in `pool_id`
    fn staked_want_tokens(
        &self,
        pool_id: u64,
        user: Address,
    ) -> impl Future<Output = Result<U256, FetchError>> + Send;

    /// Unclaimed reward tokens owed to `user` for `pool_id`
    fn pending_reward(
        &self,
        pool_id: u64,
        user: Address,
    ) -> impl Future<Output = Result<U256, FetchError>> + Send;

    fn pair_token0(&self, pair: Address) -> impl Future<Output = Result<Address, FetchError>> + Send;

    fn pair_token1(&self, pair: Address) -> impl Future<Output = Result<Address, FetchError>> + Send;

    fn pair_reserves(
        &self,
        pair: Address,
    ) -> impl Future<Output = Result<PairReserves, FetchError>> + Send;

    /// Total supply of pair shares
    fn pair_total_supply(&self, pair: Address) -> impl Future<Output = Result<U256, FetchError>> + Send;
}
