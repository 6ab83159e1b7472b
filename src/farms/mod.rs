//! Farm registry scanning and position aggregation

mod aggregator;
mod batch;
mod classifier;
mod decomposer;
mod registry;
mod types;

pub use aggregator::BalanceAggregator;
pub use batch::{BatchRunner, CallDeadline};
pub use classifier::classify;
pub use decomposer::{pro_rata_share, DecomposeError, Decomposer};
pub use registry::{CacheStatus, PoolRegistry, RESERVED_POOL_ID};
pub use types::{FarmBalance, PoolKind, PoolRecord, RawPoolBalance, TokenBalance};
