//! Redemption Decomposer
//!
//! Turns a raw staked amount into what it is worth in underlying tokens.
//! Single tokens pass straight through. A pair share of `staked` out of
//! `totalSupply` redeems `reserve_i * staked / totalSupply` of each reserve.

use alloy_primitives::utils::UnitsError;
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use super::batch::CallDeadline;
use super::types::{FarmBalance, PoolKind, PoolRecord, RawPoolBalance, TokenBalance};
use crate::chain::{ChainReader, FetchError};
use crate::units::format_display;

#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("pair {0} reports zero total supply")]
    ZeroSupply(Address),

    #[error("redemption overflow: {reserve} * {staked}")]
    Overflow { reserve: U256, staked: U256 },

    #[error(transparent)]
    Units(#[from] UnitsError),
}

/// Amount of one reserve owed to a holder of `staked` out of `total_supply`
/// shares. Multiplies before dividing so small positions are not truncated
/// to zero; the single division floors.
pub fn pro_rata_share(reserve: U256, staked: U256, total_supply: U256) -> Option<U256> {
    if total_supply.is_zero() {
        return None;
    }
    reserve.checked_mul(staked).map(|product| product / total_supply)
}

pub struct Decomposer<R> {
    reader: Arc<R>,
    deadline: CallDeadline,
    reward_token: Address,
    decimals: u8,
}

impl<R: ChainReader> Decomposer<R> {
    pub fn new(reader: Arc<R>, deadline: CallDeadline, reward_token: Address, decimals: u8) -> Self {
        Self {
            reader,
            deadline,
            reward_token,
            decimals,
        }
    }

    /// Decompose, reporting an empty balance for the pool on any failure
    pub async fn decompose_or_empty(&self, pool: &PoolRecord, raw: RawPoolBalance) -> FarmBalance {
        match self.decompose(pool, raw).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(
                    "Decomposition failed for pool {} ({}): {} - reporting empty balance",
                    pool.pool_id, pool.want, e
                );
                FarmBalance::empty(pool.pool_id)
            }
        }
    }

    pub async fn decompose(
        &self,
        pool: &PoolRecord,
        raw: RawPoolBalance,
    ) -> Result<FarmBalance, DecomposeError> {
        let balance = format_display(raw.staked, self.decimals)?;
        let rewards = vec![TokenBalance {
            address: self.reward_token,
            balance: format_display(raw.reward, self.decimals)?,
        }];

        match pool.kind {
            PoolKind::SingleToken => Ok(FarmBalance {
                pool_id: pool.pool_id,
                tokens: vec![TokenBalance {
                    address: pool.want,
                    balance: balance.clone(),
                }],
                balance,
                rewards,
                lp_address: None,
            }),
            PoolKind::LiquidityPair { token0, token1 } => {
                let (amount0, amount1) = self.redeem(pool.want, raw.staked).await?;

                Ok(FarmBalance {
                    pool_id: pool.pool_id,
                    tokens: vec![
                        TokenBalance {
                            address: token0,
                            balance: format_display(amount0, self.decimals)?,
                        },
                        TokenBalance {
                            address: token1,
                            balance: format_display(amount1, self.decimals)?,
                        },
                    ],
                    balance,
                    rewards,
                    lp_address: Some(pool.want),
                })
            }
        }
    }

    /// Underlying amounts a pair share of `staked` currently redeems for
    async fn redeem(&self, pair: Address, staked: U256) -> Result<(U256, U256), DecomposeError> {
        let reserves = self
            .deadline
            .within("getReserves", self.reader.pair_reserves(pair))
            .await?;
        let total_supply = self
            .deadline
            .within("totalSupply", self.reader.pair_total_supply(pair))
            .await?;

        let share = |reserve: U256| {
            pro_rata_share(reserve, staked, total_supply).ok_or(if total_supply.is_zero() {
                DecomposeError::ZeroSupply(pair)
            } else {
                DecomposeError::Overflow { reserve, staked }
            })
        };

        Ok((share(reserves.reserve0)?, share(reserves.reserve1)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::{addr, tokens, MockChain, MockPair};
    use crate::chain::PairReserves;
    use alloy_primitives::address;
    use std::time::Duration;

    const REWARD: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

    fn decomposer(chain: MockChain) -> Decomposer<MockChain> {
        Decomposer::new(
            Arc::new(chain),
            CallDeadline(Duration::from_secs(1)),
            REWARD,
            18,
        )
    }

    fn pair_pool(want: Address) -> PoolRecord {
        PoolRecord {
            pool_id: 7,
            want,
            kind: PoolKind::LiquidityPair {
                token0: addr(1),
                token1: addr(2),
            },
        }
    }

    fn pair(reserve0: U256, reserve1: U256, total_supply: U256) -> MockPair {
        MockPair {
            token0: addr(1),
            token1: addr(2),
            reserves: PairReserves { reserve0, reserve1 },
            total_supply,
        }
    }

    #[test]
    fn test_pro_rata_share_reference_values() {
        let share = |r: u64, s: u64, t: u64| pro_rata_share(U256::from(r), U256::from(s), U256::from(t));

        assert_eq!(share(1000, 10, 100), Some(U256::from(100u64)));
        assert_eq!(share(2000, 10, 100), Some(U256::from(200u64)));
        // reserve < totalSupply would truncate to zero if divided first
        assert_eq!(share(50, 30, 100), Some(U256::from(15u64)));
        assert_eq!(share(1000, 10, 0), None);
        assert_eq!(pro_rata_share(U256::MAX, U256::from(2u64), U256::from(1u64)), None);
    }

    #[tokio::test]
    async fn test_pair_position_redeems_pro_rata() {
        let lp = addr(0x500);
        let chain = MockChain::new().pair_pool(lp, pair(tokens(1000), tokens(2000), tokens(100)));

        let raw = RawPoolBalance {
            staked: tokens(10),
            reward: tokens(3),
        };
        let balance = decomposer(chain).decompose(&pair_pool(lp), raw).await.unwrap();

        assert_eq!(balance.tokens.len(), 2);
        assert_eq!(balance.tokens[0].address, addr(1));
        assert_eq!(balance.tokens[0].balance, "100.0");
        assert_eq!(balance.tokens[1].address, addr(2));
        assert_eq!(balance.tokens[1].balance, "200.0");
        assert_eq!(balance.balance, "10.0");
        assert_eq!(balance.lp_address, Some(lp));
        assert_eq!(balance.rewards[0].address, REWARD);
        assert_eq!(balance.rewards[0].balance, "3.0");
    }

    #[tokio::test]
    async fn test_small_pair_position_is_not_truncated() {
        let lp = addr(0x501);
        // reserve0 below totalSupply: dividing first would report 0
        let chain = MockChain::new().pair_pool(lp, pair(U256::from(50u64), tokens(1), U256::from(100u64)));

        let raw = RawPoolBalance {
            staked: U256::from(30u64),
            reward: U256::ZERO,
        };
        let balance = decomposer(chain).decompose(&pair_pool(lp), raw).await.unwrap();

        assert_eq!(balance.tokens[0].balance, "0.000000000000000015");
    }

    #[tokio::test]
    async fn test_single_token_passes_through() {
        let token = addr(0x600);
        let pool = PoolRecord {
            pool_id: 2,
            want: token,
            kind: PoolKind::SingleToken,
        };
        let raw = RawPoolBalance {
            staked: tokens(50),
            reward: U256::ZERO,
        };

        let balance = decomposer(MockChain::new()).decompose(&pool, raw).await.unwrap();

        assert_eq!(
            balance.tokens,
            vec![TokenBalance {
                address: token,
                balance: "50.0".to_string()
            }]
        );
        assert_eq!(balance.balance, "50.0");
        assert_eq!(balance.lp_address, None);
        assert_eq!(balance.rewards[0].balance, "0.0");
    }

    #[tokio::test]
    async fn test_reserve_failure_yields_empty_balance() {
        let lp = addr(0x700);
        let chain = MockChain::new()
            .pair_pool(lp, pair(tokens(1), tokens(1), tokens(1)))
            .failing_reserves(lp);

        let raw = RawPoolBalance {
            staked: tokens(1),
            reward: tokens(1),
        };
        let balance = decomposer(chain).decompose_or_empty(&pair_pool(lp), raw).await;

        assert_eq!(balance, FarmBalance::empty(7));
    }

    #[tokio::test]
    async fn test_zero_supply_is_an_error() {
        let lp = addr(0x800);
        let chain = MockChain::new().pair_pool(lp, pair(tokens(1), tokens(1), U256::ZERO));

        let raw = RawPoolBalance {
            staked: tokens(1),
            reward: U256::ZERO,
        };
        let err = decomposer(chain).decompose(&pair_pool(lp), raw).await.unwrap_err();
        assert!(matches!(err, DecomposeError::ZeroSupply(a) if a == lp));
    }
}
