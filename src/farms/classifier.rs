//! Pool Classifier
//!
//! The registry exposes no type tag for deposit tokens, so we probe: ask the
//! token for `token0()`/`token1()` as if it were a pair. A call exception
//! means "not a pair"; any other failure is a real fault and is returned.

use alloy_primitives::Address;
use tracing::trace;

use super::batch::CallDeadline;
use super::types::PoolKind;
use crate::chain::{ChainReader, FetchError};

pub async fn classify<R: ChainReader>(
    reader: &R,
    deadline: CallDeadline,
    want: Address,
) -> Result<PoolKind, FetchError> {
    match probe_pair(reader, deadline, want).await {
        Ok((token0, token1)) => Ok(PoolKind::LiquidityPair { token0, token1 }),
        Err(e) if e.is_call_exception() => {
            trace!("{} is not a pair ({})", want, e);
            Ok(PoolKind::SingleToken)
        }
        Err(e) => Err(e),
    }
}

async fn probe_pair<R: ChainReader>(
    reader: &R,
    deadline: CallDeadline,
    want: Address,
) -> Result<(Address, Address), FetchError> {
    let token0 = deadline.within("token0", reader.pair_token0(want)).await?;
    let token1 = deadline.within("token1", reader.pair_token1(want)).await?;
    Ok((token0, token1))
}
