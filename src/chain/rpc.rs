//! JSON-RPC backed [`ChainReader`]
//!
//! Each read is a plain `eth_call` against the latest block: ABI-encode the
//! call, send it, decode the return data.

use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use alloy_transport::{RpcError, TransportError};
use eyre::Result;
use tracing::trace;

use super::contracts::{IAutoFarmV2, IPancakePair};
use super::{ChainReader, FetchError, PairReserves, PoolInfo};

/// JSON-RPC error code geth-style nodes use for `execution reverted`
const REVERT_ERROR_CODE: i64 = 3;

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        if let RpcError::ErrorResp(payload) = &err {
            if is_revert(payload.code, &payload.message) {
                return FetchError::CallException(payload.message.to_string());
            }
        }
        FetchError::Transport(err.to_string())
    }
}

/// BSC/geth nodes report reverts either with code 3 or with code -32000 and
/// an `execution reverted` message.
fn is_revert(code: i64, message: &str) -> bool {
    code == REVERT_ERROR_CODE || message.to_ascii_lowercase().contains("revert")
}

fn decode<C: SolCall>(call: &'static str, output: &Bytes) -> Result<C::Return, FetchError> {
    C::abi_decode_returns(output).map_err(|e| FetchError::Decode {
        call,
        reason: e.to_string(),
    })
}

/// Reader bound to one RPC endpoint and one registry contract
pub struct RpcChainReader {
    provider: DynProvider,
    registry: Address,
}

impl RpcChainReader {
    pub fn new(rpc_url: &str, registry: Address) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect_http(rpc_url.parse()?)
            .erased();

        Ok(Self { provider, registry })
    }

    pub fn registry(&self) -> Address {
        self.registry
    }

    /// Helper to call a contract
    async fn call_contract(&self, to: Address, calldata: Vec<u8>) -> Result<Bytes, FetchError> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(calldata.into());

        let output = self.provider.call(tx).await?;

        // No code (or a fallback that returns nothing) at `to`: same signal as
        // a revert for our purposes
        if output.is_empty() {
            return Err(FetchError::CallException(format!(
                "empty return data from {to}"
            )));
        }

        trace!("eth_call {} -> {} bytes", to, output.len());
        Ok(output)
    }
}

impl ChainReader for RpcChainReader {
    async fn pool_length(&self) -> Result<u64, FetchError> {
        let calldata = IAutoFarmV2::poolLengthCall {}.abi_encode();
        let output = self.call_contract(self.registry, calldata).await?;
        let length = decode::<IAutoFarmV2::poolLengthCall>("poolLength", &output)?;

        u64::try_from(length).map_err(|_| FetchError::Decode {
            call: "poolLength",
            reason: format!("pool count {length} does not fit in u64"),
        })
    }

    async fn pool_info(&self, pool_id: u64) -> Result<PoolInfo, FetchError> {
        let calldata = IAutoFarmV2::poolInfoCall { pid: U256::from(pool_id) }.abi_encode();
        let output = self.call_contract(self.registry, calldata).await?;
        let info = decode::<IAutoFarmV2::poolInfoCall>("poolInfo", &output)?;

        Ok(PoolInfo { want: info.want })
    }

    async fn staked_want_tokens(&self, pool_id: u64, user: Address) -> Result<U256, FetchError> {
        let calldata = IAutoFarmV2::stakedWantTokensCall {
            pid: U256::from(pool_id),
            user,
        }
        .abi_encode();
        let output = self.call_contract(self.registry, calldata).await?;
        decode::<IAutoFarmV2::stakedWantTokensCall>("stakedWantTokens", &output)
    }

    async fn pending_reward(&self, pool_id: u64, user: Address) -> Result<U256, FetchError> {
        let calldata = IAutoFarmV2::pendingAUTOCall {
            pid: U256::from(pool_id),
            user,
        }
        .abi_encode();
        let output = self.call_contract(self.registry, calldata).await?;
        decode::<IAutoFarmV2::pendingAUTOCall>("pendingAUTO", &output)
    }

    async fn pair_token0(&self, pair: Address) -> Result<Address, FetchError> {
        let calldata = IPancakePair::token0Call {}.abi_encode();
        let output = self.call_contract(pair, calldata).await?;
        decode::<IPancakePair::token0Call>("token0", &output)
    }

    async fn pair_token1(&self, pair: Address) -> Result<Address, FetchError> {
        let calldata = IPancakePair::token1Call {}.abi_encode();
        let output = self.call_contract(pair, calldata).await?;
        decode::<IPancakePair::token1Call>("token1", &output)
    }

    async fn pair_reserves(&self, pair: Address) -> Result<PairReserves, FetchError> {
        let calldata = IPancakePair::getReservesCall {}.abi_encode();
        let output = self.call_contract(pair, calldata).await?;
        let reserves = decode::<IPancakePair::getReservesCall>("getReserves", &output)?;

        Ok(PairReserves {
            reserve0: U256::from(reserves.reserve0),
            reserve1: U256::from(reserves.reserve1),
        })
    }

    async fn pair_total_supply(&self, pair: Address) -> Result<U256, FetchError> {
        let calldata = IPancakePair::totalSupplyCall {}.abi_encode();
        let output = self.call_contract(pair, calldata).await?;
        decode::<IPancakePair::totalSupplyCall>("totalSupply", &output)
    }
}
