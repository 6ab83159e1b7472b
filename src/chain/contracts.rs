//! Contract ABIs consumed by the reader.
//!
//! Only the view functions we actually call are declared. The registry ABI
//! matches the AutoFarm V2 master contract; the pair ABI is the standard
//! constant-product pair (PancakeSwap / Uniswap V2 layout).

use alloy_sol_types::sol;

sol! {
    /// Farm registry / staking master contract
    interface IAutoFarmV2 {
        function poolLength() external view returns (uint256);

        function poolInfo(uint256 pid) external view returns (
            address want,
            uint256 allocPoint,
            uint256 lastRewardBlock,
            uint256 accAUTOPerShare,
            address strat
        );

        function stakedWantTokens(uint256 pid, address user) external view returns (uint256);

        // Pending reward for `user` in pool `pid`, denominated in the reward token
        function pendingAUTO(uint256 pid, address user) external view returns (uint256);
    }
}

sol! {
    /// Liquidity-pair share token
    interface IPancakePair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function totalSupply() external view returns (uint256);
    }
}
