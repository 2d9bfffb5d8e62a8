use alloy_primitives::U256;
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

use super::{BPS, DEX_TYPE};
use crate::entity::PoolExtra;

sol! {
    #[derive(Debug)]
    interface IMuteSwitchPair {
        function getReserves() external view returns (
            uint112 reserve0,
            uint112 reserve1,
            uint32 blockTimestampLast
        );

        function pairFee() external view returns (uint256);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extra {
    /// Swap fee in basis points, kept as the raw integer
    #[serde(with = "crate::entity::decimal")]
    pub pair_fee: U256,
    /// Last block timestamp the pair's reserves changed at
    #[serde(default)]
    pub block_timestamp_last: u32,
}

impl PoolExtra for Extra {
    const POOL_TYPE: &'static str = DEX_TYPE;
}

impl Extra {
    /// Fee as an exact `(numerator, denominator)` ratio
    pub fn swap_fee(&self) -> (U256, U256) {
        (self.pair_fee, U256::from(BPS))
    }

    /// Apply the fee to `amount_in`, rounding the fee down
    pub fn amount_after_fee(&self, amount_in: U256) -> U256 {
        let (num, den) = self.swap_fee();
        amount_in.saturating_sub(amount_in.saturating_mul(num) / den)
    }
}
