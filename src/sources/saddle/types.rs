use alloy_primitives::U256;
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

use super::{A_PRECISION, DEX_TYPE};
use crate::entity::PoolExtra;
use crate::ramp::AmplificationParameter;

sol! {
    #[derive(Debug)]
    interface ISwapFlashLoan {
        function getTokenBalance(uint8 index) external view returns (uint256);

        function swapStorage() external view returns (
            uint256 initialA,
            uint256 futureA,
            uint256 initialATime,
            uint256 futureATime,
            uint256 swapFee,
            uint256 adminFee,
            address lpToken
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extra {
    #[serde(with = "crate::entity::decimal")]
    pub initial_a: U256,
    #[serde(with = "crate::entity::decimal")]
    pub future_a: U256,
    pub initial_a_time: u64,
    pub future_a_time: u64,
    #[serde(with = "crate::entity::decimal")]
    pub swap_fee: U256,
    #[serde(with = "crate::entity::decimal")]
    pub admin_fee: U256,
}

impl PoolExtra for Extra {
    const POOL_TYPE: &'static str = DEX_TYPE;
}

impl Extra {
    pub(super) fn from_swap_storage(storage: &ISwapFlashLoan::swapStorageReturn) -> Self {
        Self {
            initial_a: storage.initialA,
            future_a: storage.futureA,
            initial_a_time: storage.initialATime.saturating_to(),
            future_a_time: storage.futureATime.saturating_to(),
            swap_fee: storage.swapFee,
            admin_fee: storage.adminFee,
        }
    }

    /// The A ramp stored in swap storage (values scaled by `A_PRECISION`)
    pub fn amplification(&self) -> AmplificationParameter {
        AmplificationParameter::new(
            self.initial_a,
            self.future_a,
            self.initial_a_time,
            self.future_a_time,
            U256::from(A_PRECISION),
        )
    }
}
