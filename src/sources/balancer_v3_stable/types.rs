use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

use super::DEX_TYPE;
use crate::entity::PoolExtra;
use crate::ramp::AmplificationParameter;

sol! {
    #[derive(Debug)]
    interface IVaultExplorer {
        struct LiquidityManagement {
            bool disableUnbalancedLiquidity;
            bool enableAddLiquidityCustom;
            bool enableRemoveLiquidityCustom;
            bool enableDonation;
        }

        struct PoolConfig {
            LiquidityManagement liquidityManagement;
            uint256 staticSwapFeePercentage;
            uint256 aggregateSwapFeePercentage;
            uint256 aggregateYieldFeePercentage;
            uint40 tokenDecimalDiffs;
            uint32 pauseWindowEndTime;
            bool isPoolRegistered;
            bool isPoolInitialized;
            bool isPoolPaused;
            bool isPoolInRecoveryMode;
        }

        struct HooksConfig {
            bool enableHookAdjustedAmounts;
            bool shouldCallBeforeInitialize;
            bool shouldCallAfterInitialize;
            bool shouldCallComputeDynamicSwapFee;
            bool shouldCallBeforeSwap;
            bool shouldCallAfterSwap;
            bool shouldCallBeforeAddLiquidity;
            bool shouldCallAfterAddLiquidity;
            bool shouldCallBeforeRemoveLiquidity;
            bool shouldCallAfterRemoveLiquidity;
            address hooksContract;
        }

        struct TokenInfo {
            uint8 tokenType;
            address rateProvider;
            bool paysYieldFees;
        }

        function getPoolConfig(address pool) external view returns (PoolConfig memory);
        function getHooksConfig(address pool) external view returns (HooksConfig memory);
        function getPoolTokenRates(address pool) external view returns (
            uint256[] memory decimalScalingFactors,
            uint256[] memory tokenRates
        );
        function getCurrentLiveBalances(address pool) external view returns (
            uint256[] memory balancesLiveScaled18
        );
        function getPoolTokenInfo(address pool) external view returns (
            address[] memory tokens,
            TokenInfo[] memory tokenInfo,
            uint256[] memory balancesRaw,
            uint256[] memory lastBalancesLiveScaled18
        );
        function isVaultPaused() external view returns (bool);
    }

    #[derive(Debug)]
    interface IStablePool {
        struct AmplificationState {
            uint64 startValue;
            uint64 endValue;
            uint32 startTime;
            uint32 endTime;
        }

        function getAmplificationState() external view returns (
            AmplificationState memory amplificationState,
            uint256 precision
        );
    }
}

/// Hook flags a swap simulation needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksConfig {
    pub enable_hook_adjusted_amounts: bool,
    pub should_call_compute_dynamic_swap_fee: bool,
    pub should_call_before_swap: bool,
    pub should_call_after_swap: bool,
    pub should_call_before_add_liquidity: bool,
    pub should_call_after_add_liquidity: bool,
    pub should_call_before_remove_liquidity: bool,
    pub should_call_after_remove_liquidity: bool,
    pub hooks_contract: Address,
}

impl From<IVaultExplorer::HooksConfig> for HooksConfig {
    fn from(h: IVaultExplorer::HooksConfig) -> Self {
        Self {
            enable_hook_adjusted_amounts: h.enableHookAdjustedAmounts,
            should_call_compute_dynamic_swap_fee: h.shouldCallComputeDynamicSwapFee,
            should_call_before_swap: h.shouldCallBeforeSwap,
            should_call_after_swap: h.shouldCallAfterSwap,
            should_call_before_add_liquidity: h.shouldCallBeforeAddLiquidity,
            should_call_after_add_liquidity: h.shouldCallAfterAddLiquidity,
            should_call_before_remove_liquidity: h.shouldCallBeforeRemoveLiquidity,
            should_call_after_remove_liquidity: h.shouldCallAfterRemoveLiquidity,
            hooks_contract: h.hooksContract,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extra {
    pub hooks_config: HooksConfig,
    #[serde(with = "crate::entity::decimal")]
    pub static_swap_fee_percentage: U256,
    #[serde(with = "crate::entity::decimal")]
    pub aggregate_swap_fee_percentage: U256,
    /// A at the block the state was read at, scaled by the ramp's precision
    #[serde(with = "crate::entity::decimal")]
    pub amplification_parameter: U256,
    pub amplification_ramp: AmplificationParameter,
    #[serde(with = "crate::entity::decimal::vec")]
    pub balances_live_scaled18: Vec<U256>,
    #[serde(with = "crate::entity::decimal::vec")]
    pub decimal_scaling_factors: Vec<U256>,
    #[serde(with = "crate::entity::decimal::vec")]
    pub token_rates: Vec<U256>,
    pub is_vault_paused: bool,
    pub is_pool_paused: bool,
    pub is_pool_in_recovery_mode: bool,
}

impl PoolExtra for Extra {
    const POOL_TYPE: &'static str = DEX_TYPE;
}

impl Extra {
    /// Swaps revert while either the vault or the pool is paused
    pub fn is_paused(&self) -> bool {
        self.is_vault_paused || self.is_pool_paused
    }
}

/// Recorded once at discovery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticExtra {
    pub vault: Address,
    #[serde(default)]
    pub default_hook: String,
    #[serde(default)]
    pub is_pool_initialized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Pool;
    use alloy_primitives::address;

    fn typical() -> Extra {
        Extra {
            hooks_config: HooksConfig {
                should_call_compute_dynamic_swap_fee: true,
                hooks_contract: address!("0000000000000000000000000000000000001234"),
                ..Default::default()
            },
            static_swap_fee_percentage: U256::from(1_000_000_000_000_000u64),
            aggregate_swap_fee_percentage: U256::from(500_000_000_000_000_000u64),
            amplification_parameter: U256::from(200_000u64),
            amplification_ramp: AmplificationParameter::constant(
                U256::from(200_000u64),
                U256::from(1_000u64),
            ),
            balances_live_scaled18: vec![U256::MAX, U256::ZERO],
            decimal_scaling_factors: vec![U256::from(1u64), U256::from(1_000_000_000_000u64)],
            token_rates: vec![U256::from(10u64).pow(U256::from(18u64)); 2],
            is_vault_paused: false,
            is_pool_paused: true,
            is_pool_in_recovery_mode: false,
        }
    }

    #[test]
    fn test_extra_round_trip() {
        let saturated = Extra {
            hooks_config: HooksConfig {
                enable_hook_adjusted_amounts: true,
                should_call_compute_dynamic_swap_fee: true,
                should_call_before_swap: true,
                should_call_after_swap: true,
                should_call_before_add_liquidity: true,
                should_call_after_add_liquidity: true,
                should_call_before_remove_liquidity: true,
                should_call_after_remove_liquidity: true,
                hooks_contract: Address::repeat_byte(0xff),
            },
            static_swap_fee_percentage: U256::MAX,
            aggregate_swap_fee_percentage: U256::MAX,
            amplification_parameter: U256::MAX,
            amplification_ramp: AmplificationParameter::new(
                U256::MAX,
                U256::MAX,
                u64::MAX,
                u64::MAX,
                U256::MAX,
            ),
            balances_live_scaled18: vec![U256::MAX; 8],
            decimal_scaling_factors: vec![U256::MAX; 8],
            token_rates: vec![U256::MAX; 8],
            is_vault_paused: true,
            is_pool_paused: true,
            is_pool_in_recovery_mode: true,
        };

        for extra in [Extra::default(), typical(), saturated] {
            let mut pool = Pool::new(Address::ZERO, DEX_TYPE, vec![]);
            pool.set_extra(&extra).unwrap();
            assert_eq!(pool.decode_extra::<Extra>().unwrap(), extra);
        }
        assert!(typical().is_paused());
        assert!(!Extra::default().is_paused());
    }

    #[test]
    fn test_integers_are_decimal_strings() {
        let json = serde_json::to_string(&typical()).unwrap();
        assert!(json.contains(r#""staticSwapFeePercentage":"1000000000000000""#));
        assert!(json.contains(r#""decimalScalingFactors":["1","1000000000000"]"#));
        assert!(!json.contains("0x0de0b6b3a7640000"));
    }

    #[test]
    fn test_static_extra_defaults() {
        let s: StaticExtra =
            serde_json::from_str(r#"{"vault":"0xbA1333333333a1BA1108E8412f11850A5C319bA9"}"#)
                .unwrap();
        assert_eq!(s.vault, address!("bA1333333333a1BA1108E8412f11850A5C319bA9"));
        assert!(s.default_hook.is_empty());
        assert!(!s.is_pool_initialized);
    }
}
