use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::types::{Extra, HooksConfig, IStablePool, IVaultExplorer, StaticExtra};
use super::DEX_TYPE;
use crate::config::DexConfig;
use crate::entity::Pool;
use crate::error::{BatchError, TrackerError};
use crate::multicall::{
    Batch, BatchResults, CallContext, CallHandle, ExecutionMode, IMulticall3, MulticallClient,
};
use crate::ramp::AmplificationParameter;
use crate::tracker::{now_unix, PoolTracker};

pub struct BalancerV3StableTracker {
    config: DexConfig,
    client: Arc<MulticallClient>,
}

// ============================================
// BATCHED READS
// ============================================

struct Calls {
    pool_config: CallHandle<IVaultExplorer::getPoolConfigCall>,
    hooks_config: CallHandle<IVaultExplorer::getHooksConfigCall>,
    token_rates: CallHandle<IVaultExplorer::getPoolTokenRatesCall>,
    live_balances: CallHandle<IVaultExplorer::getCurrentLiveBalancesCall>,
    token_info: CallHandle<IVaultExplorer::getPoolTokenInfoCall>,
    vault_paused: CallHandle<IVaultExplorer::isVaultPausedCall>,
    amplification: CallHandle<IStablePool::getAmplificationStateCall>,
    block_number: CallHandle<IMulticall3::getBlockNumberCall>,
    block_timestamp: CallHandle<IMulticall3::getCurrentBlockTimestampCall>,
}

struct RpcResult {
    tokens: Vec<Address>,
    balances_raw: Vec<U256>,
    pool_config: IVaultExplorer::PoolConfig,
    hooks_config: HooksConfig,
    decimal_scaling_factors: Vec<U256>,
    token_rates: Vec<U256>,
    balances_live_scaled18: Vec<U256>,
    is_vault_paused: bool,
    amplification: AmplificationParameter,
    block_number: Option<u64>,
    block_timestamp: Option<u64>,
}

impl Calls {
    fn add(batch: &mut Batch, vault: Address, pool: Address, multicall: Address) -> Self {
        Self {
            pool_config: batch.add_call(vault, IVaultExplorer::getPoolConfigCall { pool }),
            hooks_config: batch.add_call(vault, IVaultExplorer::getHooksConfigCall { pool }),
            token_rates: batch.add_call(vault, IVaultExplorer::getPoolTokenRatesCall { pool }),
            live_balances: batch
                .add_call(vault, IVaultExplorer::getCurrentLiveBalancesCall { pool }),
            token_info: batch.add_call(vault, IVaultExplorer::getPoolTokenInfoCall { pool }),
            vault_paused: batch.add_call(vault, IVaultExplorer::isVaultPausedCall {}),
            amplification: batch.add_call(pool, IStablePool::getAmplificationStateCall {}),
            block_number: batch.add_call(multicall, IMulticall3::getBlockNumberCall {}),
            block_timestamp: batch
                .add_call(multicall, IMulticall3::getCurrentBlockTimestampCall {}),
        }
    }

    /// Pool config, rates, balances, token info and the A ramp are required.
    /// Hooks, the vault pause flag and block info fall back to defaults.
    fn decode(&self, results: &BatchResults) -> Result<RpcResult, BatchError> {
        let pool_config = results.decode(&self.pool_config)?;
        let rates = results.decode(&self.token_rates)?;
        let balances_live_scaled18 = results.decode(&self.live_balances)?;
        let info = results.decode(&self.token_info)?;
        let amp = results.decode(&self.amplification)?;

        let state = amp.amplificationState;
        let amplification = AmplificationParameter::new(
            U256::from(state.startValue),
            U256::from(state.endValue),
            u64::from(state.startTime),
            u64::from(state.endTime),
            amp.precision,
        );

        Ok(RpcResult {
            tokens: info.tokens,
            balances_raw: info.balancesRaw,
            pool_config,
            hooks_config: results
                .try_decode(&self.hooks_config)
                .map(HooksConfig::from)
                .unwrap_or_default(),
            decimal_scaling_factors: rates.decimalScalingFactors,
            token_rates: rates.tokenRates,
            balances_live_scaled18,
            is_vault_paused: results.try_decode(&self.vault_paused).unwrap_or_default(),
            amplification,
            block_number: results
                .try_decode(&self.block_number)
                .map(|n| n.saturating_to()),
            block_timestamp: results
                .try_decode(&self.block_timestamp)
                .map(|t| t.saturating_to()),
        })
    }
}

impl RpcResult {
    /// Every per-token array must line up with the pool's token order
    fn check_shape(&self, pool: &Pool) -> Result<(), String> {
        if self.tokens != pool.token_addresses() {
            return Err("vault token list does not match pool tokens".to_string());
        }

        let n = self.tokens.len();
        for (name, len) in [
            ("balancesRaw", self.balances_raw.len()),
            ("balancesLiveScaled18", self.balances_live_scaled18.len()),
            ("decimalScalingFactors", self.decimal_scaling_factors.len()),
            ("tokenRates", self.token_rates.len()),
        ] {
            if len != n {
                return Err(format!("{} has {} entries for {} tokens", name, len, n));
            }
        }
        Ok(())
    }
}

// ============================================
// TRACKER
// ============================================

impl BalancerV3StableTracker {
    pub fn new(config: DexConfig, client: Arc<MulticallClient>) -> Self {
        Self { config, client }
    }

    fn batch_error(&self, pool: &Pool, err: BatchError) -> TrackerError {
        error!(
            "[{}] Failed to get new state of pool {:?}: {}",
            self.config.dex_id, pool.address, err
        );
        TrackerError::batch(pool.address, err)
    }
}

#[async_trait]
impl PoolTracker for BalancerV3StableTracker {
    fn pool_type(&self) -> &'static str {
        DEX_TYPE
    }

    async fn get_new_pool_state(
        &self,
        pool: &Pool,
        ctx: &CallContext,
    ) -> Result<Pool, TrackerError> {
        info!(
            "[{}] Start getting new state of pool: {:?}",
            self.config.dex_id, pool.address
        );

        let static_extra: StaticExtra = pool.decode_static_extra().map_err(|e| {
            TrackerError::invalid(pool.address, format!("bad static extra: {}", e))
        })?;

        let mut batch = self.client.new_batch(ctx);
        let calls = Calls::add(
            &mut batch,
            static_extra.vault,
            pool.address,
            self.client.multicall_address(),
        );

        let results = self
            .client
            .execute(batch, ExecutionMode::BestEffort)
            .await
            .map_err(|e| self.batch_error(pool, e))?;
        let rpc = calls
            .decode(&results)
            .map_err(|e| self.batch_error(pool, e))?;
        rpc.check_shape(pool)
            .map_err(|reason| TrackerError::invalid(pool.address, reason))?;

        let timestamp = now_unix();
        let block_time = rpc
            .block_timestamp
            .unwrap_or_else(|| u64::try_from(timestamp).unwrap_or_default());
        let amplification_parameter = rpc.amplification.value_at(block_time);
        debug!(
            "[{}] Pool {:?} A = {} (precision {})",
            self.config.dex_id, pool.address, amplification_parameter, rpc.amplification.precision
        );

        let extra = Extra {
            hooks_config: rpc.hooks_config,
            static_swap_fee_percentage: rpc.pool_config.staticSwapFeePercentage,
            aggregate_swap_fee_percentage: rpc.pool_config.aggregateSwapFeePercentage,
            amplification_parameter,
            amplification_ramp: rpc.amplification,
            balances_live_scaled18: rpc.balances_live_scaled18,
            decimal_scaling_factors: rpc.decimal_scaling_factors,
            token_rates: rpc.token_rates,
            is_vault_paused: rpc.is_vault_paused,
            is_pool_paused: rpc.pool_config.isPoolPaused,
            is_pool_in_recovery_mode: rpc.pool_config.isPoolInRecoveryMode,
        };

        let mut next = pool.clone();
        next.set_extra(&extra).map_err(|source| {
            error!(
                "[{}] Failed to marshal extra data of pool {:?}: {}",
                self.config.dex_id, pool.address, source
            );
            TrackerError::Serialization {
                pool: pool.address,
                source,
            }
        })?;
        next.reserves = rpc.balances_raw.iter().map(U256::to_string).collect();
        // unknown block: never pair fresh reserves with the input's block
        next.block_number = rpc.block_number.unwrap_or_default();
        next.timestamp = timestamp;

        info!(
            "[{}] Finish getting new state of pool: {:?}",
            self.config.dex_id, pool.address
        );
        Ok(next)
    }
}
