use alloy_primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use super::types::{Extra, IMuteSwitchPair};
use super::DEX_TYPE;
use crate::config::DexConfig;
use crate::entity::Pool;
use crate::error::{BatchError, TrackerError};
use crate::multicall::{CallContext, ExecutionMode, IMulticall3, MulticallClient};
use crate::tracker::{now_unix, PoolTracker};

pub struct MuteSwitchTracker {
    config: DexConfig,
    client: Arc<MulticallClient>,
}

impl MuteSwitchTracker {
    pub fn new(config: DexConfig, client: Arc<MulticallClient>) -> Self {
        Self { config, client }
    }

    fn batch_error(&self, pool: &Pool, err: BatchError) -> TrackerError {
        error!(
            "[{}] Failed to aggregate RPC requests for pool {:?}: {}",
            self.config.dex_id, pool.address, err
        );
        TrackerError::batch(pool.address, err)
    }
}

#[async_trait]
impl PoolTracker for MuteSwitchTracker {
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

        if pool.tokens.len() != 2 {
            return Err(TrackerError::invalid(
                pool.address,
                format!("pair must have 2 tokens, got {}", pool.tokens.len()),
            ));
        }

        let mut batch = self.client.new_batch(ctx);
        let reserves_call = batch.add_call(pool.address, IMuteSwitchPair::getReservesCall {});
        let fee_call = batch.add_call(pool.address, IMuteSwitchPair::pairFeeCall {});
        let block_call = batch.add_call(
            self.client.multicall_address(),
            IMulticall3::getBlockNumberCall {},
        );

        let results = self
            .client
            .execute(batch, ExecutionMode::FailFast)
            .await
            .map_err(|e| self.batch_error(pool, e))?;
        let reserves = results
            .decode(&reserves_call)
            .map_err(|e| self.batch_error(pool, e))?;
        let pair_fee = results
            .decode(&fee_call)
            .map_err(|e| self.batch_error(pool, e))?;
        let block_number: u64 = results
            .decode(&block_call)
            .map_err(|e| self.batch_error(pool, e))?
            .saturating_to();

        let extra = Extra {
            pair_fee,
            block_timestamp_last: reserves.blockTimestampLast,
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
        next.reserves = vec![
            U256::from(reserves.reserve0.to::<u128>()).to_string(),
            U256::from(reserves.reserve1.to::<u128>()).to_string(),
        ];
        next.block_number = block_number;
        next.timestamp = now_unix();

        info!(
            "[{}] Finish getting new state of pool: {:?}",
            self.config.dex_id, pool.address
        );
        Ok(next)
    }
}
