use alloy_primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use super::types::{Extra, ISwapFlashLoan};
use super::DEX_TYPE;
use crate::config::DexConfig;
use crate::entity::Pool;
use crate::error::{BatchError, TrackerError};
use crate::multicall::{
    BatchResults, CallContext, CallHandle, ExecutionMode, IMulticall3, MulticallClient,
};
use crate::sources::IERC20;
use crate::tracker::{now_unix, PoolTracker};

pub struct SaddleTracker {
    config: DexConfig,
    client: Arc<MulticallClient>,
}

struct Calls {
    balances: Vec<CallHandle<ISwapFlashLoan::getTokenBalanceCall>>,
    swap_storage: CallHandle<ISwapFlashLoan::swapStorageCall>,
    lp_supply: CallHandle<IERC20::totalSupplyCall>,
    block_number: CallHandle<IMulticall3::getBlockNumberCall>,
}

struct RpcResult {
    balances: Vec<U256>,
    swap_storage: ISwapFlashLoan::swapStorageReturn,
    lp_supply: U256,
    block_number: Option<u64>,
}

impl Calls {
    /// Every pool read is required; the first missing one fails the refresh.
    /// The block number is optional.
    fn decode(&self, results: &BatchResults) -> Result<RpcResult, BatchError> {
        let balances = self
            .balances
            .iter()
            .map(|h| results.decode(h))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RpcResult {
            balances,
            swap_storage: results.decode(&self.swap_storage)?,
            lp_supply: results.decode(&self.lp_supply)?,
            block_number: results
                .try_decode(&self.block_number)
                .map(|n| n.saturating_to()),
        })
    }
}

impl SaddleTracker {
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
impl PoolTracker for SaddleTracker {
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

        let lp_token = pool
            .lp_token()
            .ok_or_else(|| TrackerError::invalid(pool.address, "static extra has no lpToken"))?;
        if pool.tokens.len() > usize::from(u8::MAX) + 1 {
            return Err(TrackerError::invalid(
                pool.address,
                format!("{} tokens exceed uint8 indexing", pool.tokens.len()),
            ));
        }

        let mut batch = self.client.new_batch(ctx);
        let calls = Calls {
            balances: (0..pool.tokens.len())
                .map(|i| {
                    batch.add_call(
                        pool.address,
                        ISwapFlashLoan::getTokenBalanceCall { index: i as u8 },
                    )
                })
                .collect(),
            swap_storage: batch.add_call(pool.address, ISwapFlashLoan::swapStorageCall {}),
            lp_supply: batch.add_call(lp_token, IERC20::totalSupplyCall {}),
            block_number: batch.add_call(
                self.client.multicall_address(),
                IMulticall3::getBlockNumberCall {},
            ),
        };

        let results = self
            .client
            .execute(batch, ExecutionMode::BestEffort)
            .await
            .map_err(|e| self.batch_error(pool, e))?;
        let rpc = calls
            .decode(&results)
            .map_err(|e| self.batch_error(pool, e))?;

        let extra = Extra::from_swap_storage(&rpc.swap_storage);

        let mut reserves: Vec<String> = rpc.balances.iter().map(U256::to_string).collect();
        reserves.push(rpc.lp_supply.to_string());

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
        next.reserves = reserves;
        next.block_number = rpc.block_number.unwrap_or_default();
        next.timestamp = now_unix();

        info!(
            "[{}] Finish getting new state of pool: {:?}",
            self.config.dex_id, pool.address
        );
        Ok(next)
    }
}
