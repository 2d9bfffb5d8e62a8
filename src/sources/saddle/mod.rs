//! Saddle StableSwap pools (and forks sharing `SwapFlashLoan`)
//!
//! One refresh reads `N + 3` values in a single batch:
//! - `getTokenBalance(i)` for every pool token
//! - `swapStorage()` for the amplification ramp and fees
//! - `totalSupply()` on the LP token
//! - `getBlockNumber()` on Multicall3 (optional, 0 when unreadable)
//!
//! Reserves are the token balances followed by the LP supply.

mod tracker;
mod types;

pub use tracker::SaddleTracker;
pub use types::{Extra, ISwapFlashLoan};

use std::sync::Arc;

use crate::config::DexConfig;
use crate::error::RegistryError;
use crate::multicall::MulticallClient;
use crate::registry::TrackerRegistry;
use crate::tracker::PoolTracker;

pub const DEX_TYPE: &str = "saddle";

/// `SwapUtils.A_PRECISION`: A values in swap storage are scaled by this
pub const A_PRECISION: u64 = 100;

/// Reserves carry one trailing entry: the LP token supply
pub const RESERVE_SUFFIX: usize = 1;

pub fn register(registry: &mut TrackerRegistry) -> Result<(), RegistryError> {
    registry.register(DEX_TYPE, new_tracker)
}

fn new_tracker(config: DexConfig, client: Arc<MulticallClient>) -> Arc<dyn PoolTracker> {
    Arc::new(SaddleTracker::new(config, client))
}
