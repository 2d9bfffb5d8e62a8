//! Balancer V3 stable pools
//!
//! Pool state lives in the Vault, so most reads target the vault recorded in
//! the pool's static extra. The amplification ramp is read from the pool
//! itself. Block number and timestamp come from Multicall3 in the same
//! batch, so the stored A value matches the block the balances came from.

mod tracker;
mod types;

pub use tracker::BalancerV3StableTracker;
pub use types::{Extra, HooksConfig, IStablePool, IVaultExplorer, StaticExtra};

use std::sync::Arc;

use crate::config::DexConfig;
use crate::error::RegistryError;
use crate::multicall::MulticallClient;
use crate::registry::TrackerRegistry;
use crate::tracker::PoolTracker;

pub const DEX_TYPE: &str = "balancer-v3-stable";

pub fn register(registry: &mut TrackerRegistry) -> Result<(), RegistryError> {
    registry.register(DEX_TYPE, new_tracker)
}

fn new_tracker(config: DexConfig, client: Arc<MulticallClient>) -> Arc<dyn PoolTracker> {
    Arc::new(BalancerV3StableTracker::new(config, client))
}
