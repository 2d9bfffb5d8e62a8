//! MuteSwitch (zkSync) volatile/stable pairs
//!
//! Reads `getReserves()`, `pairFee()` and the Multicall3 block number in one
//! fail-fast batch: a pair that misses any of them is not refreshed at all.

mod tracker;
mod types;

pub use tracker::MuteSwitchTracker;
pub use types::{Extra, IMuteSwitchPair};

use std::sync::Arc;

use crate::config::DexConfig;
use crate::error::RegistryError;
use crate::multicall::MulticallClient;
use crate::registry::TrackerRegistry;
use crate::tracker::PoolTracker;

pub const DEX_TYPE: &str = "muteswitch";

/// `pairFee()` is expressed in basis points of this denominator
pub const BPS: u64 = 10_000;

pub fn register(registry: &mut TrackerRegistry) -> Result<(), RegistryError> {
    registry.register(DEX_TYPE, new_tracker)
}

fn new_tracker(config: DexConfig, client: Arc<MulticallClient>) -> Arc<dyn PoolTracker> {
    Arc::new(MuteSwitchTracker::new(config, client))
}
