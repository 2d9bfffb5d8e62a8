//! Liquidity sources - one tracker per AMM family
//!
//! Adding a protocol means adding a module here with a `register` function
//! and calling it from `register_all`. Nothing else in the crate changes.

pub mod balancer_v3_stable;
pub mod muteswitch;
pub mod saddle;

use alloy_sol_types::sol;

use crate::error::RegistryError;
use crate::registry::TrackerRegistry;

sol! {
    #[derive(Debug)]
    interface IERC20 {
        function totalSupply() external view returns (uint256);
    }
}

/// Register every built-in protocol, in a fixed order
pub fn register_all(registry: &mut TrackerRegistry) -> Result<(), RegistryError> {
    saddle::register(registry)?;
    muteswitch::register(registry)?;
    balancer_v3_stable::register(registry)?;
    Ok(())
}
