//! Pool Tracker - batched on-chain state refresh for AMM pools
//!
//! Each supported protocol has a tracker that reads a pool's live state in a
//! single Multicall3 round trip and returns a refreshed copy of the pool
//! entity: reserves, protocol-specific `extra`, block number and timestamp.
//!
//! Components:
//! - `multicall`: typed read batches, fail-fast or best-effort, pinned to a
//!   block with optional state overrides, timeout and cancellation
//! - `entity`: the pool record shared with discovery and pricing
//! - `tracker`: the per-protocol refresh contract
//! - `sources`: Saddle, MuteSwitch and Balancer V3 stable trackers
//! - `registry`: protocol type id to tracker constructor
//! - `ramp`: amplification coefficient ramps

pub mod config;
pub mod entity;
pub mod error;
pub mod multicall;
pub mod ramp;
pub mod registry;
pub mod sources;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, DexConfig};
pub use entity::{Pool, PoolExtra, PoolMetaInfo, PoolToken};
pub use error::{BatchError, ExtraError, RegistryError, TrackerError, TransportError};
pub use multicall::{CallContext, ExecutionMode, MulticallClient};
pub use ramp::AmplificationParameter;
pub use registry::TrackerRegistry;
pub use tracker::{refresh_pools, PoolTracker};
