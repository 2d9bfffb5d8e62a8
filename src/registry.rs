//! Protocol registry
//!
//! Maps a protocol type id to the constructor of its tracker. The registry is
//! an ordinary value built once at startup; `sources::register_all` is the
//! single place protocols are added, in a fixed order.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::DexConfig;
use crate::error::RegistryError;
use crate::multicall::MulticallClient;
use crate::sources;
use crate::tracker::PoolTracker;

/// Builds a tracker for one configured source
pub type TrackerFactory = fn(DexConfig, Arc<MulticallClient>) -> Arc<dyn PoolTracker>;

#[derive(Default)]
pub struct TrackerRegistry {
    factories: BTreeMap<String, TrackerFactory>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in protocol
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        sources::register_all(&mut registry)?;
        Ok(registry)
    }

    /// Register `pool_type`. Registering an id twice is an error.
    pub fn register(
        &mut self,
        pool_type: &str,
        factory: TrackerFactory,
    ) -> Result<(), RegistryError> {
        if self.factories.contains_key(pool_type) {
            return Err(RegistryError::AlreadyRegistered(pool_type.to_string()));
        }
        debug!("Registered tracker for {}", pool_type);
        self.factories.insert(pool_type.to_string(), factory);
        Ok(())
    }

    /// Replace (or add) the factory for `pool_type`, returning the old one
    pub fn register_override(
        &mut self,
        pool_type: &str,
        factory: TrackerFactory,
    ) -> Option<TrackerFactory> {
        self.factories.insert(pool_type.to_string(), factory)
    }

    pub fn resolve(&self, pool_type: &str) -> Result<TrackerFactory, RegistryError> {
        self.factories
            .get(pool_type)
            .copied()
            .ok_or_else(|| RegistryError::UnsupportedProtocol(pool_type.to_string()))
    }

    /// Resolve `config.pool_type` and build its tracker
    pub fn build(
        &self,
        config: DexConfig,
        client: Arc<MulticallClient>,
    ) -> Result<Arc<dyn PoolTracker>, RegistryError> {
        let factory = self.resolve(&config.pool_type)?;
        Ok(factory(config, client))
    }

    pub fn contains(&self, pool_type: &str) -> bool {
        self.factories.contains_key(pool_type)
    }

    /// Registered ids, sorted
    pub fn pool_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
