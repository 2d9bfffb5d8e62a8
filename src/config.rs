//! Tracker configuration
//!
//! Loaded from environment variables (with `.env` support) or a TOML file.
//! Each liquidity source gets a `DexConfig`; the dex id labels logs and
//! picks the config a pool's tracker is built with.

use alloy_primitives::Address;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::multicall::MULTICALL3;

// ============================================
// PER-SOURCE CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexConfig {
    /// Source name, e.g. "saddle" or a fork such as "nerve"
    pub dex_id: String,
    /// Protocol type id the source's pools are tracked with
    pub pool_type: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Max pools a discovery pass may add (consumed by discovery)
    #[serde(default = "default_new_pool_limit")]
    pub new_pool_limit: usize,
}

fn default_chain_id() -> u64 {
    1
}

fn default_new_pool_limit() -> usize {
    100
}

impl DexConfig {
    pub fn new(dex_id: impl Into<String>, pool_type: impl Into<String>) -> Self {
        Self {
            dex_id: dex_id.into(),
            pool_type: pool_type.into(),
            chain_id: default_chain_id(),
            new_pool_limit: default_new_pool_limit(),
        }
    }
}

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC URL used for all batched reads
    pub rpc_url: String,

    /// Chain ID (1 = Ethereum Mainnet)
    pub chain_id: u64,

    /// Multicall3 deployment used to aggregate reads
    pub multicall_address: Address,

    /// Upper bound on one batch round trip
    pub request_timeout_secs: u64,

    /// Configured liquidity sources
    #[serde(default)]
    pub dexes: Vec<DexConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "https://eth.llamarpc.com".to_string(),
            chain_id: 1,
            multicall_address: MULTICALL3,
            request_timeout_secs: 10,
            dexes: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let chain_id = env::var("CHAIN_ID")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);

        let multicall_address = match env::var("MULTICALL_ADDRESS") {
            Ok(s) => s
                .parse()
                .map_err(|e| eyre!("Invalid MULTICALL_ADDRESS {}: {}", s, e))?,
            Err(_) => defaults.multicall_address,
        };

        let dexes = match env::var("DEXES") {
            Ok(s) => Self::parse_dexes(&s, chain_id)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            rpc_url: env::var("RPC_URL").unwrap_or(defaults.rpc_url),
            chain_id,
            multicall_address,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            dexes,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Parse `dexId:poolType,dexId:poolType` pairs
    fn parse_dexes(raw: &str, chain_id: u64) -> Result<Vec<DexConfig>> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| -> Result<DexConfig> {
                let (dex_id, pool_type) = entry
                    .split_once(':')
                    .ok_or_else(|| eyre!("Invalid DEXES entry '{}', expected dexId:poolType", entry))?;
                Ok(DexConfig {
                    chain_id,
                    ..DexConfig::new(dex_id.trim(), pool_type.trim())
                })
            })
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Config for `dex_id`, or a default one tracking `pool_type`
    pub fn dex(&self, dex_id: &str, pool_type: &str) -> DexConfig {
        self.dexes
            .iter()
            .find(|d| d.dex_id == dex_id)
            .cloned()
            .unwrap_or_else(|| DexConfig {
                chain_id: self.chain_id,
                ..DexConfig::new(dex_id, pool_type)
            })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(eyre!("RPC_URL must be set"));
        }
        if self.request_timeout_secs == 0 {
            return Err(eyre!("REQUEST_TIMEOUT_SECS must be greater than zero"));
        }
        if self.multicall_address == Address::ZERO {
            return Err(eyre!("MULTICALL_ADDRESS cannot be the zero address"));
        }
        for (i, dex) in self.dexes.iter().enumerate() {
            if self.dexes[..i].iter().any(|d| d.dex_id == dex.dex_id) {
                return Err(eyre!("Duplicate dex id '{}'", dex.dex_id));
            }
            if dex.chain_id != self.chain_id {
                return Err(eyre!(
                    "Dex '{}' is configured for chain {} but tracker runs on chain {}",
                    dex.dex_id,
                    dex.chain_id,
                    self.chain_id
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rpc = if self.rpc_url.chars().count() > 50 {
            format!("{}...", self.rpc_url.chars().take(50).collect::<String>())
        } else {
            self.rpc_url.clone()
        };
        writeln!(f, "RPC:       {}", rpc)?;
        writeln!(f, "Chain:     {}", self.chain_id)?;
        writeln!(f, "Multicall: {:?}", self.multicall_address)?;
        writeln!(f, "Timeout:   {}s", self.request_timeout_secs)?;
        write!(f, "Dexes:     {}", self.dexes.len())
    }
}
