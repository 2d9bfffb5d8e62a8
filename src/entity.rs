//! Pool entity - the shared data contract every tracker reads and writes
//!
//! A pool is created by discovery (out of scope here) and mutated only by
//! producing a refreshed copy in a tracker. Protocol-specific state lives in
//! the opaque `extra` blob, tagged by `pool_type`.

use alloy_primitives::{Address, U256};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::ExtraError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolToken {
    pub address: Address,
    #[serde(default = "default_swappable")]
    pub swappable: bool,
}

fn default_swappable() -> bool {
    true
}

impl PoolToken {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            swappable: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub address: Address,
    /// Dex id the pool was discovered under (labels logs, selects config)
    #[serde(default)]
    pub exchange: String,
    /// Protocol type id; also the tag of `extra`
    #[serde(rename = "type")]
    pub pool_type: String,
    pub tokens: Vec<PoolToken>,
    /// Decimal-string integers, parallel to `tokens` plus a protocol suffix
    #[serde(default)]
    pub reserves: Vec<String>,
    #[serde(default)]
    pub extra: String,
    #[serde(default)]
    pub static_extra: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub block_number: u64,
}

/// Protocol-specific Extra schema stored on a pool.
///
/// The schema is versioned by `POOL_TYPE`: a blob is only ever decoded by
/// the type whose tag matches the pool.
pub trait PoolExtra: Serialize + DeserializeOwned {
    const POOL_TYPE: &'static str;
}

/// Controlling contract and the block a pool's state was read at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetaInfo {
    pub vault: Address,
    pub block_number: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommonStaticExtra {
    #[serde(default)]
    lp_token: Option<Address>,
    #[serde(default)]
    vault: Option<Address>,
}

impl Pool {
    pub fn new(address: Address, pool_type: impl Into<String>, tokens: Vec<Address>) -> Self {
        Self {
            address,
            pool_type: pool_type.into(),
            tokens: tokens.into_iter().map(PoolToken::new).collect(),
            ..Default::default()
        }
    }

    pub fn token_addresses(&self) -> Vec<Address> {
        self.tokens.iter().map(|t| t.address).collect()
    }

    /// Parsed reserve at `index`
    pub fn reserve(&self, index: usize) -> Option<U256> {
        self.reserves.get(index)?.parse().ok()
    }

    /// Decode this pool's Extra as `E`, refusing blobs tagged for another protocol
    pub fn decode_extra<E: PoolExtra>(&self) -> Result<E, ExtraError> {
        if self.pool_type != E::POOL_TYPE {
            return Err(ExtraError::TagMismatch {
                expected: E::POOL_TYPE,
                found: self.pool_type.clone(),
            });
        }
        Ok(serde_json::from_str(&self.extra)?)
    }

    /// Serialize `extra` into this pool, tagging it with the protocol type
    pub fn set_extra<E: PoolExtra>(&mut self, extra: &E) -> Result<(), serde_json::Error> {
        let encoded = serde_json::to_string(extra)?;
        self.pool_type = E::POOL_TYPE.to_string();
        self.extra = encoded;
        Ok(())
    }

    pub fn decode_static_extra<S: DeserializeOwned>(&self) -> Result<S, serde_json::Error> {
        serde_json::from_str(&self.static_extra)
    }

    /// LP token recorded at discovery, if the protocol has one
    pub fn lp_token(&self) -> Option<Address> {
        self.decode_static_extra::<CommonStaticExtra>()
            .ok()
            .and_then(|s| s.lp_token)
    }

    /// The vault recorded at discovery, or the pool itself for protocols
    /// whose pool contract holds the funds.
    pub fn meta_info(&self) -> PoolMetaInfo {
        let vault = self
            .decode_static_extra::<CommonStaticExtra>()
            .ok()
            .and_then(|s| s.vault)
            .unwrap_or(self.address);

        PoolMetaInfo {
            vault,
            block_number: self.block_number,
        }
    }
}

/// Serde adapter storing `U256` as a decimal string (`"10000"`, not `"0x2710"`),
/// the format Extra blobs are exchanged in. Use with `#[serde(with = ...)]`.
pub mod decimal {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<U256>()
            .map_err(|e| serde::de::Error::custom(format!("invalid integer '{}': {}", s, e)))
    }

    /// Same, for lists
    pub mod vec {
        use alloy_primitives::U256;
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            values: &[U256],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for value in values {
                seq.serialize_element(&value.to_string())?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<U256>, D::Error> {
            Vec::<String>::deserialize(deserializer)?
                .into_iter()
                .map(|s| {
                    s.parse::<U256>().map_err(|e| {
                        serde::de::Error::custom(format!("invalid integer '{}': {}", s, e))
                    })
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct DummyExtra {
        fee: U256,
    }

    impl PoolExtra for DummyExtra {
        const POOL_TYPE: &'static str = "dummy";
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct OtherExtra {
        fee: U256,
    }

    impl PoolExtra for OtherExtra {
        const POOL_TYPE: &'static str = "other";
    }

    fn pool() -> Pool {
        Pool::new(
            address!("bEbc44782C7dB0a1A60Cb6fe97d0b483032FF1C7"),
            "dummy",
            vec![
                address!("6B175474E89094C44Da98b954EedcdeCB5BE3830"),
                address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            ],
        )
    }

    #[test]
    fn test_extra_round_trip_is_tagged() {
        let mut p = pool();
        let extra = DummyExtra {
            fee: U256::from(4_000_000u64),
        };
        p.set_extra(&extra).unwrap();

        assert_eq!(p.pool_type, "dummy");
        assert_eq!(p.decode_extra::<DummyExtra>().unwrap(), extra);
    }

    #[test]
    fn test_decode_refuses_foreign_tag() {
        let mut p = pool();
        p.set_extra(&DummyExtra { fee: U256::ZERO }).unwrap();

        let err = p.decode_extra::<OtherExtra>().unwrap_err();
        assert!(matches!(
            err,
            ExtraError::TagMismatch { expected: "other", .. }
        ));
    }

    #[test]
    fn test_static_extra_lookups() {
        let mut p = pool();
        assert_eq!(p.lp_token(), None);
        assert_eq!(p.meta_info().vault, p.address);

        p.static_extra = r#"{"lpToken":"0x6c3F90f043a72FA612cbac8115EE7e52BDe6E490"}"#.to_string();
        assert_eq!(
            p.lp_token(),
            Some(address!("6c3F90f043a72FA612cbac8115EE7e52BDe6E490"))
        );

        p.static_extra = r#"{"vault":"0xbA1333333333a1BA1108E8412f11850A5C319bA9"}"#.to_string();
        p.block_number = 21_000_000;
        let meta = p.meta_info();
        assert_eq!(meta.vault, address!("bA1333333333a1BA1108E8412f11850A5C319bA9"));
        assert_eq!(meta.block_number, 21_000_000);
    }

    #[test]
    fn test_pool_json_shape() {
        let json = r#"{
            "address": "0xbEbc44782C7dB0a1A60Cb6fe97d0b483032FF1C7",
            "exchange": "saddle",
            "type": "saddle",
            "tokens": [{"address": "0x6B175474E89094C44Da98b954EedcdeCB5BE3830"}],
            "reserves": ["1000000", "5"]
        }"#;
        let p: Pool = serde_json::from_str(json).unwrap();

        assert_eq!(p.pool_type, "saddle");
        assert!(p.tokens[0].swappable);
        assert_eq!(p.reserve(0), Some(U256::from(1_000_000u64)));
        assert_eq!(p.reserve(2), None);
        assert_eq!(p.timestamp, 0);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Amounts {
        #[serde(with = "decimal")]
        amount: U256,
        #[serde(with = "decimal::vec")]
        balances: Vec<U256>,
    }

    #[test]
    fn test_decimal_integers() {
        let amounts = Amounts {
            amount: U256::from(10_000u64),
            balances: vec![U256::ZERO, U256::MAX],
        };
        let json = serde_json::to_string(&amounts).unwrap();
        assert_eq!(
            json,
            format!(r#"{{"amount":"10000","balances":["0","{}"]}}"#, U256::MAX)
        );
        assert_eq!(serde_json::from_str::<Amounts>(&json).unwrap(), amounts);

        assert!(serde_json::from_str::<Amounts>(r#"{"amount":"1.5","balances":[]}"#).is_err());
    }
}
