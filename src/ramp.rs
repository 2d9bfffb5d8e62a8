//! Time-varying pool parameters
//!
//! Stable-swap pools let governance ramp the amplification coefficient
//! linearly between two values over a time window. Swap math has to use the
//! exact value the contract would see at a given block, so interpolation here
//! mirrors the on-chain formula bit for bit:
//!
//! ```text
//! a0 + (a1 - a0) * (now - t0) / (t1 - t0)     when a1 > a0
//! a0 - (a0 - a1) * (now - t0) / (t1 - t0)     otherwise
//! ```
//!
//! Integer division floors the delta, so the result always rounds toward the
//! initial value (Saddle `AmplificationUtils._getAPrecise`, Balancer V3
//! `StablePool._computeAmplificationValue`).

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// A coefficient ramping linearly from `initial_value` at `initial_time` to
/// `future_value` at `future_time`. Values are stored in the contract's
/// precise (scaled by `precision`) representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmplificationParameter {
    #[serde(with = "crate::entity::decimal")]
    pub initial_value: U256,
    #[serde(with = "crate::entity::decimal")]
    pub future_value: U256,
    pub initial_time: u64,
    pub future_time: u64,
    #[serde(with = "crate::entity::decimal")]
    pub precision: U256,
}

/// Snapshot of an amplification parameter at one timestamp, in the shape
/// `getAmplificationParameter()` returns on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmplificationValue {
    pub value: U256,
    pub is_updating: bool,
    pub precision: U256,
}

impl AmplificationParameter {
    pub fn new(
        initial_value: U256,
        future_value: U256,
        initial_time: u64,
        future_time: u64,
        precision: U256,
    ) -> Self {
        Self {
            initial_value,
            future_value,
            initial_time,
            future_time,
            precision,
        }
    }

    /// A parameter that is not ramping
    pub fn constant(value: U256, precision: U256) -> Self {
        Self::new(value, value, 0, 0, precision)
    }

    /// Precise value at `timestamp`
    pub fn value_at(&self, timestamp: u64) -> U256 {
        if timestamp >= self.future_time {
            return self.future_value;
        }
        if timestamp <= self.initial_time {
            return self.initial_value;
        }

        // initial_time < timestamp < future_time, so span > 0
        let elapsed = U256::from(timestamp - self.initial_time);
        let span = U256::from(self.future_time - self.initial_time);

        if self.future_value > self.initial_value {
            let delta = (self.future_value - self.initial_value) * elapsed / span;
            self.initial_value + delta
        } else {
            let delta = (self.initial_value - self.future_value) * elapsed / span;
            self.initial_value - delta
        }
    }

    /// Unscaled coefficient at `timestamp` (`value_at / precision`)
    pub fn a_at(&self, timestamp: u64) -> U256 {
        let value = self.value_at(timestamp);
        if self.precision.is_zero() {
            value
        } else {
            value / self.precision
        }
    }

    pub fn is_updating(&self, timestamp: u64) -> bool {
        self.initial_value != self.future_value
            && timestamp >= self.initial_time
            && timestamp < self.future_time
    }

    pub fn current(&self, timestamp: u64) -> AmplificationValue {
        AmplificationValue {
            value: self.value_at(timestamp),
            is_updating: self.is_updating(timestamp),
            precision: self.precision,
        }
    }
}
