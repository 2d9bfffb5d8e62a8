//! Error types for the pool-state synchronization layer
//!
//! Every failure is returned to the immediate caller. Nothing in this crate
//! retries or swallows an error; tracker errors always carry the pool address
//! so a scheduler can log or retry at a higher layer.

use alloy_primitives::Address;
use std::time::Duration;
use thiserror::Error;

/// The RPC transport could not complete an `eth_call`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("rpc transport failed: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Failure of one Multicall3 batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("call #{index} to {target} failed")]
    CallFailed { index: usize, target: Address },

    #[error("batch timed out after {0:?}")]
    TimedOut(Duration),

    #[error("batch cancelled")]
    Cancelled,
}

/// Failure decoding an Extra blob stored on a pool
#[derive(Debug, Error)]
pub enum ExtraError {
    #[error("extra tagged `{found}` cannot be decoded as `{expected}`")]
    TagMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("malformed extra: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single pool refresh
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("batch call for pool {pool} failed: {source}")]
    Batch {
        pool: Address,
        #[source]
        source: BatchError,
    },

    #[error("failed to encode extra for pool {pool}: {source}")]
    Serialization {
        pool: Address,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pool {pool}: {reason}")]
    InvalidPool { pool: Address, reason: String },
}

impl TrackerError {
    pub fn batch(pool: Address, source: BatchError) -> Self {
        TrackerError::Batch { pool, source }
    }

    pub fn invalid(pool: Address, reason: impl Into<String>) -> Self {
        TrackerError::InvalidPool {
            pool,
            reason: reason.into(),
        }
    }

    /// Address of the pool whose refresh failed
    pub fn pool(&self) -> Address {
        match self {
            TrackerError::Batch { pool, .. }
            | TrackerError::Serialization { pool, .. }
            | TrackerError::InvalidPool { pool, .. } => *pool,
        }
    }

    /// True when the refresh stopped because the caller cancelled it
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            TrackerError::Batch {
                source: BatchError::Cancelled,
                ..
            }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TrackerError::Batch {
                source: BatchError::TimedOut(_),
                ..
            }
        )
    }
}

/// Protocol registry failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No tracker is registered for this protocol type. Callers should skip
    /// the pool rather than retry.
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("protocol `{0}` is already registered")]
    AlreadyRegistered(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_tracker_error_reports_pool() {
        let pool = address!("bEbc44782C7dB0a1A60Cb6fe97d0b483032FF1C7");
        let err = TrackerError::batch(pool, BatchError::Cancelled);

        assert_eq!(err.pool(), pool);
        assert!(err.is_cancelled());
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("batch cancelled"));
    }

    #[test]
    fn test_timeout_is_not_cancellation() {
        let pool = Address::ZERO;
        let err = TrackerError::batch(pool, BatchError::TimedOut(Duration::from_secs(3)));

        assert!(err.is_timeout());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_unsupported_protocol_message() {
        let err = RegistryError::UnsupportedProtocol("curve-tricrypto".to_string());
        assert_eq!(err.to_string(), "unsupported protocol: curve-tricrypto");
    }
}
