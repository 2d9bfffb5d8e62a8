//! Transport seam: one `eth_call` against a block, with optional state
//! overrides. `RpcCaller` is the alloy-provider implementation.

use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_rpc_types::state::StateOverride;
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;

use crate::error::TransportError;

#[async_trait]
pub trait EthCaller: Send + Sync {
    async fn eth_call(
        &self,
        to: Address,
        input: Bytes,
        block: BlockId,
        overrides: Option<&StateOverride>,
    ) -> Result<Bytes, TransportError>;
}

/// `eth_call` through an alloy provider
pub struct RpcCaller<P> {
    provider: P,
}

impl<P: Provider> RpcCaller<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> EthCaller for RpcCaller<P>
where
    P: Provider + Send + Sync,
{
    async fn eth_call(
        &self,
        to: Address,
        input: Bytes,
        block: BlockId,
        overrides: Option<&StateOverride>,
    ) -> Result<Bytes, TransportError> {
        let tx = TransactionRequest::default().to(to).input(input.into());

        let mut call = self.provider.call(tx).block(block);
        if let Some(overrides) = overrides {
            call = call.overrides(overrides.clone());
        }

        call.await
            .map_err(|e| TransportError::new(format!("eth_call failed: {}", e)))
    }
}
