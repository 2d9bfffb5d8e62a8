//! Test support: an in-memory Multicall3 that answers sub-calls from
//! registered handlers, so trackers can be exercised end to end without RPC.

use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes};
use alloy_rpc_types::state::StateOverride;
use alloy_sol_types::abi::TokenSeq;
use alloy_sol_types::{sol, SolCall, SolType, SolValue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::TransportError;
use crate::multicall::{EthCaller, IMulticall3, MULTICALL3};

sol! {
    interface IERC20Mock {
        function totalSupply() external view returns (uint256);
    }
}

type Handler = Box<dyn Fn(&[u8], Option<&StateOverride>) -> Option<Bytes> + Send + Sync>;

/// ABI-encode a tuple of return values the way a contract would
pub fn returns<T: SolValue>(values: T) -> Bytes
where
    for<'a> <T::SolType as SolType>::Token<'a>: TokenSeq<'a>,
{
    values.abi_encode_params().into()
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub block: BlockId,
    pub overrides: Option<StateOverride>,
    pub calls: usize,
}

pub struct MockCaller {
    multicall: Address,
    handlers: HashMap<(Address, [u8; 4]), Handler>,
    recorded: Mutex<Vec<RecordedCall>>,
    stall: bool,
}

impl MockCaller {
    pub fn new() -> Self {
        Self {
            multicall: MULTICALL3,
            handlers: HashMap::new(),
            recorded: Mutex::new(Vec::new()),
            stall: false,
        }
    }

    pub fn with_multicall(mut self, multicall: Address) -> Self {
        self.multicall = multicall;
        self
    }

    /// Never answer, as a hung RPC node would
    pub fn stalled(mut self) -> Self {
        self.stall = true;
        self
    }

    pub fn on<C: SolCall>(self, target: Address, ret: Bytes) -> Self {
        self.on_with::<C, _>(target, move |_, _| Some(ret.clone()))
    }

    pub fn on_fail<C: SolCall>(self, target: Address) -> Self {
        self.on_with::<C, _>(target, |_, _| None)
    }

    pub fn on_with<C, F>(mut self, target: Address, handler: F) -> Self
    where
        C: SolCall,
        F: Fn(&[u8], Option<&StateOverride>) -> Option<Bytes> + Send + Sync + 'static,
    {
        self.handlers.insert((target, C::SELECTOR), Box::new(handler));
        self
    }

    pub fn call_count(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl EthCaller for MockCaller {
    async fn eth_call(
        &self,
        to: Address,
        input: Bytes,
        block: BlockId,
        overrides: Option<&StateOverride>,
    ) -> Result<Bytes, TransportError> {
        let decoded = IMulticall3::aggregate3Call::abi_decode(&input)
            .map_err(|e| TransportError::new(format!("bad aggregate3 calldata: {}", e)))?;

        {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.push(RecordedCall {
                block,
                overrides: overrides.cloned(),
                calls: decoded.calls.len(),
            });
        }

        if self.stall {
            std::future::pending::<()>().await;
        }

        if to != self.multicall {
            return Err(TransportError::new(format!("no multicall deployed at {}", to)));
        }

        let mut results = Vec::with_capacity(decoded.calls.len());
        for call in decoded.calls {
            let mut selector = [0u8; 4];
            if call.callData.len() >= 4 {
                selector.copy_from_slice(&call.callData[..4]);
            }

            let answer = self
                .handlers
                .get(&(call.target, selector))
                .and_then(|handler| handler(&call.callData[..], overrides));

            match answer {
                Some(data) => results.push(IMulticall3::Result {
                    success: true,
                    returnData: data,
                }),
                None if call.allowFailure => results.push(IMulticall3::Result {
                    success: false,
                    returnData: Bytes::new(),
                }),
                None => {
                    return Err(TransportError::new(format!(
                        "execution reverted: call to {} (0x{}) failed",
                        call.target,
                        hex::encode(selector)
                    )))
                }
            }
        }

        Ok(returns((results,)))
    }
}
