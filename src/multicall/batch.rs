//! Typed read batches over Multicall3 `aggregate3`

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

use super::{CallContext, EthCaller, IMulticall3, MULTICALL3};
use crate::error::BatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Any failing read aborts the whole batch; nothing is decoded
    FailFast,
    /// Partial results; per-call success is reported individually
    BestEffort,
}

/// Typed decode sink for one call added to a `Batch`
pub struct CallHandle<C> {
    index: usize,
    target: Address,
    _call: PhantomData<fn() -> C>,
}

impl<C> Clone for CallHandle<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CallHandle<C> {}

impl<C> std::fmt::Debug for CallHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallHandle")
            .field("index", &self.index)
            .field("target", &self.target)
            .finish()
    }
}

impl<C> CallHandle<C> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn target(&self) -> Address {
        self.target
    }
}

struct PendingCall {
    target: Address,
    call_data: Bytes,
    /// Whether raw return data decodes as the call's return type
    decodes: fn(&[u8]) -> bool,
}

fn decodes_as<C: SolCall>(data: &[u8]) -> bool {
    C::abi_decode_returns(data).is_ok()
}

/// A set of reads to be executed as one `eth_call` in one context
pub struct Batch {
    ctx: CallContext,
    calls: Vec<PendingCall>,
}

impl Batch {
    pub fn new(ctx: CallContext) -> Self {
        Self {
            ctx,
            calls: Vec::new(),
        }
    }

    pub fn add_call<C: SolCall>(&mut self, target: Address, call: C) -> CallHandle<C> {
        let index = self.calls.len();
        self.calls.push(PendingCall {
            target,
            call_data: call.abi_encode().into(),
            decodes: decodes_as::<C>,
        });

        CallHandle {
            index,
            target,
            _call: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn context(&self) -> &CallContext {
        &self.ctx
    }
}

#[derive(Debug, Clone)]
struct CallOutcome {
    target: Address,
    success: bool,
    data: Bytes,
}

/// Raw per-call outputs of an executed batch
#[derive(Debug, Clone, Default)]
pub struct BatchResults {
    outcomes: Vec<CallOutcome>,
}

impl BatchResults {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Per-call success flags in submission order
    pub fn success(&self) -> Vec<bool> {
        self.outcomes.iter().map(|o| o.success).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    pub fn decode<C: SolCall>(&self, handle: &CallHandle<C>) -> Result<C::Return, BatchError> {
        let Some(outcome) = self.outcomes.get(handle.index) else {
            return Err(BatchError::CallFailed {
                index: handle.index,
                target: handle.target,
            });
        };
        // a handle from another batch must not read this one's slot
        if outcome.target != handle.target {
            return Err(BatchError::Decode {
                what: "call handle",
                reason: format!(
                    "call #{} targets {:?}, handle expects {:?}",
                    handle.index, outcome.target, handle.target
                ),
            });
        }

        let failed = BatchError::CallFailed {
            index: handle.index,
            target: outcome.target,
        };
        if !outcome.success {
            return Err(failed);
        }
        C::abi_decode_returns(&outcome.data).map_err(|_| failed)
    }

    pub fn try_decode<C: SolCall>(&self, handle: &CallHandle<C>) -> Option<C::Return> {
        self.decode(handle).ok()
    }
}

/// Executes `Batch`es against Multicall3 through an `EthCaller`
#[derive(Clone)]
pub struct MulticallClient {
    caller: Arc<dyn EthCaller>,
    multicall: Address,
}

impl MulticallClient {
    pub fn new(caller: Arc<dyn EthCaller>) -> Self {
        Self {
            caller,
            multicall: MULTICALL3,
        }
    }

    pub fn with_address(mut self, multicall: Address) -> Self {
        self.multicall = multicall;
        self
    }

    pub fn multicall_address(&self) -> Address {
        self.multicall
    }

    pub fn new_batch(&self, ctx: &CallContext) -> Batch {
        Batch::new(ctx.clone())
    }

    pub async fn execute(
        &self,
        batch: Batch,
        mode: ExecutionMode,
    ) -> Result<BatchResults, BatchError> {
        if batch.calls.is_empty() {
            return Ok(BatchResults::default());
        }

        let allow_failure = mode == ExecutionMode::BestEffort;
        let calls: Vec<IMulticall3::Call3> = batch
            .calls
            .iter()
            .map(|c| IMulticall3::Call3 {
                target: c.target,
                allowFailure: allow_failure,
                callData: c.call_data.clone(),
            })
            .collect();

        debug!("Executing {} calls in 1 multicall ({:?})", calls.len(), mode);

        let calldata: Bytes = IMulticall3::aggregate3Call { calls }.abi_encode().into();
        let ctx = &batch.ctx;

        let raw = ctx
            .run(async {
                self.caller
                    .eth_call(self.multicall, calldata, ctx.block, ctx.overrides.as_ref())
                    .await
                    .map_err(BatchError::from)
            })
            .await?;

        let decoded = IMulticall3::aggregate3Call::abi_decode_returns(&raw).map_err(|e| {
            BatchError::Decode {
                what: "aggregate3 result",
                reason: e.to_string(),
            }
        })?;

        if decoded.len() != batch.calls.len() {
            return Err(BatchError::Decode {
                what: "aggregate3 result",
                reason: format!(
                    "expected {} results, got {}",
                    batch.calls.len(),
                    decoded.len()
                ),
            });
        }

        let mut outcomes = Vec::with_capacity(decoded.len());
        for (index, (call, result)) in batch.calls.iter().zip(decoded).enumerate() {
            let success = result.success && (call.decodes)(&result.returnData);

            if !success {
                if mode == ExecutionMode::FailFast {
                    return Err(BatchError::CallFailed {
                        index,
                        target: call.target,
                    });
                }
                trace!("Call #{} to {:?} failed", index, call.target);
            }

            outcomes.push(CallOutcome {
                target: call.target,
                success,
                data: result.returnData,
            });
        }

        Ok(BatchResults { outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{returns, MockCaller, IERC20Mock};
    use alloy_primitives::{address, U256};

    const TOKEN: Address = address!("6B175474E89094C44Da98b954EedcdeCB5BE3830");
    const BROKEN: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");

    fn mock() -> Arc<MockCaller> {
        Arc::new(
            MockCaller::new()
                .on::<IERC20Mock::totalSupplyCall>(TOKEN, returns((U256::from(1_000u64),)))
                .on_fail::<IERC20Mock::totalSupplyCall>(BROKEN),
        )
    }

    #[tokio::test]
    async fn test_empty_batch_skips_rpc() {
        let caller = mock();
        let client = MulticallClient::new(caller.clone());
        let batch = client.new_batch(&CallContext::latest());

        let results = client.execute(batch, ExecutionMode::FailFast).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(caller.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_on_single_failure() {
        let caller = mock();
        let client = MulticallClient::new(caller.clone());
        let mut batch = client.new_batch(&CallContext::latest());
        batch.add_call(TOKEN, IERC20Mock::totalSupplyCall {});
        batch.add_call(BROKEN, IERC20Mock::totalSupplyCall {});

        let err = client.execute(batch, ExecutionMode::FailFast).await.unwrap_err();
        assert!(matches!(err, BatchError::Transport(_)));
        assert_eq!(caller.call_count(), 1);
    }

    #[tokio::test]
    async fn test_best_effort_reports_per_call() {
        let client = MulticallClient::new(mock());
        let mut batch = client.new_batch(&CallContext::latest());
        let ok = batch.add_call(TOKEN, IERC20Mock::totalSupplyCall {});
        let bad = batch.add_call(BROKEN, IERC20Mock::totalSupplyCall {});

        let results = client.execute(batch, ExecutionMode::BestEffort).await.unwrap();
        assert_eq!(results.success(), vec![true, false]);
        assert!(!results.all_succeeded());
        assert_eq!(results.decode(&ok).unwrap(), U256::from(1_000u64));
        assert!(matches!(
            results.decode(&bad),
            Err(BatchError::CallFailed { index: 1, target }) if target == BROKEN
        ));
        assert!(results.try_decode(&bad).is_none());
    }

    #[tokio::test]
    async fn test_handle_from_another_batch_is_rejected() {
        let client = MulticallClient::new(mock());

        let mut first = client.new_batch(&CallContext::latest());
        first.add_call(TOKEN, IERC20Mock::totalSupplyCall {});
        let results = client.execute(first, ExecutionMode::BestEffort).await.unwrap();

        let mut second = client.new_batch(&CallContext::latest());
        let foreign = second.add_call(BROKEN, IERC20Mock::totalSupplyCall {});
        let missing = second.add_call(BROKEN, IERC20Mock::totalSupplyCall {});

        assert!(matches!(
            results.decode(&foreign),
            Err(BatchError::Decode { what: "call handle", .. })
        ));
        assert!(matches!(
            results.decode(&missing),
            Err(BatchError::CallFailed { index: 1, target }) if target == BROKEN
        ));
    }

    #[tokio::test]
    async fn test_undecodable_return_counts_as_failure() {
        // answers with an empty payload, which cannot decode as uint256
        let caller = Arc::new(
            MockCaller::new().on::<IERC20Mock::totalSupplyCall>(TOKEN, Bytes::new()),
        );
        let client = MulticallClient::new(caller);

        let mut batch = client.new_batch(&CallContext::latest());
        batch.add_call(TOKEN, IERC20Mock::totalSupplyCall {});
        let err = client.execute(batch, ExecutionMode::FailFast).await.unwrap_err();
        assert!(matches!(err, BatchError::CallFailed { index: 0, .. }));
    }

    #[tokio::test]
    async fn test_custom_multicall_address_and_block() {
        let custom = address!("000000000000000000000000000000000000cafe");
        let caller = Arc::new(
            MockCaller::new()
                .with_multicall(custom)
                .on::<IERC20Mock::totalSupplyCall>(TOKEN, returns((U256::from(5u64),))),
        );
        let client = MulticallClient::new(caller.clone()).with_address(custom);
        assert_eq!(client.multicall_address(), custom);

        let mut batch = client.new_batch(&CallContext::latest().at_block(123));
        let h = batch.add_call(TOKEN, IERC20Mock::totalSupplyCall {});
        assert_eq!(h.index(), 0);
        assert_eq!(h.target(), TOKEN);

        let results = client.execute(batch, ExecutionMode::FailFast).await.unwrap();
        assert_eq!(results.decode(&h).unwrap(), U256::from(5u64));
        assert_eq!(caller.recorded()[0].block, alloy_eips::BlockId::number(123));
    }
}
