//! Per-refresh call context: which block to read, optional state overrides,
//! and how long the caller is willing to wait.

use alloy_eips::BlockId;
use alloy_rpc_types::state::StateOverride;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

use crate::error::BatchError;

#[derive(Debug, Clone)]
pub struct CallContext {
    pub block: BlockId,
    /// Applied to the single `eth_call` of a batch, never stored
    pub overrides: Option<StateOverride>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelSignal>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self {
            block: BlockId::latest(),
            overrides: None,
            timeout: None,
            cancel: None,
        }
    }
}

impl CallContext {
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn at_block(mut self, number: u64) -> Self {
        self.block = BlockId::number(number);
        self
    }

    pub fn with_overrides(mut self, overrides: StateOverride) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    /// Drive `fut` to completion unless the deadline passes or the caller
    /// cancels first.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T, BatchError>
    where
        F: Future<Output = Result<T, BatchError>>,
    {
        let bounded = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(res) => res,
                    Err(_) => Err(BatchError::TimedOut(limit)),
                },
                None => fut.await,
            }
        };

        match &self.cancel {
            Some(signal) => {
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => Err(BatchError::Cancelled),
                    res = bounded => res,
                }
            }
            None => bounded.await,
        }
    }
}

/// Receiving side of a cancellation flag. Cheap to clone into many contexts.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

/// Owner side: fires every `CancelSignal` created from it
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn new() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle(tx), CancelSignal(rx))
    }

    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal(self.0.subscribe())
    }
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancelled. Never resolves if the handle was dropped
    /// without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.0.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
