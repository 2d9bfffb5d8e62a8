//! Batch Call Client - Multicall3 Edition
//!
//! Every pool refresh is a single `eth_call` to Multicall3 `aggregate3`,
//! so all reads for one pool come from the same block.
//!
//! Two execution modes:
//! - `FailFast`: every sub-call has `allowFailure = false`, one failing read
//!   reverts the whole aggregate and nothing is decoded
//! - `BestEffort`: sub-calls may fail individually, callers inspect
//!   per-call success flags

mod batch;
mod caller;
mod context;

pub use batch::{Batch, BatchResults, CallHandle, ExecutionMode, MulticallClient};
pub use caller::{EthCaller, RpcCaller};
pub use context::{CallContext, CancelHandle, CancelSignal};

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// Multicall3 address (same on all EVM chains)
pub const MULTICALL3: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

// ============================================
// MULTICALL3 INTERFACE
// ============================================

sol! {
    /// Multicall3 - deployed at same address on all EVM chains
    #[derive(Debug)]
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls)
            external payable returns (Result[] memory returnData);

        function getBlockNumber() external view returns (uint256 blockNumber);
        function getCurrentBlockTimestamp() external view returns (uint256 timestamp);
    }
}
