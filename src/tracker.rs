//! Protocol tracker contract
//!
//! A tracker turns a pool entity into a freshly read copy of itself: one
//! batched read, decoded into the protocol's Extra, reserves rebuilt and
//! timestamp stamped. The input pool is borrowed and never touched, so a
//! failed refresh leaves the caller's snapshot exactly as it was.

use alloy_rpc_types::state::StateOverride;
use async_trait::async_trait;
use futures::future::join_all;

use crate::entity::Pool;
use crate::error::TrackerError;
use crate::multicall::CallContext;

#[async_trait]
pub trait PoolTracker: Send + Sync {
    /// Protocol type id this tracker understands
    fn pool_type(&self) -> &'static str;

    async fn get_new_pool_state(&self, pool: &Pool, ctx: &CallContext)
        -> Result<Pool, TrackerError>;

    /// Refresh against counterfactual account state. The overrides only live
    /// for this one batch.
    async fn get_new_pool_state_with_overrides(
        &self,
        pool: &Pool,
        ctx: &CallContext,
        overrides: StateOverride,
    ) -> Result<Pool, TrackerError> {
        let ctx = ctx.clone().with_overrides(overrides);
        self.get_new_pool_state(pool, &ctx).await
    }
}

/// Refresh many pools of one protocol concurrently. One result per pool, in
/// input order; a failing pool never affects the others.
pub async fn refresh_pools(
    tracker: &dyn PoolTracker,
    pools: &[Pool],
    ctx: &CallContext,
) -> Vec<Result<Pool, TrackerError>> {
    join_all(pools.iter().map(|p| tracker.get_new_pool_state(p, ctx))).await
}

/// Current wall-clock time in epoch seconds, used to stamp refreshed pools
pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
