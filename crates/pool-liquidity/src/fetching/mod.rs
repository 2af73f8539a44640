//! Retrieval of the pool state the engine operates on.

pub mod api;

use {
    crate::domain::{PoolId, PoolState},
    anyhow::Result,
};

pub use api::{BalancerApiClient, GqlChain};

/// Fetches the current state of a pool. Implementations return normalised
/// state.
#[mockall::automock]
#[async_trait::async_trait]
pub trait PoolStateFetching: Send + Sync {
    async fn fetch_pool_state(&self, id: PoolId) -> Result<PoolState>;
}
