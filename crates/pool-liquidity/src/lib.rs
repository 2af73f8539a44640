//! Off-chain counterpart of Balancer V2 and V3 liquidity operations: given a
//! pool's state it computes the expected amounts of adding or removing
//! liquidity, bounds them by a slippage tolerance and encodes the call that
//! executes the operation on-chain.

pub mod build;
pub mod config;
pub mod domain;
pub mod fetching;
pub mod index;
pub mod math;
pub mod query;
pub mod slippage;
pub mod validation;

use {
    build::{AddLiquidityBuildParams, BuildError, Contracts, RemoveLiquidityBuildParams},
    domain::{
        AddLiquidityBuildOutput,
        AddLiquidityInput,
        AddLiquidityQueryOutput,
        PoolId,
        PoolState,
        RemoveLiquidityBuildOutput,
        RemoveLiquidityInput,
        RemoveLiquidityQueryOutput,
    },
    fetching::PoolStateFetching,
    query::QueryError,
    slippage::{Slippage, SlippageError},
    tracing::instrument,
    validation::ValidationError,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    InvalidPoolState(#[from] index::InvalidPoolState),
    #[error(transparent)]
    Slippage(#[from] SlippageError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Adds liquidity to a pool: validate and query, then bound and build.
/// Pools are normalized before querying, so amounts come back in protocol
/// token order.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddLiquidity;

impl AddLiquidity {
    #[instrument(name = "add_liquidity_query", skip_all, fields(pool = %pool.address))]
    pub fn query(
        &self,
        input: &AddLiquidityInput,
        pool: &PoolState,
    ) -> Result<AddLiquidityQueryOutput, Error> {
        validation::validate_add(input, pool)?;
        let pool = index::normalize(pool.clone())?;
        Ok(query::query_add(input, &pool)?)
    }

    /// Fetches the pool state and queries it.
    pub async fn query_pool(
        &self,
        fetcher: &dyn PoolStateFetching,
        id: PoolId,
        input: &AddLiquidityInput,
    ) -> anyhow::Result<AddLiquidityQueryOutput> {
        let pool = fetcher.fetch_pool_state(id).await?;
        Ok(self.query(input, &pool)?)
    }

    #[instrument(name = "add_liquidity_build", skip_all, fields(pool = %query.pool_address))]
    pub fn build_call(
        &self,
        query: AddLiquidityQueryOutput,
        slippage: &Slippage,
        params: &AddLiquidityBuildParams,
        contracts: &Contracts,
    ) -> Result<AddLiquidityBuildOutput, Error> {
        let bounded = slippage::apply_add(query, slippage)?;
        Ok(build::build_add(&bounded, params, contracts)?)
    }
}

/// Removes liquidity from a pool: validate and query, then bound and build.
#[derive(Clone, Copy, Debug, Default)]
pub struct RemoveLiquidity;

impl RemoveLiquidity {
    #[instrument(name = "remove_liquidity_query", skip_all, fields(pool = %pool.address))]
    pub fn query(
        &self,
        input: &RemoveLiquidityInput,
        pool: &PoolState,
    ) -> Result<RemoveLiquidityQueryOutput, Error> {
        validation::validate_remove(input, pool)?;
        let pool = index::normalize(pool.clone())?;
        Ok(query::query_remove(input, &pool)?)
    }

    pub async fn query_pool(
        &self,
        fetcher: &dyn PoolStateFetching,
        id: PoolId,
        input: &RemoveLiquidityInput,
    ) -> anyhow::Result<RemoveLiquidityQueryOutput> {
        let pool = fetcher.fetch_pool_state(id).await?;
        Ok(self.query(input, &pool)?)
    }

    #[instrument(name = "remove_liquidity_build", skip_all, fields(pool = %query.pool_address))]
    pub fn build_call(
        &self,
        query: RemoveLiquidityQueryOutput,
        slippage: &Slippage,
        params: &RemoveLiquidityBuildParams,
        contracts: &Contracts,
    ) -> Result<RemoveLiquidityBuildOutput, Error> {
        let bounded = slippage::apply_remove(query, slippage)?;
        Ok(build::build_remove(&bounded, params, contracts)?)
    }
}
