pub mod eth;
pub mod operation;
pub mod output;
pub mod pool;

pub use {
    eth::{InputAmount, Token, TokenAmount},
    operation::{
        AddLiquidityInput,
        AddLiquidityKind,
        AddKind,
        RemoveLiquidityInput,
        RemoveLiquidityKind,
        RemoveKind,
    },
    output::{
        AddLiquidityBoundedOutput,
        AddLiquidityBuildOutput,
        AddLiquidityQueryOutput,
        RemoveLiquidityBoundedOutput,
        RemoveLiquidityBuildOutput,
        RemoveLiquidityQueryOutput,
    },
    pool::{
        AmplificationParameter,
        PoolId,
        PoolState,
        PoolToken,
        PoolType,
        ProtocolTokenList,
        ProtocolVersion,
        UserFacingTokenList,
    },
};
