//! `sol!` bindings for the Balancer entry points that add and remove pool
//! liquidity. Only the functions needed to encode calls are declared.

alloy::sol! {
    /// Balancer V2 Vault. Every V2 pool joins and exits through it.
    #[derive(Debug, PartialEq, Eq)]
    interface BalancerV2Vault {
        struct JoinPoolRequest {
            address[] assets;
            uint256[] maxAmountsIn;
            bytes userData;
            bool fromInternalBalance;
        }

        struct ExitPoolRequest {
            address[] assets;
            uint256[] minAmountsOut;
            bytes userData;
            bool toInternalBalance;
        }

        function joinPool(
            bytes32 poolId,
            address sender,
            address recipient,
            JoinPoolRequest request
        ) external payable;

        function exitPool(
            bytes32 poolId,
            address sender,
            address recipient,
            ExitPoolRequest request
        ) external;
    }
}

alloy::sol! {
    /// Balancer V3 Router. Liquidity operations on V3 pools are routed through
    /// it and settled by the V3 Vault.
    #[derive(Debug, PartialEq, Eq)]
    interface BalancerV3Router {
        function initialize(
            address pool,
            address[] tokens,
            uint256[] exactAmountsIn,
            uint256 minBptAmountOut,
            bool wethIsEth,
            bytes userData
        ) external payable returns (uint256 bptAmountOut);

        function addLiquidityUnbalanced(
            address pool,
            uint256[] exactAmountsIn,
            uint256 minBptAmountOut,
            bool wethIsEth,
            bytes userData
        ) external payable returns (uint256 bptAmountOut);

        function addLiquiditySingleTokenExactOut(
            address pool,
            address tokenIn,
            uint256 maxAmountIn,
            uint256 exactBptAmountOut,
            bool wethIsEth,
            bytes userData
        ) external payable returns (uint256 amountIn);

        function addLiquidityProportional(
            address pool,
            uint256[] maxAmountsIn,
            uint256 exactBptAmountOut,
            bool wethIsEth,
            bytes userData
        ) external payable returns (uint256[] amountsIn);

        function removeLiquidityProportional(
            address pool,
            uint256 exactBptAmountIn,
            uint256[] minAmountsOut,
            bool wethIsEth,
            bytes userData
        ) external payable returns (uint256[] amountsOut);

        function removeLiquiditySingleTokenExactIn(
            address pool,
            uint256 exactBptAmountIn,
            address tokenOut,
            uint256 minAmountOut,
            bool wethIsEth,
            bytes userData
        ) external payable returns (uint256 amountOut);

        function removeLiquiditySingleTokenExactOut(
            address pool,
            uint256 maxBptAmountIn,
            address tokenOut,
            uint256 exactAmountOut,
            bool wethIsEth,
            bytes userData
        ) external payable returns (uint256 bptAmountIn);

        function removeLiquidityRecovery(
            address pool,
            uint256 exactBptAmountIn,
            uint256[] minAmountsOut
        ) external payable returns (uint256[] amountsOut);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::{Address, Bytes, U256},
            sol_types::SolCall,
        },
    };

    #[test]
    fn join_pool_selector() {
        // keccak256("joinPool(bytes32,address,address,(address[],uint256[],bytes,bool))")
        assert_eq!(
            BalancerV2Vault::joinPoolCall::SELECTOR,
            hex_literal::hex!("b95cac28")
        );
        assert_eq!(
            BalancerV2Vault::exitPoolCall::SELECTOR,
            hex_literal::hex!("8bdb3913")
        );
    }

    #[test]
    fn router_call_roundtrips_through_abi() {
        let call = BalancerV3Router::addLiquidityUnbalancedCall {
            pool: Address::repeat_byte(0x11),
            exactAmountsIn: vec![U256::from(1), U256::from(2)],
            minBptAmountOut: U256::from(3),
            wethIsEth: true,
            userData: Bytes::new(),
        };
        let encoded = call.abi_encode();
        assert_eq!(&encoded[..4], BalancerV3Router::addLiquidityUnbalancedCall::SELECTOR);

        let decoded = BalancerV3Router::addLiquidityUnbalancedCall::abi_decode(&encoded).unwrap();
        assert_eq!(decoded, call);
    }
}
