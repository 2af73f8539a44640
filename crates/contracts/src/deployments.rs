//! Canonical deployment addresses per chain.

use {
    alloy::primitives::{Address, address},
    chain::Chain,
};

/// The V2 Vault is deployed at the same address on every supported chain.
pub const BALANCER_V2_VAULT: Address = address!("BA12222222228d8Ba445958a75a0704d566BF2C8");

/// The V3 Vault is deployed at the same address on every chain where V3 is
/// live.
pub const BALANCER_V3_VAULT: Address = address!("bA1333333333a1BA1108E8412f11850A5C319bA9");

pub fn balancer_v2_vault(chain: Chain) -> Option<Address> {
    match chain {
        Chain::Mainnet
        | Chain::Gnosis
        | Chain::Sepolia
        | Chain::ArbitrumOne
        | Chain::Base
        | Chain::Avalanche
        | Chain::Bnb
        | Chain::Optimism
        | Chain::Polygon => Some(BALANCER_V2_VAULT),
    }
}

/// Router used for V3 liquidity operations. `None` where V3 is not deployed.
pub fn balancer_v3_router(chain: Chain) -> Option<Address> {
    match chain {
        Chain::Mainnet => Some(address!("5C6fb490BDFD3246EB0bB062c168DeCAF4bD9FDd")),
        Chain::Gnosis | Chain::ArbitrumOne | Chain::Base => {
            Some(address!("84813aA3e079A665C0B80F944427eE83cBA63617"))
        }
        Chain::Sepolia
        | Chain::Avalanche
        | Chain::Bnb
        | Chain::Optimism
        | Chain::Polygon => None,
    }
}

/// Wrapped native token (WETH9 or its per-chain equivalent).
pub fn wrapped_native_token(chain: Chain) -> Address {
    match chain {
        Chain::Mainnet => address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        Chain::Gnosis => address!("e91D153E0b41518A2Ce8Dd3D7944Fa863463a97d"),
        Chain::Sepolia => address!("fFf9976782d46CC05630D1f6eBAb18b2324d6B14"),
        Chain::ArbitrumOne => address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
        Chain::Base | Chain::Optimism => address!("4200000000000000000000000000000000000006"),
        Chain::Avalanche => address!("B31f66AA3C1e785363F0875A1B74E27b85FD66c7"),
        Chain::Bnb => address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
        Chain::Polygon => address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_chain_has_a_v2_vault_and_wrapped_native_token() {
        for chain in Chain::all() {
            assert_eq!(balancer_v2_vault(chain), Some(BALANCER_V2_VAULT));
            assert!(!wrapped_native_token(chain).is_zero());
        }
    }

    #[test]
    fn v3_router_only_where_deployed() {
        assert!(balancer_v3_router(Chain::Mainnet).is_some());
        assert!(balancer_v3_router(Chain::Polygon).is_none());
    }
}
