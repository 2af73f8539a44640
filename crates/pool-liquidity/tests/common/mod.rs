//! Pool fixtures shared by the integration tests.

#![allow(dead_code)]

use {
    alloy::primitives::{Address, U256, address},
    pool_liquidity::{
        domain::{
            AmplificationParameter,
            InputAmount,
            PoolId,
            PoolState,
            PoolToken,
            PoolType,
            ProtocolTokenList,
            ProtocolVersion,
        },
        index,
        math::fixed_point::Bfp,
    },
};

pub const POOL: Address = address!("1111111111111111111111111111111111111111");
pub const TOKEN_A: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const TOKEN_B: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
/// Mainnet WETH.
pub const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

pub fn init_tracing() {
    observe::tracing::initialize_reentrant("pool_liquidity=debug");
}

pub fn e18(units: u64) -> U256 {
    U256::from(units) * U256::from(10).pow(U256::from(18))
}

pub fn rpc_url() -> url::Url {
    "http://localhost:8545".parse().unwrap()
}

pub fn token(address: Address, index: usize, balance: U256) -> PoolToken {
    PoolToken {
        address,
        decimals: 18,
        index,
        balance,
        weight: None,
        price_rate: Bfp::one(),
    }
}

pub fn amount(address: Address, raw_amount: U256) -> InputAmount {
    InputAmount::new(address, 18, raw_amount)
}

/// Composable stable pool listing its share token first: `[BPT, A, B]`.
pub fn composable_stable() -> PoolState {
    index::normalize(PoolState {
        id: PoolId(
            "0x1111111111111111111111111111111111111111000000000000000000000001"
                .parse()
                .unwrap(),
        ),
        address: POOL,
        pool_type: PoolType::ComposableStable,
        protocol_version: ProtocolVersion::V2,
        tokens: ProtocolTokenList::new(vec![
            token(POOL, 0, e18(1_000_000_000)),
            token(TOKEN_A, 1, e18(1_000)),
            token(TOKEN_B, 2, e18(1_000)),
        ]),
        total_shares: e18(2_000),
        swap_fee: "0.0001".parse().unwrap(),
        amplification: Some(
            AmplificationParameter::try_new(U256::from(1_000), U256::from(1)).unwrap(),
        ),
    })
    .unwrap()
}

/// [`composable_stable`] registered with the V3 Vault.
pub fn composable_stable_v3() -> PoolState {
    PoolState {
        id: PoolId::from_address(POOL),
        protocol_version: ProtocolVersion::V3,
        ..composable_stable()
    }
}

/// 80/20 weighted pool holding WETH.
pub fn weighted(protocol_version: ProtocolVersion) -> PoolState {
    index::normalize(PoolState {
        id: match protocol_version {
            ProtocolVersion::V2 => PoolId(
                "0x1111111111111111111111111111111111111111000200000000000000000002"
                    .parse()
                    .unwrap(),
            ),
            ProtocolVersion::V3 => PoolId::from_address(POOL),
        },
        address: POOL,
        pool_type: PoolType::Weighted,
        protocol_version,
        tokens: ProtocolTokenList::new(vec![
            PoolToken {
                weight: Some("0.8".parse().unwrap()),
                ..token(TOKEN_A, 0, e18(8_000))
            },
            PoolToken {
                weight: Some("0.2".parse().unwrap()),
                ..token(WETH, 1, e18(2))
            },
        ]),
        total_shares: e18(10_000),
        swap_fee: "0.003".parse().unwrap(),
        amplification: None,
    })
    .unwrap()
}

pub fn gyro2() -> PoolState {
    PoolState {
        pool_type: PoolType::Gyro2,
        tokens: ProtocolTokenList::new(vec![
            token(TOKEN_A, 0, e18(500)),
            token(TOKEN_B, 1, e18(500)),
        ]),
        ..weighted(ProtocolVersion::V2)
    }
}
