//! Pool state needed to reproduce the contract math of a liquidity
//! operation.

use {
    super::eth::Token,
    crate::math::fixed_point::Bfp,
    alloy::primitives::{Address, B256, U256},
    anyhow::{Result, ensure},
    serde::{Deserialize, Serialize},
};

/// Unique identifier of a pool. V2 pools use the Vault pool id, V3 pools
/// are identified by their address stored in the leading 20 bytes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, derive_more::Display)]
pub struct PoolId(pub B256);

impl PoolId {
    pub fn from_address(address: Address) -> Self {
        let mut buf = [0_u8; 32];
        buf[..20].copy_from_slice(address.as_slice());
        Self(B256::from(buf))
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum PoolType {
    #[serde(rename = "WEIGHTED")]
    #[strum(serialize = "WEIGHTED")]
    Weighted,
    #[serde(rename = "STABLE")]
    #[strum(serialize = "STABLE")]
    Stable,
    #[serde(rename = "COMPOSABLE_STABLE")]
    #[strum(serialize = "COMPOSABLE_STABLE")]
    ComposableStable,
    #[serde(rename = "GYRO")]
    #[strum(serialize = "GYRO")]
    Gyro2,
    #[serde(rename = "GYRO3")]
    #[strum(serialize = "GYRO3")]
    Gyro3,
    #[serde(rename = "GYROE")]
    #[strum(serialize = "GYROE")]
    GyroE,
    #[serde(rename = "LIQUIDITY_BOOTSTRAPPING")]
    #[strum(serialize = "LIQUIDITY_BOOTSTRAPPING")]
    LiquidityBootstrapping,
}

/// Pool types that share a math implementation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PoolFamily {
    Weighted,
    Stable,
    ComposableStable,
    Gyro,
}

impl PoolType {
    pub fn family(&self) -> PoolFamily {
        match self {
            Self::Weighted | Self::LiquidityBootstrapping => PoolFamily::Weighted,
            Self::Stable => PoolFamily::Stable,
            Self::ComposableStable => PoolFamily::ComposableStable,
            Self::Gyro2 | Self::Gyro3 | Self::GyroE => PoolFamily::Gyro,
        }
    }

    pub fn is_gyro(&self) -> bool {
        self.family() == PoolFamily::Gyro
    }

    /// Whether the pool lists its own share token among its tokens.
    pub fn has_share_token(&self) -> bool {
        self.family() == PoolFamily::ComposableStable
    }
}

/// On-chain protocol generation. (De)serialised as the integers 2 and 3.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize, strum::Display)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProtocolVersion {
    #[strum(serialize = "v2")]
    V2,
    #[strum(serialize = "v3")]
    V3,
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = anyhow::Error;

    fn try_from(version: u8) -> Result<Self> {
        match version {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => anyhow::bail!("unsupported protocol version {other}"),
        }
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::V2 => 2,
            ProtocolVersion::V3 => 3,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolToken {
    pub address: Address,
    pub decimals: u8,
    /// Position assigned by the protocol.
    pub index: usize,
    /// Raw balance held by the pool.
    pub balance: U256,
    /// Normalized weight, weighted family only.
    pub weight: Option<Bfp>,
    /// Rate of the token's rate provider, one when it has none.
    pub price_rate: Bfp,
}

impl PoolToken {
    pub fn token(&self, chain_id: u64) -> Token {
        Token {
            address: self.address,
            decimals: self.decimals,
            chain_id,
        }
    }
}

/// Tokens in on-chain order, the share token in place for pools that list
/// it.
#[derive(Clone, Debug, Default, Eq, PartialEq, derive_more::Deref)]
pub struct ProtocolTokenList(Vec<PoolToken>);

impl ProtocolTokenList {
    pub fn new(tokens: Vec<PoolToken>) -> Self {
        Self(tokens)
    }

    pub fn into_inner(self) -> Vec<PoolToken> {
        self.0
    }
}

/// Tokens a user interacts with: the protocol list without the share token,
/// indices renumbered from zero.
#[derive(Clone, Debug, Default, Eq, PartialEq, derive_more::Deref)]
pub struct UserFacingTokenList(pub(crate) Vec<PoolToken>);

impl UserFacingTokenList {
    pub fn into_inner(self) -> Vec<PoolToken> {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AmplificationParameter {
    factor: U256,
    precision: U256,
}

impl AmplificationParameter {
    pub fn try_new(factor: U256, precision: U256) -> Result<Self> {
        ensure!(!precision.is_zero(), "Zero precision not allowed");
        Ok(Self { factor, precision })
    }

    /// The parameter expressed with `base` precision, the format the pool
    /// math consumes.
    pub fn with_base(&self, base: U256) -> Option<U256> {
        Some(self.factor.checked_mul(base)? / self.precision)
    }

    pub fn factor(&self) -> U256 {
        self.factor
    }

    pub fn precision(&self) -> U256 {
        self.precision
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub id: PoolId,
    pub address: Address,
    pub pool_type: PoolType,
    pub protocol_version: ProtocolVersion,
    pub tokens: ProtocolTokenList,
    /// Circulating share supply. Excludes the BPT pre-minted to the Vault
    /// for pools that list their own share token.
    pub total_shares: U256,
    pub swap_fee: Bfp,
    pub amplification: Option<AmplificationParameter>,
}

impl PoolState {
    pub fn token(&self, address: Address) -> Option<&PoolToken> {
        self.tokens.iter().find(|token| token.address == address)
    }

    /// The pool's share token (BPT), always 18 decimals.
    pub fn share_token(&self, chain_id: u64) -> Token {
        Token {
            address: self.address,
            decimals: 18,
            chain_id,
        }
    }
}
