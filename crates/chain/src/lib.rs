use {
    serde::{Deserialize, Deserializer, Serialize, Serializer},
    std::fmt::{self, Display, Formatter},
    thiserror::Error,
};

/// Represents each available chain
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u64)]
pub enum Chain {
    Mainnet = 1,
    Optimism = 10,
    Bnb = 56,
    Gnosis = 100,
    Polygon = 137,
    Base = 8453,
    ArbitrumOne = 42161,
    Avalanche = 43114,
    Sepolia = 11155111,
}

impl Chain {
    /// Returns the chain's chain ID
    pub fn id(&self) -> u64 {
        *self as u64
    }

    /// Returns the human readable name of the chain.
    pub fn name(&self) -> &'static str {
        // You can find a list of available networks by network and chain id here:
        // https://chainid.network/chains.json
        match &self {
            Self::Mainnet => "Ethereum / Mainnet",
            Self::Optimism => "Optimism",
            Self::Bnb => "BNB",
            Self::Gnosis => "xDAI",
            Self::Polygon => "Polygon",
            Self::Base => "Base",
            Self::ArbitrumOne => "Arbitrum One",
            Self::Avalanche => "Avalanche",
            Self::Sepolia => "Ethereum / Sepolia",
        }
    }

    /// The symbol of the chain's native currency. Users may opt into paying
    /// with (or receiving) this currency instead of its wrapped ERC-20.
    pub fn native_symbol(&self) -> &'static str {
        match &self {
            Self::Mainnet | Self::Optimism | Self::Base | Self::ArbitrumOne | Self::Sepolia => {
                "ETH"
            }
            Self::Bnb => "BNB",
            Self::Gnosis => "xDAI",
            Self::Polygon => "POL",
            Self::Avalanche => "AVAX",
        }
    }

    /// All chains with a known deployment of the supported protocols.
    pub fn all() -> [Self; 9] {
        [
            Self::Mainnet,
            Self::Optimism,
            Self::Bnb,
            Self::Gnosis,
            Self::Polygon,
            Self::Base,
            Self::ArbitrumOne,
            Self::Avalanche,
            Self::Sepolia,
        ]
    }
}

impl TryFrom<u64> for Chain {
    type Error = ChainIdNotSupported;

    /// Initializes `Network` from a chain ID, returns error if the chain id is
    /// not supported
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::all()
            .into_iter()
            .find(|chain| chain.id() == value)
            .ok_or(ChainIdNotSupported(value))
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Chain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.id())
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = u64::deserialize(deserializer)?;
        Self::try_from(id).map_err(serde::de::Error::custom)
    }
}

#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
#[error("chain id {0} is not supported")]
pub struct ChainIdNotSupported(pub u64);
