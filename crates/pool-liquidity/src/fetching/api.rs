//! Balancer API client. Pool state is read with the GraphQL `poolGetPool`
//! query, which reports balances and supplies as human readable decimals.

use {
    super::PoolStateFetching,
    crate::{
        domain::{
            AmplificationParameter,
            PoolId,
            PoolState,
            PoolToken,
            PoolType,
            ProtocolTokenList,
            ProtocolVersion,
        },
        index,
        math::{fixed_point::Bfp, stable::AMP_PRECISION},
    },
    alloy::primitives::{Address, B256},
    anyhow::{Context, Result},
    bigdecimal::BigDecimal,
    chain::Chain,
    reqwest::{Client, Url},
    serde::{Deserialize, Serialize},
    serde_json::json,
    serde_with::{DisplayFromStr, serde_as},
    tracing::debug,
};

/// Chains as named by the Balancer API.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub enum GqlChain {
    MAINNET,
    GNOSIS,
    ARBITRUM,
    POLYGON,
    BASE,
    AVALANCHE,
    OPTIMISM,
    BSC,
    SEPOLIA,
}

impl From<Chain> for GqlChain {
    fn from(chain: Chain) -> Self {
        match chain {
            Chain::Mainnet => Self::MAINNET,
            Chain::Gnosis => Self::GNOSIS,
            Chain::ArbitrumOne => Self::ARBITRUM,
            Chain::Polygon => Self::POLYGON,
            Chain::Base => Self::BASE,
            Chain::Avalanche => Self::AVALANCHE,
            Chain::Optimism => Self::OPTIMISM,
            Chain::Bnb => Self::BSC,
            Chain::Sepolia => Self::SEPOLIA,
        }
    }
}

pub struct BalancerApiClient {
    client: Client,
    url: Url,
    chain: GqlChain,
}

impl BalancerApiClient {
    pub fn new(url: Url, client: Client, chain: Chain) -> Self {
        Self {
            client,
            url,
            chain: chain.into(),
        }
    }

    async fn query<T>(&self, query: &str, variables: serde_json::Value) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response: Response<T> = self
            .client
            .post(self.url.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .context("Balancer API request failed")?
            .error_for_status()?
            .json()
            .await
            .context("invalid Balancer API response")?;
        if let Some(error) = response.errors.first() {
            anyhow::bail!("Balancer API error: {}", error.message);
        }
        response.data.context("Balancer API response without data")
    }
}

#[async_trait::async_trait]
impl PoolStateFetching for BalancerApiClient {
    async fn fetch_pool_state(&self, id: PoolId) -> Result<PoolState> {
        use self::pool_query::*;

        let pool = self
            .query::<Data>(
                QUERY,
                json!({
                    "id": api_id(&id),
                    "chain": self.chain,
                }),
            )
            .await?
            .pool_get_pool;
        debug!(%id, pool_type = %pool.pool_type, tokens = pool.pool_tokens.len(), "fetched pool");
        pool.into_pool_state()
    }
}

/// V3 pools are queried by address, V2 pools by their full Vault id.
fn api_id(id: &PoolId) -> String {
    if id.0[20..].iter().all(|byte| *byte == 0) {
        Address::from_slice(&id.0[..20]).to_string()
    } else {
        id.0.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct Response<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolData {
    pub id: String,
    #[serde_as(as = "DisplayFromStr")]
    pub address: Address,
    #[serde(rename = "type")]
    pub pool_type: PoolType,
    pub protocol_version: ProtocolVersion,
    pub pool_tokens: Vec<Token>,
    pub dynamic_data: DynamicData,
    /// Amplification parameter of stable pools, without precision.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub amp: Option<BigDecimal>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DynamicData {
    #[serde_as(as = "DisplayFromStr")]
    pub total_shares: BigDecimal,
    #[serde_as(as = "DisplayFromStr")]
    pub swap_fee: Bfp,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub index: usize,
    #[serde_as(as = "DisplayFromStr")]
    pub address: Address,
    pub decimals: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: BigDecimal,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub weight: Option<Bfp>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub price_rate: Option<Bfp>,
}

impl PoolData {
    /// Converts the API representation into normalised pool state with raw
    /// amounts.
    pub fn into_pool_state(self) -> Result<PoolState> {
        let id = match self.protocol_version {
            ProtocolVersion::V2 => self
                .id
                .parse::<B256>()
                .with_context(|| format!("invalid V2 pool id {}", self.id))?,
            ProtocolVersion::V3 => PoolId::from_address(self.address).0,
        };
        let tokens = self
            .pool_tokens
            .into_iter()
            .map(|token| {
                Ok(PoolToken {
                    address: token.address,
                    decimals: token.decimals,
                    index: token.index,
                    balance: number::units::to_raw_truncating(&token.balance, token.decimals)
                        .with_context(|| format!("invalid balance of token {}", token.address))?,
                    weight: token.weight,
                    price_rate: token.price_rate.unwrap_or_else(Bfp::one),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let amplification = self
            .amp
            .map(|amp| {
                let precision = number::conversions::u256_to_big_decimal(&AMP_PRECISION);
                let factor = number::units::to_raw_truncating(&(amp * precision), 0)?;
                AmplificationParameter::try_new(factor, AMP_PRECISION)
            })
            .transpose()?;

        let pool = PoolState {
            id: PoolId(id),
            address: self.address,
            pool_type: self.pool_type,
            protocol_version: self.protocol_version,
            tokens: ProtocolTokenList::new(tokens),
            total_shares: number::units::to_raw_truncating(&self.dynamic_data.total_shares, 18)
                .context("invalid total shares")?,
            swap_fee: self.dynamic_data.swap_fee,
            amplification,
        };
        Ok(index::normalize(pool)?)
    }
}

mod pool_query {
    use serde::Deserialize;

    pub const QUERY: &str = r#"
        query PoolGetPool($id: String!, $chain: GqlChain!) {
            poolGetPool(id: $id, chain: $chain) {
                id
                address
                type
                protocolVersion
                poolTokens {
                    index
                    address
                    decimals
                    balance
                    weight
                    priceRate
                }
                dynamicData {
                    totalShares
                    swapFee
                }
                ... on GqlPoolStable {
                    amp
                }
                ... on GqlPoolComposableStable {
                    amp
                }
            }
        }
    "#;

    #[derive(Debug, Deserialize)]
    pub struct Data {
        #[serde(rename = "poolGetPool")]
        pub pool_get_pool: super::PoolData,
    }
}
