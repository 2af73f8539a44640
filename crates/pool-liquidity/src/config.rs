//! TOML configuration. Every field is optional: contract addresses default
//! to the canonical deployments of the chain.

use {
    crate::build::Contracts,
    alloy::primitives::Address,
    anyhow::{Context, Result},
    chain::Chain,
    reqwest::Url,
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    std::path::Path,
};

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Endpoint of the Balancer API used to fetch pool state.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub balancer_api_url: Option<Url>,
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

/// Contract overrides of a single chain.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ChainConfig {
    pub chain_id: u64,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub balancer_v2_vault: Option<Address>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub balancer_v3_router: Option<Address>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub wrapped_native_token: Option<Address>,
}

impl Config {
    /// Contracts of a chain, configured addresses taking precedence over the
    /// canonical deployments.
    pub fn contracts(&self, chain_id: u64) -> Result<Contracts> {
        let overrides = self.chains.iter().find(|chain| chain.chain_id == chain_id);
        let defaults = Chain::try_from(chain_id).ok().map(Contracts::for_chain);

        let wrapped_native_token = overrides
            .and_then(|chain| chain.wrapped_native_token)
            .or(defaults.map(|contracts| contracts.wrapped_native_token))
            .with_context(|| format!("no wrapped native token configured for chain {chain_id}"))?;
        Ok(Contracts {
            chain_id,
            balancer_v2_vault: overrides
                .and_then(|chain| chain.balancer_v2_vault)
                .or(defaults.and_then(|contracts| contracts.balancer_v2_vault)),
            balancer_v3_router: overrides
                .and_then(|chain| chain.balancer_v3_router)
                .or(defaults.and_then(|contracts| contracts.balancer_v3_router)),
            wrapped_native_token,
        })
    }

    pub fn balancer_api_url(&self) -> Url {
        self.balancer_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BALANCER_API_URL.clone())
    }
}

static DEFAULT_BALANCER_API_URL: std::sync::LazyLock<Url> =
    std::sync::LazyLock::new(|| Url::parse("https://api-v3.balancer.fi/").expect("valid url"));

/// Loads the configuration from a TOML file.
pub async fn load(path: &Path) -> Result<Config> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    toml::de::from_str(&data).with_context(|| format!("TOML syntax error while reading {path:?}"))
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[tokio::test]
    async fn loads_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
balancer-api-url = "http://localhost:4000/graphql"

[[chains]]
chain-id = 1
balancer-v3-router = "0x1111111111111111111111111111111111111111"

[[chains]]
chain-id = 31337
wrapped-native-token = "0x2222222222222222222222222222222222222222"
balancer-v2-vault = "0x3333333333333333333333333333333333333333"
"#
        )
        .unwrap();

        let config = load(file.path()).await.unwrap();
        assert_eq!(
            config.balancer_api_url().as_str(),
            "http://localhost:4000/graphql"
        );

        let mainnet = config.contracts(1).unwrap();
        assert_eq!(
            mainnet.balancer_v3_router,
            Some(Address::repeat_byte(0x11))
        );
        assert_eq!(
            mainnet.balancer_v2_vault,
            Some(contracts::deployments::BALANCER_V2_VAULT)
        );
        assert_eq!(
            mainnet.wrapped_native_token,
            contracts::deployments::wrapped_native_token(Chain::Mainnet)
        );

        let local = config.contracts(31337).unwrap();
        assert_eq!(local.wrapped_native_token, Address::repeat_byte(0x22));
        assert_eq!(local.balancer_v2_vault, Some(Address::repeat_byte(0x33)));
        assert_eq!(local.balancer_v3_router, None);

        assert!(config.contracts(12345).is_err());
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.balancer_api_url().as_str(), "https://api-v3.balancer.fi/");
        assert_eq!(
            config.contracts(100).unwrap(),
            Contracts::for_chain(Chain::Gnosis)
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(toml::de::from_str::<Config>("unknown = 1").is_err());
    }

    #[tokio::test]
    async fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("missing.toml")).await.is_err());
    }
}
