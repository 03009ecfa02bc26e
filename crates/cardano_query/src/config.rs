//! Resolved query configuration: network, indexer backend, submit endpoint.
//!
//! The value is built once (defaults, JSON file, or environment) and passed
//! explicitly into [`crate::Provider`] and [`crate::QueryClient`].
//!
//! Environment: `CARDANO_TESTNET`, `CARDANO_FORCE_BLOCKFROST`, `CARDANO_GRAPHQL`,
//! `CARDANO_SUBMIT`, `CARDANO_GOSSIP_PEERS` (`;`-separated), `BLOCKFROST_URL`,
//! `BLOCKFROST_PROJECT_ID`.

use crate::provider::Backend;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

pub const DEFAULT_GRAPHQL_MAINNET: &str = "https://graphql-api.mainnet.dandelion.link";
pub const DEFAULT_GRAPHQL_TESTNET: &str = "https://graphql-api.testnet.dandelion.link";
pub const DEFAULT_SUBMIT_MAINNET: &str = "https://adao.panl.org";
pub const DEFAULT_SUBMIT_TESTNET: &str = "https://testrelay1.panl.org";
pub const DEFAULT_BLOCKFROST_MAINNET: &str = "https://cardano-mainnet.blockfrost.io/api/v0";
pub const DEFAULT_BLOCKFROST_TESTNET: &str = "https://cardano-testnet.blockfrost.io/api/v0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid url for {field}: {value:?}")]
    InvalidUrl { field: &'static str, value: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn is_mainnet(self) -> bool {
        matches!(self, Network::Mainnet)
    }
}

/// Exactly one indexer is active at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryApi {
    #[serde(rename = "graphql")]
    GraphQl { uri: String },
    Blockfrost {
        base_url: String,
        /// Sent as the `project_id` header. Leave unset behind a proxy that adds it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project_id: Option<String>,
    },
}

impl QueryApi {
    pub fn backend(&self) -> Backend {
        match self {
            QueryApi::GraphQl { .. } => Backend::GraphQl,
            QueryApi::Blockfrost { .. } => Backend::Blockfrost,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            QueryApi::GraphQl { uri } => uri,
            QueryApi::Blockfrost { base_url, .. } => base_url,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    pub query_api: QueryApi,
    pub submit_api: String,
    /// Peers of the signature-sharing gossip network. Not used by queries.
    #[serde(default)]
    pub gossip_peers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults(Network::Mainnet)
    }
}

impl Config {
    /// GraphQL on the public endpoints for `network`.
    pub fn defaults(network: Network) -> Self {
        let (graphql, submit) = match network {
            Network::Mainnet => (DEFAULT_GRAPHQL_MAINNET, DEFAULT_SUBMIT_MAINNET),
            Network::Testnet => (DEFAULT_GRAPHQL_TESTNET, DEFAULT_SUBMIT_TESTNET),
        };
        Self {
            network,
            query_api: QueryApi::GraphQl {
                uri: graphql.to_string(),
            },
            submit_api: submit.to_string(),
            gossip_peers: Vec::new(),
        }
    }

    pub fn default_blockfrost_url(network: Network) -> &'static str {
        match network {
            Network::Mainnet => DEFAULT_BLOCKFROST_MAINNET,
            Network::Testnet => DEFAULT_BLOCKFROST_TESTNET,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let flag = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());
        let network = if flag("CARDANO_TESTNET") {
            Network::Testnet
        } else {
            Network::Mainnet
        };
        let mut config = Self::defaults(network);

        if flag("CARDANO_FORCE_BLOCKFROST") {
            config.query_api = QueryApi::Blockfrost {
                base_url: lookup("BLOCKFROST_URL")
                    .unwrap_or_else(|| Self::default_blockfrost_url(network).to_string()),
                project_id: lookup("BLOCKFROST_PROJECT_ID").filter(|v| !v.is_empty()),
            };
        } else if let Some(uri) = lookup("CARDANO_GRAPHQL") {
            config.query_api = QueryApi::GraphQl { uri };
        }
        if let Some(submit) = lookup("CARDANO_SUBMIT") {
            config.submit_api = submit;
        }
        config.gossip_peers = lookup("CARDANO_GOSSIP_PEERS")
            .map(|peers| {
                peers
                    .split(';')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        config.validate()?;
        Ok(config)
    }

    /// Endpoints must be absolute http(s) URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = match self.query_api {
            QueryApi::GraphQl { .. } => "query_api.uri",
            QueryApi::Blockfrost { .. } => "query_api.base_url",
        };
        check_url(field, self.query_api.endpoint())?;
        check_url("submit_api", &self.submit_api)
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_env_is_mainnet_graphql() {
        let config = Config::from_lookup(env(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.query_api.backend(), Backend::GraphQl);
        assert!(config.gossip_peers.is_empty());
    }

    #[test]
    fn testnet_blockfrost_from_env() {
        let config = Config::from_lookup(env(&[
            ("CARDANO_TESTNET", "1"),
            ("CARDANO_FORCE_BLOCKFROST", "1"),
            ("BLOCKFROST_PROJECT_ID", "preprodXYZ"),
            ("CARDANO_GOSSIP_PEERS", "https://a.example/gun; ;https://b.example/gun"),
        ]))
        .unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(
            config.query_api,
            QueryApi::Blockfrost {
                base_url: DEFAULT_BLOCKFROST_TESTNET.into(),
                project_id: Some("preprodXYZ".into()),
            }
        );
        assert_eq!(config.submit_api, DEFAULT_SUBMIT_TESTNET);
        assert_eq!(config.gossip_peers.len(), 2);
    }

    #[test]
    fn relative_endpoint_rejected() {
        let err = Config::from_lookup(env(&[("CARDANO_GRAPHQL", "/graphql")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "query_api.uri", .. }));
    }

    #[test]
    fn load_json_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"{{
                "network": "testnet",
                "query_api": {{ "type": "blockfrost", "base_url": "http://localhost:3000/api/blockfrost" }},
                "submit_api": "https://testrelay1.panl.org"
            }}"#
        )
        .unwrap();
        let config = Config::load_from_path(tmp.path()).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.query_api.backend(), Backend::Blockfrost);
        assert_eq!(config.query_api.endpoint(), "http://localhost:3000/api/blockfrost");
    }

    #[test]
    fn graphql_tag_name() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["query_api"]["type"], "graphql");
        assert_eq!(json["network"], "mainnet");
    }
}
