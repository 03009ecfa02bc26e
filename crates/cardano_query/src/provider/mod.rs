//! Indexer adapters behind one capability trait.

pub mod blockfrost;
pub mod graphql;
mod types;

pub use blockfrost::BlockfrostProvider;
pub use graphql::GraphQlProvider;
pub use types::{AssetBalance, BalanceSummary, Token, Unit, Utxo};

use crate::chain::{FetchConfig, Fetcher};
use crate::config::{Config, QueryApi};
use crate::error::QueryError;
use crate::pparams::ProtocolParameters;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    GraphQl,
    Blockfrost,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::GraphQl => f.write_str("graphql"),
            Backend::Blockfrost => f.write_str("blockfrost"),
        }
    }
}

/// What an indexer can answer. Every method returns canonical records.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    fn backend(&self) -> Backend;

    async fn fetch_utxos(&self, address: &str) -> Result<Vec<Utxo>, QueryError>;

    async fn fetch_protocol_parameters(&self) -> Result<ProtocolParameters, QueryError>;

    /// Pre-aggregated balances per address. Only some indexers offer this.
    async fn fetch_balance_summary(
        &self,
        _addresses: &[String],
    ) -> Result<Vec<BalanceSummary>, QueryError> {
        Err(QueryError::MisconfiguredBackend(format!(
            "balance summaries on {}",
            self.backend()
        )))
    }
}

/// The configured indexer, resolved once from [`Config`].
pub enum Provider {
    GraphQl(GraphQlProvider),
    Blockfrost(BlockfrostProvider),
}

impl Provider {
    pub fn from_config(config: &Config, fetch: FetchConfig) -> Result<Self, QueryError> {
        let fetcher = Arc::new(Fetcher::new(fetch)?);
        Ok(match &config.query_api {
            QueryApi::GraphQl { uri } => Provider::GraphQl(GraphQlProvider::new(fetcher, uri)),
            QueryApi::Blockfrost {
                base_url,
                project_id,
            } => Provider::Blockfrost(BlockfrostProvider::new(
                fetcher,
                base_url,
                project_id.clone(),
            )),
        })
    }

    fn inner(&self) -> &dyn ChainQuery {
        match self {
            Provider::GraphQl(p) => p,
            Provider::Blockfrost(p) => p,
        }
    }
}

#[async_trait]
impl ChainQuery for Provider {
    fn backend(&self) -> Backend {
        self.inner().backend()
    }

    async fn fetch_utxos(&self, address: &str) -> Result<Vec<Utxo>, QueryError> {
        self.inner().fetch_utxos(address).await
    }

    async fn fetch_protocol_parameters(&self) -> Result<ProtocolParameters, QueryError> {
        self.inner().fetch_protocol_parameters().await
    }

    async fn fetch_balance_summary(
        &self,
        addresses: &[String],
    ) -> Result<Vec<BalanceSummary>, QueryError> {
        self.inner().fetch_balance_summary(addresses).await
    }
}
