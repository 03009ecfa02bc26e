//! Query orchestrator: one cell per query family, one resolved indexer.

use crate::chain::FetchConfig;
use crate::config::Config;
use crate::error::QueryError;
use crate::pparams::ProtocolParameters;
use crate::provider::{Backend, ChainQuery, Provider, Utxo};
use crate::query::cell::QueryCell;
use crate::query::remote::RemoteData;
use crate::value::{aggregate_balance_summary, aggregate_utxos, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs queries against the indexer chosen at construction time.
///
/// Methods never return `Err`: adapter failures become the Failed state of the
/// matching cell. A request for a new subject supersedes the one in flight.
pub struct QueryClient {
    provider: Arc<dyn ChainQuery>,
    utxos: QueryCell<String, Vec<Utxo>>,
    utxo_balance: QueryCell<String, Value>,
    balance_summary: QueryCell<Vec<String>, Value>,
    protocol_parameters: QueryCell<(), ProtocolParameters>,
}

impl QueryClient {
    pub fn new(provider: Arc<dyn ChainQuery>) -> Self {
        Self {
            provider,
            utxos: QueryCell::new(),
            utxo_balance: QueryCell::new(),
            balance_summary: QueryCell::new(),
            protocol_parameters: QueryCell::new(),
        }
    }

    pub fn from_config(config: &Config, fetch: FetchConfig) -> Result<Self, QueryError> {
        let provider = Provider::from_config(config, fetch)?;
        info!(
            backend = %provider.backend(),
            endpoint = config.query_api.endpoint(),
            network = ?config.network,
            "query client ready"
        );
        Ok(Self::new(Arc::new(provider)))
    }

    pub fn backend(&self) -> Backend {
        self.provider.backend()
    }

    /// UTxOs at `address` in canonical form.
    pub async fn utxos(&self, address: &str) -> RemoteData<Vec<Utxo>> {
        let provider = Arc::clone(&self.provider);
        let state = self
            .utxos
            .run(address.to_string(), async move {
                provider.fetch_utxos(address).await
            })
            .await;
        log_outcome("utxos", &state);
        state
    }

    /// Balance of `address` folded from its UTxOs.
    pub async fn utxo_balance(&self, address: &str) -> RemoteData<Value> {
        let provider = Arc::clone(&self.provider);
        let state = self
            .utxo_balance
            .run(address.to_string(), async move {
                let utxos = provider.fetch_utxos(address).await?;
                aggregate_utxos(&utxos)
            })
            .await;
        log_outcome("utxo_balance", &state);
        state
    }

    /// Combined balance of `addresses` from the indexer's per-address summaries.
    pub async fn balance_summary(&self, addresses: &[String]) -> RemoteData<Value> {
        let provider = Arc::clone(&self.provider);
        let state = self
            .balance_summary
            .run(addresses.to_vec(), async move {
                let summaries = provider.fetch_balance_summary(addresses).await?;
                aggregate_balance_summary(&summaries)
            })
            .await;
        log_outcome("balance_summary", &state);
        state
    }

    pub async fn protocol_parameters(&self) -> RemoteData<ProtocolParameters> {
        let provider = Arc::clone(&self.provider);
        let state = self
            .protocol_parameters
            .run((), async move { provider.fetch_protocol_parameters().await })
            .await;
        log_outcome("protocol_parameters", &state);
        state
    }

    pub fn utxos_cell(&self) -> &QueryCell<String, Vec<Utxo>> {
        &self.utxos
    }

    pub fn utxo_balance_cell(&self) -> &QueryCell<String, Value> {
        &self.utxo_balance
    }

    pub fn balance_summary_cell(&self) -> &QueryCell<Vec<String>, Value> {
        &self.balance_summary
    }

    pub fn protocol_parameters_cell(&self) -> &QueryCell<(), ProtocolParameters> {
        &self.protocol_parameters
    }

    /// Drop interest in everything in flight.
    pub fn cancel_all(&self) {
        self.utxos.cancel();
        self.utxo_balance.cancel();
        self.balance_summary.cancel();
        self.protocol_parameters.cancel();
    }
}

fn log_outcome<T>(query: &str, state: &RemoteData<T>) {
    if let Some(e) = &state.error {
        warn!(query, status = ?e.status(), error = %e, "query failed");
    }
}
