//! cardano-graphql adapter.
//!
//! Responses already look like the canonical records, so UTxOs are only
//! retyped. Balance summaries use the synthetic asset id `"ada"` for the
//! native coin, which is resolved here before anything treats the id as a
//! packed policy/name pair.

use crate::asset::AssetId;
use crate::chain::{FetchError, Fetcher, RawNumber};
use crate::error::QueryError;
use crate::pparams::{normalize, ProtocolParameters, RawProtocolParameters};
use crate::provider::{AssetBalance, Backend, BalanceSummary, ChainQuery, Token, Unit, Utxo};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Synthetic asset id cardano-graphql uses for lovelace in `assetBalances`.
pub const ADA_SENTINEL: &str = "ada";

pub const UTXOS_QUERY: &str = r#"
query UTxOsByAddress($address: String!) {
  utxos(where: { address: { _eq: $address } }) {
    address
    txHash
    index
    value
    tokens {
      asset {
        policyId
        assetName
      }
      quantity
    }
  }
}"#;

pub const PAYMENT_ADDRESSES_QUERY: &str = r#"
query PaymentAddressByAddresses($addresses: [String]!) {
  paymentAddresses(addresses: $addresses) {
    address
    summary {
      assetBalances {
        asset {
          assetId
        }
        quantity
      }
    }
  }
}"#;

pub const PROTOCOL_PARAMETERS_QUERY: &str = r#"
query getProtocolParameters {
  cardano {
    currentEpoch {
      protocolParams {
        minFeeA
        minFeeB
        poolDeposit
        keyDeposit
        coinsPerUtxoWord
        maxValSize
        maxTxSize
      }
    }
  }
}"#;

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlUtxo {
    pub address: String,
    pub tx_hash: String,
    pub index: u32,
    pub value: RawNumber,
    #[serde(default)]
    pub tokens: Vec<GqlToken>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GqlToken {
    pub asset: GqlAsset,
    pub quantity: RawNumber,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlAsset {
    pub policy_id: String,
    #[serde(default)]
    pub asset_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GqlPaymentAddress {
    pub address: String,
    #[serde(default)]
    pub summary: Option<GqlSummary>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlSummary {
    #[serde(default)]
    pub asset_balances: Option<Vec<Option<GqlAssetBalance>>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GqlAssetBalance {
    pub asset: GqlAssetRef,
    pub quantity: RawNumber,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlAssetRef {
    pub asset_id: String,
}

#[derive(Debug, Deserialize)]
struct UtxosData {
    utxos: Vec<GqlUtxo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentAddressesData {
    payment_addresses: Vec<GqlPaymentAddress>,
}

#[derive(Deserialize)]
struct ProtocolParametersData {
    cardano: GqlCardano,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlCardano {
    current_epoch: GqlEpoch,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlEpoch {
    protocol_params: Option<RawProtocolParameters>,
}

pub struct GraphQlProvider {
    fetcher: Arc<Fetcher>,
    uri: String,
}

impl GraphQlProvider {
    pub fn new(fetcher: Arc<Fetcher>, uri: &str) -> Self {
        Self {
            fetcher,
            uri: uri.to_string(),
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, QueryError> {
        let body = serde_json::json!({ "query": query, "variables": variables });
        let res: GraphQlResponse<T> = self.fetcher.post_json(&self.uri, &body).await?;
        Ok(unwrap_response(res)?)
    }
}

fn unwrap_response<T>(res: GraphQlResponse<T>) -> Result<T, FetchError> {
    if !res.errors.is_empty() {
        let messages: Vec<String> = res.errors.into_iter().map(|e| e.message).collect();
        return Err(FetchError::GraphQl(messages.join("; ")));
    }
    res.data
        .ok_or_else(|| FetchError::Decode("graphql response without data".to_string()))
}

#[async_trait]
impl ChainQuery for GraphQlProvider {
    fn backend(&self) -> Backend {
        Backend::GraphQl
    }

    async fn fetch_utxos(&self, address: &str) -> Result<Vec<Utxo>, QueryError> {
        let data: UtxosData = self
            .query(UTXOS_QUERY, serde_json::json!({ "address": address }))
            .await?;
        let utxos = to_canonical_utxos(data.utxos);
        info!(count = utxos.len(), "graphql utxos");
        Ok(utxos)
    }

    async fn fetch_protocol_parameters(&self) -> Result<ProtocolParameters, QueryError> {
        let data: ProtocolParametersData = self
            .query(PROTOCOL_PARAMETERS_QUERY, serde_json::json!({}))
            .await?;
        let raw = data
            .cardano
            .current_epoch
            .protocol_params
            .ok_or_else(|| QueryError::Decode("current epoch has no protocolParams".to_string()))?;
        Ok(normalize(&raw)?)
    }

    async fn fetch_balance_summary(
        &self,
        addresses: &[String],
    ) -> Result<Vec<BalanceSummary>, QueryError> {
        let data: PaymentAddressesData = self
            .query(
                PAYMENT_ADDRESSES_QUERY,
                serde_json::json!({ "addresses": addresses }),
            )
            .await?;
        let summaries = to_balance_summaries(data.payment_addresses)?;
        info!(count = summaries.len(), "graphql payment addresses");
        Ok(summaries)
    }
}

pub fn to_canonical_utxos(utxos: Vec<GqlUtxo>) -> Vec<Utxo> {
    utxos
        .into_iter()
        .map(|u| Utxo {
            address: u.address,
            tx_hash: u.tx_hash,
            output_index: u.index,
            lovelace: u.value.as_text(),
            tokens: u
                .tokens
                .into_iter()
                .map(|t| Token {
                    policy_id: t.asset.policy_id,
                    asset_name: t.asset.asset_name.unwrap_or_default(),
                    quantity: t.quantity.as_text(),
                })
                .collect(),
        })
        .collect()
}

pub fn to_balance_summaries(
    addresses: Vec<GqlPaymentAddress>,
) -> Result<Vec<BalanceSummary>, QueryError> {
    addresses
        .into_iter()
        .map(|pa| -> Result<BalanceSummary, QueryError> {
            let balances = pa
                .summary
                .and_then(|s| s.asset_balances)
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .map(|b| -> Result<AssetBalance, QueryError> {
                    Ok(AssetBalance {
                        unit: unit_of(b.asset.asset_id)?,
                        quantity: b.quantity.as_text(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BalanceSummary {
                address: pa.address,
                balances,
            })
        })
        .collect()
}

fn unit_of(asset_id: String) -> Result<Unit, QueryError> {
    if asset_id == ADA_SENTINEL {
        return Ok(Unit::Lovelace);
    }
    Ok(Unit::Asset(AssetId::parse(asset_id)?))
}
