//! Blockfrost-style REST adapter.
//!
//! Amounts arrive as `[{unit, quantity}]` where `unit` is either `"lovelace"`
//! or a packed asset id, and every quantity is a decimal string.

use crate::asset::{asset_name_of, policy_id_of};
use crate::chain::Fetcher;
use crate::error::QueryError;
use crate::pparams::{normalize, ProtocolParameters, RawProtocolParameters};
use crate::provider::{Backend, ChainQuery, Token, Unit, Utxo};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Header Blockfrost reads the project credential from.
pub const PROJECT_ID_HEADER: &str = "project_id";

/// Blockfrost's maximum (and our requested) page size.
const PAGE_SIZE: usize = 100;

#[derive(Clone, Debug, Deserialize)]
pub struct BlockfrostAmount {
    pub unit: String,
    pub quantity: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockfrostUtxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub amount: Vec<BlockfrostAmount>,
}

pub struct BlockfrostProvider {
    fetcher: Arc<Fetcher>,
    base_url: String,
    project_id: Option<String>,
}

impl BlockfrostProvider {
    /// `project_id` is only needed when talking to Blockfrost directly; a
    /// same-origin proxy injects it on its own.
    pub fn new(fetcher: Arc<Fetcher>, base_url: &str, project_id: Option<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, QueryError> {
        let url = format!("{}{}", self.base_url, path);
        let headers: Vec<(&str, &str)> = self
            .project_id
            .as_deref()
            .map(|id| vec![(PROJECT_ID_HEADER, id)])
            .unwrap_or_default();
        Ok(self.fetcher.get_json(&url, &headers).await?)
    }

    /// Walk the pages until a short one. A page that starts with the same output
    /// as the previous one (a proxy dropping the paging query) also ends the walk.
    async fn address_utxos(&self, address: &str) -> Result<Vec<BlockfrostUtxo>, QueryError> {
        let encoded = urlencoding::encode(address);
        let mut all: Vec<BlockfrostUtxo> = Vec::new();
        let mut previous_head: Option<(String, u32)> = None;
        for page in 1.. {
            let path = format!("/addresses/{encoded}/utxos?count={PAGE_SIZE}&page={page}");
            let batch: Vec<BlockfrostUtxo> = self.get(&path).await?;
            let head = batch.first().map(|u| (u.tx_hash.clone(), u.output_index));
            if head.is_some() && head == previous_head {
                warn!(page, "indexer ignored paging, keeping the pages seen so far");
                break;
            }
            let last = batch.len() < PAGE_SIZE;
            debug!(page, count = batch.len(), "address utxos page");
            all.extend(batch);
            if last {
                break;
            }
            previous_head = head;
        }
        Ok(all)
    }
}

#[async_trait]
impl ChainQuery for BlockfrostProvider {
    fn backend(&self) -> Backend {
        Backend::Blockfrost
    }

    async fn fetch_utxos(&self, address: &str) -> Result<Vec<Utxo>, QueryError> {
        let raw = self.address_utxos(address).await?;
        let utxos = to_canonical_utxos(address, raw)?;
        info!(count = utxos.len(), "blockfrost utxos");
        Ok(utxos)
    }

    async fn fetch_protocol_parameters(&self) -> Result<ProtocolParameters, QueryError> {
        let raw: RawProtocolParameters = self.get("/epochs/latest/parameters").await?;
        Ok(normalize(&raw)?)
    }
}

/// Convert REST UTxOs at `address` into canonical records.
pub fn to_canonical_utxos(
    address: &str,
    utxos: Vec<BlockfrostUtxo>,
) -> Result<Vec<Utxo>, QueryError> {
    utxos
        .into_iter()
        .map(|u| to_canonical_utxo(address, u))
        .collect()
}

fn to_canonical_utxo(address: &str, utxo: BlockfrostUtxo) -> Result<Utxo, QueryError> {
    let mut lovelace = None;
    let mut tokens = Vec::with_capacity(utxo.amount.len().saturating_sub(1));
    for a in utxo.amount {
        if a.unit == Unit::LOVELACE {
            lovelace.get_or_insert(a.quantity);
            continue;
        }
        tokens.push(Token {
            policy_id: policy_id_of(&a.unit)?.to_string(),
            asset_name: asset_name_of(&a.unit).to_string(),
            quantity: a.quantity,
        });
    }
    Ok(Utxo {
        address: address.to_string(),
        tx_hash: utxo.tx_hash,
        output_index: utxo.output_index,
        lovelace: lovelace.unwrap_or_else(|| "0".to_string()),
        tokens,
    })
}
