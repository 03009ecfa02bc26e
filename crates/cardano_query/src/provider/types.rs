//! Canonical, provider-independent records produced by the adapters.

use crate::asset::{AssetId, AssetIdError};
use serde::{Deserialize, Serialize};

/// Unspent output in canonical form. Quantities are the decimal text the
/// provider sent, never parsed through a float.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub address: String,
    pub tx_hash: String,
    pub output_index: u32,
    #[serde(rename = "lovelaceValue")]
    pub lovelace: String,
    pub tokens: Vec<Token>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub policy_id: String,
    pub asset_name: String,
    pub quantity: String,
}

impl Token {
    pub fn asset_id(&self) -> Result<AssetId, AssetIdError> {
        AssetId::from_parts(&self.policy_id, &self.asset_name)
    }
}

/// What a balance entry counts: the native coin or a packed multi-asset id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Lovelace,
    Asset(AssetId),
}

impl Unit {
    pub const LOVELACE: &'static str = "lovelace";
}

impl TryFrom<String> for Unit {
    type Error = AssetIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == Unit::LOVELACE {
            return Ok(Unit::Lovelace);
        }
        AssetId::parse(value).map(Unit::Asset)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Lovelace => Unit::LOVELACE.to_string(),
            Unit::Asset(id) => id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub unit: Unit,
    pub quantity: String,
}

/// Pre-aggregated balances of one address as reported by the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub address: String,
    pub balances: Vec<AssetBalance>,
}
