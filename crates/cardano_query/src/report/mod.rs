//! Serializable balance snapshot printed by the CLI.

use crate::config::{Config, Network};
use crate::currency::{to_decimal, ADA_DECIMALS};
use crate::provider::Backend;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLine {
    pub asset_id: String,
    pub policy_id: String,
    pub asset_name: String,
    /// Asset name as text when it decodes to printable UTF-8.
    pub display_name: String,
    pub quantity: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub network: Network,
    pub backend: Backend,
    pub addresses: Vec<String>,
    pub queried_utc_rfc3339: String,
    pub lovelace: String,
    pub ada: String,
    pub assets: Vec<AssetLine>,
}

impl BalanceReport {
    pub fn new(config: &Config, addresses: Vec<String>, value: &Value) -> Self {
        Self::at(config, addresses, value, OffsetDateTime::now_utc())
    }

    pub fn at(config: &Config, addresses: Vec<String>, value: &Value, now: OffsetDateTime) -> Self {
        let queried_utc_rfc3339 = now.format(&Rfc3339).unwrap_or_default();
        let assets = value
            .assets
            .iter()
            .map(|(id, q)| AssetLine {
                asset_id: id.to_string(),
                policy_id: id.policy_id().to_string(),
                asset_name: id.asset_name().to_string(),
                display_name: id.display_name(),
                quantity: q.to_string(),
            })
            .collect();
        Self {
            network: config.network,
            backend: config.query_api.backend(),
            addresses,
            queried_utc_rfc3339,
            lovelace: value.lovelace.to_string(),
            ada: to_decimal(&value.lovelace, ADA_DECIMALS),
            assets,
        }
    }
}
