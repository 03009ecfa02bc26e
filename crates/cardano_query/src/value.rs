//! Folding UTxOs and balance summaries into one multi-asset [`Value`].

use crate::asset::AssetId;
use crate::chain::parse_quantity;
use crate::error::QueryError;
use crate::provider::{BalanceSummary, Unit, Utxo};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lovelace plus multi-asset quantities. Serialized with decimal-string amounts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    #[serde(with = "decimal")]
    pub lovelace: BigUint,
    #[serde(with = "decimal_map")]
    pub assets: BTreeMap<AssetId, BigUint>,
}

impl Value {
    pub fn is_empty(&self) -> bool {
        self.lovelace == BigUint::default() && self.assets.is_empty()
    }

    pub fn quantity_of(&self, id: &AssetId) -> Option<&BigUint> {
        self.assets.get(id)
    }

    /// Pointwise sum: lovelace added, per-asset quantities added over the key union.
    pub fn merge(mut self, other: &Value) -> Value {
        self.lovelace += &other.lovelace;
        for (id, q) in &other.assets {
            self.add_asset(id.clone(), q);
        }
        self
    }

    fn add_asset(&mut self, id: AssetId, quantity: &BigUint) {
        *self.assets.entry(id).or_default() += quantity;
    }
}

/// Sum lovelace and every token quantity over `utxos`.
pub fn aggregate_utxos(utxos: &[Utxo]) -> Result<Value, QueryError> {
    let mut value = Value::default();
    for utxo in utxos {
        value.lovelace += parse_quantity(&utxo.lovelace)?;
        for token in &utxo.tokens {
            let quantity = parse_quantity(&token.quantity)?;
            value.add_asset(token.asset_id()?, &quantity);
        }
    }
    Ok(value)
}

/// Sum pre-aggregated per-address balances. Native-coin entries go to `lovelace`.
pub fn aggregate_balance_summary(summaries: &[BalanceSummary]) -> Result<Value, QueryError> {
    let mut value = Value::default();
    for entry in summaries.iter().flat_map(|s| &s.balances) {
        let quantity = parse_quantity(&entry.quantity)?;
        match &entry.unit {
            Unit::Lovelace => value.lovelace += quantity,
            Unit::Asset(id) => value.add_asset(id.clone(), &quantity),
        }
    }
    Ok(value)
}

mod decimal {
    use num_bigint::BigUint;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(v: &BigUint, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(v)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(d)?;
        BigUint::from_str(&text).map_err(D::Error::custom)
    }
}

mod decimal_map {
    use crate::asset::AssetId;
    use num_bigint::BigUint;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(m: &BTreeMap<AssetId, BigUint>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_map(m.iter().map(|(k, v)| (k.as_str(), v.to_string())))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<AssetId, BigUint>, D::Error> {
        BTreeMap::<AssetId, String>::deserialize(d)?
            .into_iter()
            .map(|(k, v)| BigUint::from_str(&v).map(|q| (k, q)).map_err(D::Error::custom))
            .collect()
    }
}
