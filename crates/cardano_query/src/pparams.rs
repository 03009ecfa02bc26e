//! Protocol parameter normalization.
//!
//! Both indexers deserialize into [`RawProtocolParameters`] (Blockfrost sends a
//! flat snake_case record, cardano-graphql a camelCase one) and go through
//! [`normalize`], so the fee and min-UTxO calculators downstream see one shape.

use crate::chain::RawNumber;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Values of the per-word field below this are per-byte values reported under
/// the per-word name (post-Babbage indexers put `coinsPerUTxOByte` ≈ 4310 there).
pub const PER_BYTE_THRESHOLD: u64 = 10_000;

/// Bytes per word in the Alonzo-era min-UTxO encoding.
pub const WORD_SIZE_BYTES: u64 = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("malformed parameter {field}: {value:?}")]
    Malformed { field: &'static str, value: String },
    #[error("missing parameter {0}")]
    Missing(&'static str),
}

/// Parameter record as an indexer reports it. Every field is optional here;
/// [`normalize`] decides which ones are required.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProtocolParameters {
    #[serde(default, alias = "minFeeA")]
    pub min_fee_a: Option<RawNumber>,
    #[serde(default, alias = "minFeeB")]
    pub min_fee_b: Option<RawNumber>,
    #[serde(default, alias = "poolDeposit")]
    pub pool_deposit: Option<RawNumber>,
    #[serde(default, alias = "keyDeposit")]
    pub key_deposit: Option<RawNumber>,
    #[serde(default, alias = "coinsPerUtxoWord")]
    pub coins_per_utxo_word: Option<RawNumber>,
    #[serde(default, alias = "coinsPerUtxoSize", alias = "coinsPerUtxoByte")]
    pub coins_per_utxo_size: Option<RawNumber>,
    #[serde(default, alias = "maxValSize")]
    pub max_val_size: Option<RawNumber>,
    #[serde(default, alias = "maxTxSize")]
    pub max_tx_size: Option<RawNumber>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolParameters {
    pub min_fee_a: u64,
    pub min_fee_b: u64,
    pub pool_deposit: u64,
    pub key_deposit: u64,
    /// Always per word. `None` when the indexer reported neither min-UTxO field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coins_per_utxo_word: Option<u64>,
    pub max_val_size: String,
    pub max_tx_size: u64,
}

pub fn normalize(raw: &RawProtocolParameters) -> Result<ProtocolParameters, ParamsError> {
    Ok(ProtocolParameters {
        min_fee_a: required("min_fee_a", raw.min_fee_a.as_ref())?,
        min_fee_b: required("min_fee_b", raw.min_fee_b.as_ref())?,
        pool_deposit: required("pool_deposit", raw.pool_deposit.as_ref())?,
        key_deposit: required("key_deposit", raw.key_deposit.as_ref())?,
        coins_per_utxo_word: resolve_coins_per_utxo_word(
            raw.coins_per_utxo_word.as_ref(),
            raw.coins_per_utxo_size.as_ref(),
        )?,
        max_val_size: required("max_val_size", raw.max_val_size.as_ref())?.to_string(),
        max_tx_size: required("max_tx_size", raw.max_tx_size.as_ref())?,
    })
}

/// Resolve the min-UTxO coefficient to the per-word unit.
///
/// 1. Per-word field present: below [`PER_BYTE_THRESHOLD`] it is really per
///    byte (×8). Otherwise, if the per-byte field is present and equal, both
///    are per byte (×8). Otherwise it is already per word.
/// 2. Only the per-byte field present: ×8.
/// 3. Neither: unset.
pub fn resolve_coins_per_utxo_word(
    per_word: Option<&RawNumber>,
    per_byte: Option<&RawNumber>,
) -> Result<Option<u64>, ParamsError> {
    let per_word = present(per_word);
    let per_byte = present(per_byte);

    if let Some(raw_word) = per_word {
        let word = parse("coins_per_utxo_word", raw_word)?;
        if word < PER_BYTE_THRESHOLD {
            return bytes_to_words("coins_per_utxo_word", raw_word, word).map(Some);
        }
        if let Some(raw_size) = per_byte {
            let size = parse("coins_per_utxo_size", raw_size)?;
            if size == word {
                return bytes_to_words("coins_per_utxo_word", raw_word, word).map(Some);
            }
        }
        return Ok(Some(word));
    }

    if let Some(raw_size) = per_byte {
        let size = parse("coins_per_utxo_size", raw_size)?;
        return bytes_to_words("coins_per_utxo_size", raw_size, size).map(Some);
    }

    Ok(None)
}

// An empty string counts as absent, same as null.
fn present(v: Option<&RawNumber>) -> Option<&RawNumber> {
    v.filter(|n| !n.as_text().is_empty())
}

fn required(field: &'static str, v: Option<&RawNumber>) -> Result<u64, ParamsError> {
    let v = present(v).ok_or(ParamsError::Missing(field))?;
    parse(field, v)
}

fn parse(field: &'static str, v: &RawNumber) -> Result<u64, ParamsError> {
    v.to_u64().map_err(|_| ParamsError::Malformed {
        field,
        value: v.as_text(),
    })
}

fn bytes_to_words(field: &'static str, raw: &RawNumber, per_byte: u64) -> Result<u64, ParamsError> {
    per_byte
        .checked_mul(WORD_SIZE_BYTES)
        .ok_or_else(|| ParamsError::Malformed {
            field,
            value: raw.as_text(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blockfrost(extra: serde_json::Value) -> RawProtocolParameters {
        let mut base = serde_json::json!({
            "min_fee_a": 44,
            "min_fee_b": 155381,
            "pool_deposit": "500000000",
            "key_deposit": "2000000",
            "max_val_size": "5000",
            "max_tx_size": 16384
        });
        if let (Some(obj), Some(more)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in more {
                obj.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn per_byte_under_word_name_is_converted() {
        let p = normalize(&blockfrost(serde_json::json!({"coins_per_utxo_word": "4310"}))).unwrap();
        assert_eq!(p.coins_per_utxo_word, Some(34480));
    }

    #[test]
    fn large_per_word_passes_through() {
        let p = normalize(&blockfrost(serde_json::json!({"coins_per_utxo_word": "34482"}))).unwrap();
        assert_eq!(p.coins_per_utxo_word, Some(34482));
    }

    #[test]
    fn only_per_byte_is_converted() {
        let p = normalize(&blockfrost(serde_json::json!({
            "coins_per_utxo_size": "4310",
            "coins_per_utxo_word": null
        })))
        .unwrap();
        assert_eq!(p.coins_per_utxo_word, Some(34480));
    }

    #[test]
    fn neither_leaves_unset() {
        let p = normalize(&blockfrost(serde_json::json!({}))).unwrap();
        assert_eq!(p.coins_per_utxo_word, None);
    }

    #[test]
    fn equal_fields_above_threshold_are_per_byte() {
        let p = normalize(&blockfrost(serde_json::json!({
            "coins_per_utxo_word": "12000",
            "coins_per_utxo_size": "12000"
        })))
        .unwrap();
        assert_eq!(p.coins_per_utxo_word, Some(96000));
    }

    #[test]
    fn differing_fields_above_threshold_trust_word() {
        let p = normalize(&blockfrost(serde_json::json!({
            "coins_per_utxo_word": "34482",
            "coins_per_utxo_size": "4310"
        })))
        .unwrap();
        assert_eq!(p.coins_per_utxo_word, Some(34482));
    }

    #[test]
    fn scalar_fields_are_copied() {
        let p = normalize(&blockfrost(serde_json::json!({}))).unwrap();
        assert_eq!(p.min_fee_a, 44);
        assert_eq!(p.min_fee_b, 155381);
        assert_eq!(p.pool_deposit, 500_000_000);
        assert_eq!(p.key_deposit, 2_000_000);
        assert_eq!(p.max_val_size, "5000");
        assert_eq!(p.max_tx_size, 16384);
    }

    #[test]
    fn graphql_camel_case_shape() {
        let raw: RawProtocolParameters = serde_json::from_value(serde_json::json!({
            "minFeeA": 44,
            "minFeeB": 155381,
            "poolDeposit": 500000000,
            "keyDeposit": 2000000,
            "coinsPerUtxoWord": 34482,
            "maxValSize": "5000",
            "maxTxSize": 16384
        }))
        .unwrap();
        let p = normalize(&raw).unwrap();
        assert_eq!(p.coins_per_utxo_word, Some(34482));
        assert_eq!(p.pool_deposit, 500_000_000);
    }

    #[test]
    fn non_numeric_field_fails() {
        let err = normalize(&blockfrost(serde_json::json!({"pool_deposit": "lots"}))).unwrap_err();
        assert_eq!(
            err,
            ParamsError::Malformed {
                field: "pool_deposit",
                value: "lots".into()
            }
        );
        let err = normalize(&blockfrost(serde_json::json!({"coins_per_utxo_word": "x"}))).unwrap_err();
        assert!(matches!(err, ParamsError::Malformed { field: "coins_per_utxo_word", .. }));
    }

    #[test]
    fn missing_required_field_fails() {
        let mut raw = blockfrost(serde_json::json!({}));
        raw.max_tx_size = None;
        assert_eq!(normalize(&raw).unwrap_err(), ParamsError::Missing("max_tx_size"));
    }

    #[test]
    fn conversion_overflow_is_malformed() {
        let huge = RawNumber::from(u64::MAX);
        assert!(resolve_coins_per_utxo_word(None, Some(&huge)).is_err());
    }
}
