//! Normalization of provider scalars.
//!
//! Indexers disagree on whether integers travel as JSON numbers or decimal
//! strings (Blockfrost sends `min_fee_a` as a number and `pool_deposit` as a
//! string; cardano-graphql sends `BigInt` as strings). Everything here keeps
//! the decimal text and never goes through `f64`.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),
}

/// A JSON scalar that is either a number or a string holding a number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl RawNumber {
    /// Source text with surrounding whitespace removed.
    pub fn as_text(&self) -> String {
        match self {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => s.trim().to_string(),
        }
    }

    pub fn to_u64(&self) -> Result<u64, NormalizeError> {
        parse_u64(&self.as_text())
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self {
        RawNumber::Text(s.to_string())
    }
}

impl From<u64> for RawNumber {
    fn from(n: u64) -> Self {
        RawNumber::Number(n.into())
    }
}

/// Parse a non-negative decimal integer that must fit in `u64`.
pub fn parse_u64(s: &str) -> Result<u64, NormalizeError> {
    let t = s.trim();
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NormalizeError::InvalidInteger(s.to_string()));
    }
    t.parse::<u64>()
        .map_err(|_| NormalizeError::InvalidInteger(s.to_string()))
}

/// Parse an arbitrary-precision non-negative quantity.
pub fn parse_quantity(s: &str) -> Result<BigUint, NormalizeError> {
    let t = s.trim();
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NormalizeError::InvalidInteger(s.to_string()));
    }
    BigUint::from_str(t).map_err(|_| NormalizeError::InvalidInteger(s.to_string()))
}
