//! Packed asset identifiers: 56-hex policy id followed by a hex asset name.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Length of a hex-encoded policy id (28 bytes).
pub const POLICY_ID_HEX_LEN: usize = 56;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetIdError {
    #[error("malformed asset id (shorter than 56 chars): {0:?}")]
    Malformed(String),
}

/// First 56 characters of a packed id.
pub fn policy_id_of(id: &str) -> Result<&str, AssetIdError> {
    id.get(..POLICY_ID_HEX_LEN)
        .ok_or_else(|| AssetIdError::Malformed(id.to_string()))
}

/// Everything after the policy id. Empty for a token minted with no name.
pub fn asset_name_of(id: &str) -> &str {
    id.get(POLICY_ID_HEX_LEN..).unwrap_or("")
}

/// Pack a policy id and asset name. The policy id must be exactly 56 chars so
/// the packed id splits back into the same two parts.
pub fn asset_id_of(policy_id: &str, asset_name: &str) -> Result<AssetId, AssetIdError> {
    let id = format!("{policy_id}{asset_name}");
    if policy_id.len() != POLICY_ID_HEX_LEN {
        return Err(AssetIdError::Malformed(id));
    }
    Ok(AssetId(id))
}

/// Packed `policy_id ++ asset_name`, used as the key of [`crate::Value::assets`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    pub fn parse(id: impl Into<String>) -> Result<Self, AssetIdError> {
        let id = id.into();
        policy_id_of(&id)?;
        Ok(Self(id))
    }

    pub fn from_parts(policy_id: &str, asset_name: &str) -> Result<Self, AssetIdError> {
        asset_id_of(policy_id, asset_name)
    }

    pub fn policy_id(&self) -> &str {
        &self.0[..POLICY_ID_HEX_LEN]
    }

    pub fn asset_name(&self) -> &str {
        asset_name_of(&self.0)
    }

    /// Asset name decoded as UTF-8 when it is printable text, the raw hex otherwise.
    pub fn display_name(&self) -> String {
        let name = self.asset_name();
        match hex::decode(name).ok().and_then(|b| String::from_utf8(b).ok()) {
            Some(text) if !text.is_empty() && !text.chars().any(char::is_control) => text,
            _ => name.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AssetId {
    type Error = AssetIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}
