//! Crate-level error kinds surfaced by adapters, the normalizer, and the
//! aggregator. Cloneable so a failed query state can be shared by readers.

use crate::asset::AssetIdError;
use crate::chain::{FetchError, NormalizeError};
use crate::pparams::ParamsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed asset id: {0:?}")]
    MalformedAssetId(String),
    #[error("malformed protocol parameter {field}: {value:?}")]
    MalformedParameter { field: String, value: String },
    #[error("malformed quantity: {0:?}")]
    MalformedQuantity(String),
    #[error("upstream error {status}: {body}")]
    UpstreamHttp { status: u16, body: String },
    #[error("network: {0}")]
    Network(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("graphql: {0}")]
    GraphQl(String),
    #[error("backend does not support {0}")]
    MisconfiguredBackend(String),
}

impl QueryError {
    /// HTTP status of an upstream failure, for rendering next to the message.
    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<AssetIdError> for QueryError {
    fn from(e: AssetIdError) -> Self {
        match e {
            AssetIdError::Malformed(id) => QueryError::MalformedAssetId(id),
        }
    }
}

impl From<NormalizeError> for QueryError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::InvalidInteger(s) => QueryError::MalformedQuantity(s),
        }
    }
}

impl From<ParamsError> for QueryError {
    fn from(e: ParamsError) -> Self {
        match e {
            ParamsError::Malformed { field, value } => QueryError::MalformedParameter {
                field: field.to_string(),
                value,
            },
            ParamsError::Missing(field) => QueryError::MalformedParameter {
                field: field.to_string(),
                value: String::new(),
            },
        }
    }
}

impl From<FetchError> for QueryError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Network(e) => QueryError::Network(e.to_string()),
            FetchError::Upstream { status, body } => QueryError::UpstreamHttp { status, body },
            FetchError::Decode(msg) => QueryError::Decode(msg),
            FetchError::GraphQl(msg) => QueryError::GraphQl(msg),
        }
    }
}
