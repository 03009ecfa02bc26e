//! cardano_query: balance and protocol parameters of Cardano addresses from
//! either a cardano-graphql indexer or a Blockfrost-style REST indexer.
//!
//! Both backends are normalized into one canonical model: UTxOs with
//! decimal-string quantities, a multi-asset [`Value`] with arbitrary-precision
//! sums, and [`ProtocolParameters`] with the min-UTxO coefficient always per word.
//! Read-only; no key handling; no transaction building.

pub mod asset;
pub mod chain;
pub mod config;
pub mod currency;
pub mod error;
pub mod pparams;
pub mod provider;
pub mod query;
pub mod report;
pub mod value;

pub use asset::{asset_id_of, asset_name_of, policy_id_of, AssetId};
pub use chain::{FetchConfig, Fetcher};
pub use config::{Config, Network, QueryApi};
pub use error::QueryError;
pub use pparams::{normalize, ProtocolParameters, RawProtocolParameters};
pub use provider::{Backend, BalanceSummary, ChainQuery, Provider, Utxo};
pub use query::{QueryCell, QueryClient, QueryStatus, RemoteData, Ticket};
pub use report::BalanceReport;
pub use value::{aggregate_balance_summary, aggregate_utxos, Value};
