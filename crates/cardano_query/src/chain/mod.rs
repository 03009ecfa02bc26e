//! Chain data fetching and scalar normalization.

pub(crate) mod fetch;
pub(crate) mod normalize;

pub use fetch::{FetchConfig, FetchError, Fetcher};
pub use normalize::{parse_quantity, parse_u64, NormalizeError, RawNumber};
