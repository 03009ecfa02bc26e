//! Asynchronous queries with loading / error / data state and staleness control.

mod cell;
mod client;
mod remote;

pub use cell::{QueryCell, Ticket};
pub use client::QueryClient;
pub use remote::{QueryStatus, RemoteData};
