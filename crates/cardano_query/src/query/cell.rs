//! Per-query result slot with generation-checked writes.
//!
//! Every [`QueryCell::begin`] bumps the generation and hands out a [`Ticket`].
//! A completion may only write its result while its ticket is still current,
//! so a slow fetch for a superseded subject can never overwrite the state of
//! the query that replaced it.

use crate::error::QueryError;
use crate::query::remote::RemoteData;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

/// Proof of which request a completion belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket<K> {
    key: K,
    generation: u64,
}

impl<K> Ticket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Slot<K> {
    key: Option<K>,
    generation: u64,
}

pub struct QueryCell<K, T> {
    slot: Mutex<Slot<K>>,
    state: watch::Sender<RemoteData<T>>,
}

impl<K, T> Default for QueryCell<K, T>
where
    K: Clone + fmt::Debug,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> QueryCell<K, T>
where
    K: Clone + fmt::Debug,
    T: Clone,
{
    pub fn new() -> Self {
        let (state, _) = watch::channel(RemoteData::idle());
        Self {
            slot: Mutex::new(Slot {
                key: None,
                generation: 0,
            }),
            state,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<K>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a request for `key`. Drops any previous terminal state and
    /// supersedes any request still in flight.
    pub fn begin(&self, key: K) -> Ticket<K> {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.key = Some(key.clone());
        self.state.send_replace(RemoteData::loading());
        Ticket {
            key,
            generation: slot.generation,
        }
    }

    /// Write the result for `ticket`. Returns false, leaving state untouched,
    /// when a newer request or a cancel happened since `begin`.
    pub fn commit(&self, ticket: &Ticket<K>, result: Result<T, QueryError>) -> bool {
        let slot = self.lock();
        if slot.generation != ticket.generation {
            debug!(
                key = ?ticket.key,
                stale = ticket.generation,
                current = slot.generation,
                "dropping stale query result"
            );
            return false;
        }
        self.state.send_replace(RemoteData::from_result(result));
        true
    }

    /// Abandon interest in the current request. Its result will be dropped.
    pub fn cancel(&self) {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.key = None;
        self.state.send_replace(RemoteData::idle());
    }

    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.lock().generation == ticket.generation
    }

    /// Subject of the latest request, if any.
    pub fn key(&self) -> Option<K> {
        self.lock().key.clone()
    }

    pub fn state(&self) -> RemoteData<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RemoteData<T>> {
        self.state.subscribe()
    }

    /// `begin`, await `fetch`, `commit`. Returns the cell state afterwards,
    /// which belongs to a newer request if this one was superseded meanwhile.
    pub async fn run<F>(&self, key: K, fetch: F) -> RemoteData<T>
    where
        F: Future<Output = Result<T, QueryError>>,
    {
        let ticket = self.begin(key);
        let result = fetch.await;
        self.commit(&ticket, result);
        self.state()
    }
}
