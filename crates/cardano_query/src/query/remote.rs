//! Tri-state result of an asynchronous query.

use crate::error::QueryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    /// No query issued, or the last one was cancelled.
    Idle,
    Loading,
    Resolved,
    Failed,
}

/// `loading` / `error` / `data`. Once `data` or `error` is set, `loading` is false.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteData<T> {
    pub loading: bool,
    pub error: Option<QueryError>,
    pub data: Option<T>,
}

impl<T> Default for RemoteData<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> RemoteData<T> {
    pub fn idle() -> Self {
        Self {
            loading: false,
            error: None,
            data: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            loading: true,
            error: None,
            data: None,
        }
    }

    pub fn resolved(data: T) -> Self {
        Self {
            loading: false,
            error: None,
            data: Some(data),
        }
    }

    pub fn failed(error: QueryError) -> Self {
        Self {
            loading: false,
            error: Some(error),
            data: None,
        }
    }

    pub fn from_result(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(data) => Self::resolved(data),
            Err(e) => Self::failed(e),
        }
    }

    pub fn status(&self) -> QueryStatus {
        match (self.loading, &self.error, &self.data) {
            (true, _, _) => QueryStatus::Loading,
            (false, Some(_), _) => QueryStatus::Failed,
            (false, None, Some(_)) => QueryStatus::Resolved,
            (false, None, None) => QueryStatus::Idle,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status(), QueryStatus::Resolved | QueryStatus::Failed)
    }

    /// Terminal state as a `Result`; `None` while idle or loading.
    pub fn into_result(self) -> Option<Result<T, QueryError>> {
        if self.loading {
            return None;
        }
        match (self.error, self.data) {
            (Some(e), _) => Some(Err(e)),
            (None, Some(d)) => Some(Ok(d)),
            (None, None) => None,
        }
    }
}
