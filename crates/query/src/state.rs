use std::any::Any;
use std::sync::Arc;

use finboard_api::ApiError;
use tokio::time::Instant;

pub(crate) type AnyData = Arc<dyn Any + Send + Sync>;

/// Lifecycle of a cache entry.
///
/// `Idle → Loading → Success | Error`; an invalidated `Success` becomes
/// `Stale` and goes back to `Loading` when refetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
    Stale,
}

/// Type-erased entry state, broadcast to observers.
#[derive(Clone)]
pub(crate) struct ErasedState {
    pub status: QueryStatus,
    pub data: Option<AnyData>,
    pub error: Option<ApiError>,
    pub updated_at: Option<Instant>,
}

impl ErasedState {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            updated_at: None,
        }
    }
}

/// Snapshot of a query as seen by a consumer.
///
/// `data` keeps the last successful value through `Loading`, `Stale` and
/// `Error`, so consumers can keep showing it while a refetch runs.
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<ApiError>,
    pub updated_at: Option<Instant>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl<T: Send + Sync + 'static> QueryState<T> {
    pub(crate) fn from_erased(state: &ErasedState) -> Self {
        Self {
            status: state.status,
            data: state
                .data
                .clone()
                .and_then(|data| data.downcast::<T>().ok()),
            error: state.error.clone(),
            updated_at: state.updated_at,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn is_stale(&self) -> bool {
        self.status == QueryStatus::Stale
    }

    /// True once the query reached a terminal state for the current request.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, QueryStatus::Success | QueryStatus::Error)
    }
}
