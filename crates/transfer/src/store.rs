use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use bakeops_core::StoreId;

use crate::request::{TransferRequest, TransferRequestId, TransferStatus};

/// Request store operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestStoreError {
    #[error("transfer request not found")]
    NotFound,

    /// The status precondition did not hold. `from` carries the status the
    /// request actually had when the transition was attempted.
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition {
        from: TransferStatus,
        to: TransferStatus,
    },

    #[error("transfer request already exists")]
    Duplicate,

    /// The underlying storage failed (lock poisoned, backend unavailable).
    #[error("request storage failed: {0}")]
    Storage(String),
}

/// Listing filters for [`RequestStore::list_by_store`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<TransferStatus>,
    pub requested_by: Option<String>,
}

impl RequestFilter {
    pub fn matches(&self, request: &TransferRequest) -> bool {
        if let Some(status) = self.status {
            if request.status() != status {
                return false;
            }
        }
        if let Some(requested_by) = &self.requested_by {
            if request.requested_by() != requested_by {
                return false;
            }
        }
        true
    }
}

/// Storage contract for transfer requests.
///
/// Owns lifecycle persistence only; business rules beyond status legality
/// live in the approval engine. Requests are never deleted (audit trail).
///
/// `transition` MUST be an atomic check-and-set against the stored status,
/// not a read-then-write: two concurrent callers racing the same request
/// must see exactly one winner.
pub trait RequestStore: Send + Sync {
    fn insert(&self, request: TransferRequest) -> Result<(), RequestStoreError>;

    fn get(&self, id: TransferRequestId) -> Option<TransferRequest>;

    /// Fetch the requests that exist among `ids`; unknown ids are skipped.
    fn find_by_ids(&self, ids: &[TransferRequestId]) -> Vec<TransferRequest>;

    /// Requests for a store, newest first.
    fn list_by_store(&self, store_id: StoreId, filter: &RequestFilter) -> Vec<TransferRequest>;

    /// All currently pending requests for a store (soft-reservation input).
    fn pending_for_store(&self, store_id: StoreId) -> Vec<TransferRequest>;

    /// Atomically transition `id` from `from` to `to`, recording the
    /// deciding actor. Returns the updated request.
    fn transition(
        &self,
        id: TransferRequestId,
        from: TransferStatus,
        to: TransferStatus,
        decided_by: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<TransferRequest, RequestStoreError>;
}

impl<S> RequestStore for Arc<S>
where
    S: RequestStore + ?Sized,
{
    fn insert(&self, request: TransferRequest) -> Result<(), RequestStoreError> {
        (**self).insert(request)
    }

    fn get(&self, id: TransferRequestId) -> Option<TransferRequest> {
        (**self).get(id)
    }

    fn find_by_ids(&self, ids: &[TransferRequestId]) -> Vec<TransferRequest> {
        (**self).find_by_ids(ids)
    }

    fn list_by_store(&self, store_id: StoreId, filter: &RequestFilter) -> Vec<TransferRequest> {
        (**self).list_by_store(store_id, filter)
    }

    fn pending_for_store(&self, store_id: StoreId) -> Vec<TransferRequest> {
        (**self).pending_for_store(store_id)
    }

    fn transition(
        &self,
        id: TransferRequestId,
        from: TransferStatus,
        to: TransferStatus,
        decided_by: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<TransferRequest, RequestStoreError> {
        (**self).transition(id, from, to, decided_by, at)
    }
}
