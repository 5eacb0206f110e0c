use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use bakeops_core::StoreId;
use bakeops_transfer::{
    RequestFilter, RequestStore, RequestStoreError, TransferRequest, TransferRequestId,
    TransferStatus,
};

/// In-memory transfer request store.
///
/// `transition` performs its status check and update under one write lock
/// (check-and-set); concurrent deciders racing the same request see exactly
/// one winner.
#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    requests: RwLock<HashMap<TransferRequestId, TransferRequest>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStore for InMemoryRequestStore {
    fn insert(&self, request: TransferRequest) -> Result<(), RequestStoreError> {
        let mut requests = self
            .requests
            .write()
            .map_err(|_| RequestStoreError::Storage("request lock poisoned".to_string()))?;
        if requests.contains_key(&request.id()) {
            return Err(RequestStoreError::Duplicate);
        }
        requests.insert(request.id(), request);
        Ok(())
    }

    fn get(&self, id: TransferRequestId) -> Option<TransferRequest> {
        let requests = self.requests.read().ok()?;
        requests.get(&id).cloned()
    }

    fn find_by_ids(&self, ids: &[TransferRequestId]) -> Vec<TransferRequest> {
        let requests = match self.requests.read() {
            Ok(requests) => requests,
            Err(_) => return vec![],
        };
        ids.iter().filter_map(|id| requests.get(id).cloned()).collect()
    }

    fn list_by_store(&self, store_id: StoreId, filter: &RequestFilter) -> Vec<TransferRequest> {
        let requests = match self.requests.read() {
            Ok(requests) => requests,
            Err(_) => return vec![],
        };
        let mut matching: Vec<TransferRequest> = requests
            .values()
            .filter(|r| r.store_id() == store_id && filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse((r.created_at(), *r.id().as_uuid())));
        matching
    }

    fn pending_for_store(&self, store_id: StoreId) -> Vec<TransferRequest> {
        self.list_by_store(
            store_id,
            &RequestFilter {
                status: Some(TransferStatus::Pending),
                requested_by: None,
            },
        )
    }

    fn transition(
        &self,
        id: TransferRequestId,
        from: TransferStatus,
        to: TransferStatus,
        decided_by: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<TransferRequest, RequestStoreError> {
        let mut requests = self
            .requests
            .write()
            .map_err(|_| RequestStoreError::Storage("request lock poisoned".to_string()))?;
        let request = requests.get_mut(&id).ok_or(RequestStoreError::NotFound)?;
        if request.status() != from {
            return Err(RequestStoreError::InvalidTransition {
                from: request.status(),
                to,
            });
        }
        request.transition(to, decided_by, at)?;
        Ok(request.clone())
    }
}
