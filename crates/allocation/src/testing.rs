//! Minimal in-crate test doubles for the storage contracts.
//!
//! The production in-memory implementations live in `bakeops-infra`; these
//! doubles exist so this crate's unit tests stay dependency-free and can
//! inject failure modes (conflict injection) the real stores never produce.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};

use bakeops_core::{IngredientId, StoreId};
use bakeops_stock::{LedgerError, Station, StockLedger, StockLedgerEntry, StockMovement};
use bakeops_transfer::{
    RequestFilter, RequestItem, RequestStore, RequestStoreError, TransferRequest,
    TransferRequestId, TransferStatus,
};

/// Build a pending request over `(ingredient, quantity)` lines.
pub(crate) fn pending_request(
    store_id: StoreId,
    lines: &[(IngredientId, i64)],
) -> TransferRequest {
    let items = lines
        .iter()
        .map(|(ingredient_id, quantity)| {
            RequestItem::new(*ingredient_id, "ingredient", *quantity, "kg").unwrap()
        })
        .collect();
    TransferRequest::new(
        TransferRequestId::new(),
        store_id,
        items,
        "staff-7",
        Utc::now(),
    )
    .unwrap()
}

/// Plain map-backed ledger double with optional conflict injection: the
/// first `inject_conflicts` withdrawals fail with [`LedgerError::Conflict`].
#[derive(Debug, Default)]
pub(crate) struct TestLedger {
    entries: RwLock<HashMap<(StoreId, IngredientId), StockLedgerEntry>>,
    inject_conflicts: AtomicU32,
}

impl TestLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_conflicts(conflicts: u32) -> Self {
        let ledger = Self::default();
        ledger.inject_conflicts.store(conflicts, Ordering::SeqCst);
        ledger
    }
}

impl StockLedger for TestLedger {
    fn main_quantity(&self, store_id: StoreId, ingredient_id: IngredientId) -> i64 {
        let entries = self.entries.read().expect("lock poisoned");
        entries
            .get(&(store_id, ingredient_id))
            .map_or(0, StockLedgerEntry::main_quantity)
    }

    fn entry(&self, store_id: StoreId, ingredient_id: IngredientId) -> Option<StockLedgerEntry> {
        let entries = self.entries.read().expect("lock poisoned");
        entries.get(&(store_id, ingredient_id)).cloned()
    }

    fn entries_for_store(&self, store_id: StoreId) -> Vec<StockLedgerEntry> {
        let entries = self.entries.read().expect("lock poisoned");
        entries
            .values()
            .filter(|e| e.store_id == store_id)
            .cloned()
            .collect()
    }

    fn receive_main(
        &self,
        store_id: StoreId,
        ingredient_id: IngredientId,
        quantity: i64,
        unit: &str,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().expect("lock poisoned");
        entries
            .entry((store_id, ingredient_id))
            .or_insert_with(|| StockLedgerEntry::new(store_id, ingredient_id, unit, at))
            .receive_main(quantity, at)
    }

    fn withdraw_main(
        &self,
        movements: &[StockMovement],
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if self
            .inject_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(LedgerError::Conflict("injected".to_string()));
        }

        let mut entries = self.entries.write().expect("lock poisoned");
        for movement in movements {
            let available = entries
                .get(&(movement.store_id, movement.ingredient_id))
                .map_or(0, StockLedgerEntry::main_quantity);
            if movement.quantity > available {
                return Err(LedgerError::InsufficientStock {
                    store_id: movement.store_id,
                    ingredient_id: movement.ingredient_id,
                    requested: movement.quantity,
                    available,
                });
            }
        }
        for movement in movements {
            if let Some(entry) = entries.get_mut(&(movement.store_id, movement.ingredient_id)) {
                entry.withdraw_main(movement.quantity, at)?;
            }
        }
        Ok(())
    }

    fn deposit_main(
        &self,
        movements: &[StockMovement],
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().expect("lock poisoned");
        for movement in movements {
            entries
                .entry((movement.store_id, movement.ingredient_id))
                .or_insert_with(|| {
                    StockLedgerEntry::new(
                        movement.store_id,
                        movement.ingredient_id,
                        movement.unit.clone(),
                        at,
                    )
                })
                .receive_main(movement.quantity, at)?;
        }
        Ok(())
    }

    fn move_to_station(
        &self,
        store_id: StoreId,
        ingredient_id: IngredientId,
        station: Station,
        quantity: i64,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().expect("lock poisoned");
        match entries.get_mut(&(store_id, ingredient_id)) {
            Some(entry) => entry.move_to_station(station, quantity, at),
            None => Err(LedgerError::InsufficientStock {
                store_id,
                ingredient_id,
                requested: quantity,
                available: 0,
            }),
        }
    }
}

/// Plain map-backed request store double with optional race injection: the
/// first `fail_transitions` transition calls report the request as already
/// decided, mimicking a lost check-and-set.
#[derive(Debug, Default)]
pub(crate) struct TestRequests {
    requests: RwLock<HashMap<TransferRequestId, TransferRequest>>,
    fail_transitions: AtomicU32,
}

impl TestRequests {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_failing_transitions(failures: u32) -> Self {
        let store = Self::default();
        store.fail_transitions.store(failures, Ordering::SeqCst);
        store
    }
}

impl RequestStore for TestRequests {
    fn insert(&self, request: TransferRequest) -> Result<(), RequestStoreError> {
        let mut requests = self.requests.write().expect("lock poisoned");
        if requests.contains_key(&request.id()) {
            return Err(RequestStoreError::Duplicate);
        }
        requests.insert(request.id(), request);
        Ok(())
    }

    fn get(&self, id: TransferRequestId) -> Option<TransferRequest> {
        let requests = self.requests.read().expect("lock poisoned");
        requests.get(&id).cloned()
    }

    fn find_by_ids(&self, ids: &[TransferRequestId]) -> Vec<TransferRequest> {
        let requests = self.requests.read().expect("lock poisoned");
        ids.iter().filter_map(|id| requests.get(id).cloned()).collect()
    }

    fn list_by_store(&self, store_id: StoreId, filter: &RequestFilter) -> Vec<TransferRequest> {
        let requests = self.requests.read().expect("lock poisoned");
        let mut matching: Vec<TransferRequest> = requests
            .values()
            .filter(|r| r.store_id() == store_id && filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
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
        if self
            .fail_transitions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(RequestStoreError::InvalidTransition {
                from: TransferStatus::Rejected,
                to,
            });
        }

        let mut requests = self.requests.write().expect("lock poisoned");
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
