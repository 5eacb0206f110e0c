use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use bakeops_core::{IngredientId, StoreId};
use bakeops_stock::{LedgerError, StockLedger, StockMovement};
use bakeops_transfer::{
    RequestStore, RequestStoreError, TransferRequest, TransferRequestId, TransferStatus,
};

/// Attempts per withdrawal before a ledger conflict is surfaced to the
/// caller. Insufficient stock is a business fact and is never retried.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Approval failure taxonomy. All variants are terminal, reported-to-caller
/// errors; conflicts have already been retried internally by the time they
/// surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("transfer request not found")]
    NotFound,

    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition {
        from: TransferStatus,
        to: TransferStatus,
    },

    /// Live stock cannot cover the demand. Carries the offending store and
    /// ingredient plus the required/available figures for display.
    #[error(
        "insufficient stock for ingredient {ingredient_id} at store {store_id} \
         (required {required}, available {available})"
    )]
    InsufficientStock {
        store_id: StoreId,
        ingredient_id: IngredientId,
        required: i64,
        available: i64,
    },

    /// The effective batch was empty: none of the given requests is pending.
    #[error("no pending requests to approve")]
    NothingToApprove,

    /// The ledger kept losing update races after bounded retries, or
    /// rejected the movement set outright. The caller may retry the whole
    /// approval; re-validation reads live stock each attempt.
    #[error("approval conflicted with concurrent updates: {0}")]
    Conflict(String),
}

impl From<RequestStoreError> for ApprovalError {
    fn from(value: RequestStoreError) -> Self {
        match value {
            RequestStoreError::NotFound => ApprovalError::NotFound,
            RequestStoreError::InvalidTransition { from, to } => {
                ApprovalError::InvalidTransition { from, to }
            }
            RequestStoreError::Duplicate => {
                ApprovalError::Conflict("duplicate transfer request".to_string())
            }
            RequestStoreError::Storage(msg) => ApprovalError::Conflict(msg),
        }
    }
}

/// Outcome of a bulk approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkApprovalOutcome {
    /// Requests actually transitioned to `approved`, in batch order.
    pub approved: Vec<TransferRequest>,
}

impl BulkApprovalOutcome {
    pub fn approved_count(&self) -> usize {
        self.approved.len()
    }
}

/// The authoritative allocation step: converts pending transfer requests
/// into main-warehouse withdrawals, single or batched.
///
/// Both entry points share one shape: the full demand is aggregated into a
/// movement set, then withdrawn through the ledger's atomic all-or-nothing
/// `withdraw_main`, then the affected requests are CAS-transitioned to
/// `approved`. Validation always reads live stock, never the
/// available-to-promise estimate.
///
/// A transition that loses a race (the request was decided concurrently)
/// is compensated by depositing the already-withdrawn movements back, so
/// the ledger is never left decremented for a request that is not marked
/// approved.
#[derive(Debug)]
pub struct ApprovalEngine<L, R> {
    ledger: L,
    requests: R,
    max_attempts: u32,
}

impl<L, R> ApprovalEngine<L, R>
where
    L: StockLedger,
    R: RequestStore,
{
    pub fn new(ledger: L, requests: R) -> Self {
        Self {
            ledger,
            requests,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Approve one pending request: withdraw every item from the store's
    /// main warehouse and flip the request to `approved`.
    pub fn approve(
        &self,
        id: TransferRequestId,
        decided_by: &str,
    ) -> Result<TransferRequest, ApprovalError> {
        let request = self.requests.get(id).ok_or(ApprovalError::NotFound)?;
        if !request.is_pending() {
            return Err(ApprovalError::InvalidTransition {
                from: request.status(),
                to: TransferStatus::Approved,
            });
        }

        let movements = aggregate_request_demand(&request);
        self.withdraw_with_retry(&movements)?;

        match self.requests.transition(
            id,
            TransferStatus::Pending,
            TransferStatus::Approved,
            Some(decided_by),
            Utc::now(),
        ) {
            Ok(updated) => {
                tracing::info!(
                    request_id = %id,
                    store_id = %updated.store_id(),
                    decided_by,
                    items = updated.items().len(),
                    "transfer request approved"
                );
                Ok(updated)
            }
            Err(err) => {
                self.compensate(&movements, id);
                Err(err.into())
            }
        }
    }

    /// Reject one pending request. Status transition only; the ledger is
    /// never touched.
    pub fn reject(
        &self,
        id: TransferRequestId,
        decided_by: &str,
    ) -> Result<TransferRequest, ApprovalError> {
        let updated = self.requests.transition(
            id,
            TransferStatus::Pending,
            TransferStatus::Rejected,
            Some(decided_by),
            Utc::now(),
        )?;
        tracing::info!(request_id = %id, decided_by, "transfer request rejected");
        Ok(updated)
    }

    /// Mark an approved request as handed over by the warehouse. Status
    /// transition only.
    pub fn complete(&self, id: TransferRequestId) -> Result<TransferRequest, ApprovalError> {
        let updated = self.requests.transition(
            id,
            TransferStatus::Approved,
            TransferStatus::Completed,
            None,
            Utc::now(),
        )?;
        tracing::info!(request_id = %id, "transfer request completed");
        Ok(updated)
    }

    /// Approve a batch of requests all-or-nothing.
    ///
    /// Demand is aggregated per (store, ingredient) across the whole batch,
    /// so two requests for the same ingredient are checked against their
    /// combined demand. A shortfall anywhere aborts the entire batch before
    /// any request is approved — operators clearing a queue either get the
    /// whole queue or a single actionable error. Callers needing partial
    /// success call [`ApprovalEngine::approve`] in a loop instead.
    pub fn bulk_approve(
        &self,
        ids: &[TransferRequestId],
        decided_by: &str,
    ) -> Result<BulkApprovalOutcome, ApprovalError> {
        let pending: Vec<TransferRequest> = self
            .requests
            .find_by_ids(ids)
            .into_iter()
            .filter(TransferRequest::is_pending)
            .collect();
        if pending.is_empty() {
            return Err(ApprovalError::NothingToApprove);
        }

        let movements = aggregate_batch_demand(&pending);
        self.withdraw_with_retry(&movements)?;

        let mut approved = Vec::with_capacity(pending.len());
        for request in &pending {
            match self.requests.transition(
                request.id(),
                TransferStatus::Pending,
                TransferStatus::Approved,
                Some(decided_by),
                Utc::now(),
            ) {
                Ok(updated) => approved.push(updated),
                Err(err) => {
                    // The request was decided concurrently after we fetched
                    // it; hand its share of the batch withdrawal back.
                    tracing::warn!(
                        request_id = %request.id(),
                        error = %err,
                        "bulk approval lost a transition race, compensating"
                    );
                    self.compensate(&aggregate_request_demand(request), request.id());
                }
            }
        }

        tracing::info!(
            batch = ids.len(),
            pending = pending.len(),
            approved = approved.len(),
            decided_by,
            "bulk approval committed"
        );
        Ok(BulkApprovalOutcome { approved })
    }

    /// Issue the atomic withdrawal, retrying bounded times on optimistic
    /// conflicts. Each attempt re-validates against live stock inside the
    /// ledger.
    fn withdraw_with_retry(&self, movements: &[StockMovement]) -> Result<(), ApprovalError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.ledger.withdraw_main(movements, Utc::now()) {
                Ok(()) => return Ok(()),
                Err(LedgerError::InsufficientStock {
                    store_id,
                    ingredient_id,
                    requested,
                    available,
                }) => {
                    tracing::info!(
                        %store_id,
                        %ingredient_id,
                        required = requested,
                        available,
                        "approval blocked by stock shortfall"
                    );
                    return Err(ApprovalError::InsufficientStock {
                        store_id,
                        ingredient_id,
                        required: requested,
                        available,
                    });
                }
                Err(LedgerError::Conflict(msg)) if attempt < self.max_attempts => {
                    tracing::debug!(attempt, error = %msg, "ledger conflict, retrying withdrawal");
                }
                Err(LedgerError::Conflict(msg)) => return Err(ApprovalError::Conflict(msg)),
                Err(LedgerError::InvalidQuantity(msg) | LedgerError::Storage(msg)) => {
                    return Err(ApprovalError::Conflict(msg));
                }
            }
        }
    }

    /// Deposit withdrawn movements back after a lost transition race.
    fn compensate(&self, movements: &[StockMovement], request_id: TransferRequestId) {
        if let Err(err) = self.ledger.deposit_main(movements, Utc::now()) {
            // Deposits only fail if storage itself is broken; at that point
            // the ledger needs operator attention, so make it loud.
            tracing::error!(
                %request_id,
                error = %err,
                "failed to return stock after lost approval race"
            );
        }
    }
}

/// Aggregate one request's items per ingredient (a cart may list the same
/// ingredient twice).
fn aggregate_request_demand(request: &TransferRequest) -> Vec<StockMovement> {
    aggregate_demand(std::iter::once(request))
}

/// Aggregate demand per (store, ingredient) across a batch, so combined
/// demand is validated rather than per-request slices.
fn aggregate_batch_demand<'a>(
    requests: impl IntoIterator<Item = &'a TransferRequest>,
) -> Vec<StockMovement> {
    aggregate_demand(requests.into_iter())
}

fn aggregate_demand<'a>(
    requests: impl Iterator<Item = &'a TransferRequest>,
) -> Vec<StockMovement> {
    let mut totals: HashMap<(StoreId, IngredientId), (i64, String)> = HashMap::new();
    for request in requests {
        for item in request.items() {
            let slot = totals
                .entry((request.store_id(), item.ingredient_id))
                .or_insert_with(|| (0, item.unit.clone()));
            slot.0 += item.quantity;
        }
    }

    let mut movements: Vec<StockMovement> = totals
        .into_iter()
        .map(|((store_id, ingredient_id), (quantity, unit))| StockMovement {
            store_id,
            ingredient_id,
            quantity,
            unit,
        })
        .collect();

    // Deterministic order, so validation reports the same shortfall for the
    // same batch every time.
    movements.sort_by_key(|m| {
        (
            *m.store_id.as_uuid().as_bytes(),
            *m.ingredient_id.as_uuid().as_bytes(),
        )
    });
    movements
}
