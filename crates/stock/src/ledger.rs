use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bakeops_core::{DomainError, DomainResult, IngredientId, StoreId};

use crate::entry::{Station, StockLedgerEntry};

/// One requested main-warehouse movement.
///
/// Quantities are validated positive at construction so that a movement set
/// handed to [`StockLedger::withdraw_main`] is well-formed by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub store_id: StoreId,
    pub ingredient_id: IngredientId,
    pub quantity: i64,
    pub unit: String,
}

impl StockMovement {
    pub fn new(
        store_id: StoreId,
        ingredient_id: IngredientId,
        quantity: i64,
        unit: impl Into<String>,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "movement quantity must be positive, got {quantity}"
            )));
        }
        Ok(Self {
            store_id,
            ingredient_id,
            quantity,
            unit: unit.into(),
        })
    }
}

/// Stock ledger operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A withdrawal would drive a bucket negative. Carries enough detail for
    /// the caller to render an actionable message.
    #[error(
        "insufficient stock for ingredient {ingredient_id} at store {store_id} \
         (requested {requested}, available {available})"
    )]
    InsufficientStock {
        store_id: StoreId,
        ingredient_id: IngredientId,
        requested: i64,
        available: i64,
    },

    /// A movement carried a non-positive quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// An optimistic implementation lost an update race. Safe to retry the
    /// whole operation (callers re-read live stock each attempt).
    #[error("ledger update conflict: {0}")]
    Conflict(String),

    /// The underlying storage failed (lock poisoned, backend unavailable).
    #[error("ledger storage failed: {0}")]
    Storage(String),
}

/// Storage contract for the stock ledger.
///
/// ## Atomicity requirements
///
/// `withdraw_main` is the authoritative allocation step: implementations
/// MUST validate every movement against live quantities and apply them as
/// **one serializable step** — all movements land or none do, and no
/// concurrent withdrawal may interleave between validate and apply. An
/// implementation built on optimistic versioning may instead return
/// [`LedgerError::Conflict`] when it loses a race; callers treat that as
/// retriable.
///
/// Reads (`main_quantity`, `entry`, `entries_for_store`) carry whatever
/// consistency the backend offers; they are browsing views, never the basis
/// for a commit decision.
pub trait StockLedger: Send + Sync {
    /// Current main-warehouse quantity; 0 when no entry exists (not an error).
    fn main_quantity(&self, store_id: StoreId, ingredient_id: IngredientId) -> i64;

    fn entry(&self, store_id: StoreId, ingredient_id: IngredientId) -> Option<StockLedgerEntry>;

    /// All ledger entries for one store, ordered by ingredient id.
    fn entries_for_store(&self, store_id: StoreId) -> Vec<StockLedgerEntry>;

    /// Warehouse intake: add stock, creating the entry lazily on first use.
    fn receive_main(
        &self,
        store_id: StoreId,
        ingredient_id: IngredientId,
        quantity: i64,
        unit: &str,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError>;

    /// Atomic all-or-nothing withdrawal of every movement in the slice.
    fn withdraw_main(&self, movements: &[StockMovement], at: DateTime<Utc>)
        -> Result<(), LedgerError>;

    /// Unconditional add-back of previously withdrawn movements
    /// (compensation path). Creates missing entries lazily so stock is never
    /// lost, whatever state the ledger is in.
    fn deposit_main(&self, movements: &[StockMovement], at: DateTime<Utc>)
        -> Result<(), LedgerError>;

    /// Move stock from the main warehouse into one station bucket.
    fn move_to_station(
        &self,
        store_id: StoreId,
        ingredient_id: IngredientId,
        station: Station,
        quantity: i64,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError>;
}

impl<L> StockLedger for Arc<L>
where
    L: StockLedger + ?Sized,
{
    fn main_quantity(&self, store_id: StoreId, ingredient_id: IngredientId) -> i64 {
        (**self).main_quantity(store_id, ingredient_id)
    }

    fn entry(&self, store_id: StoreId, ingredient_id: IngredientId) -> Option<StockLedgerEntry> {
        (**self).entry(store_id, ingredient_id)
    }

    fn entries_for_store(&self, store_id: StoreId) -> Vec<StockLedgerEntry> {
        (**self).entries_for_store(store_id)
    }

    fn receive_main(
        &self,
        store_id: StoreId,
        ingredient_id: IngredientId,
        quantity: i64,
        unit: &str,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        (**self).receive_main(store_id, ingredient_id, quantity, unit, at)
    }

    fn withdraw_main(
        &self,
        movements: &[StockMovement],
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        (**self).withdraw_main(movements, at)
    }

    fn deposit_main(
        &self,
        movements: &[StockMovement],
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        (**self).deposit_main(movements, at)
    }

    fn move_to_station(
        &self,
        store_id: StoreId,
        ingredient_id: IngredientId,
        station: Station,
        quantity: i64,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        (**self).move_to_station(store_id, ingredient_id, station, quantity, at)
    }
}
