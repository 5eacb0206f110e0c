use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use bakeops_core::{IngredientId, StoreId};
use bakeops_stock::{LedgerError, Station, StockLedger, StockLedgerEntry, StockMovement};

type EntryKey = (StoreId, IngredientId);

/// In-memory stock ledger.
///
/// `withdraw_main` holds the map's write lock across validate and apply,
/// so the whole movement slice is one serializable step: concurrent
/// withdrawals can never both pass validation on the same stale quantity.
/// This implementation therefore never reports [`LedgerError::Conflict`].
#[derive(Debug, Default)]
pub struct InMemoryStockLedger {
    entries: RwLock<HashMap<EntryKey, StockLedgerEntry>>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockLedger for InMemoryStockLedger {
    fn main_quantity(&self, store_id: StoreId, ingredient_id: IngredientId) -> i64 {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(_) => return 0,
        };
        entries
            .get(&(store_id, ingredient_id))
            .map_or(0, StockLedgerEntry::main_quantity)
    }

    fn entry(&self, store_id: StoreId, ingredient_id: IngredientId) -> Option<StockLedgerEntry> {
        let entries = self.entries.read().ok()?;
        entries.get(&(store_id, ingredient_id)).cloned()
    }

    fn entries_for_store(&self, store_id: StoreId) -> Vec<StockLedgerEntry> {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(_) => return vec![],
        };
        let mut rows: Vec<StockLedgerEntry> = entries
            .values()
            .filter(|e| e.store_id == store_id)
            .cloned()
            .collect();
        rows.sort_by_key(|e| *e.ingredient_id.as_uuid().as_bytes());
        rows
    }

    fn receive_main(
        &self,
        store_id: StoreId,
        ingredient_id: IngredientId,
        quantity: i64,
        unit: &str,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerError::Storage("ledger lock poisoned".to_string()))?;
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
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerError::Storage("ledger lock poisoned".to_string()))?;

        // Validate every movement against live quantities before mutating
        // anything; the write lock keeps the two passes one atomic step.
        for movement in movements {
            if movement.quantity <= 0 {
                return Err(LedgerError::InvalidQuantity(format!(
                    "withdraw quantity must be positive, got {}",
                    movement.quantity
                )));
            }
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
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerError::Storage("ledger lock poisoned".to_string()))?;
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
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerError::Storage("ledger lock poisoned".to_string()))?;
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
