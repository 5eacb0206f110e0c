use std::collections::HashMap;

use bakeops_core::{IngredientId, StoreId};
use bakeops_stock::StockLedger;
use bakeops_transfer::RequestStore;

/// Availability figures for one ingredient at one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientAvailability {
    pub ingredient_id: IngredientId,
    pub unit: String,
    /// Live main-warehouse quantity.
    pub on_hand: i64,
    /// Sum reserved by all currently pending requests for the store.
    pub pending: i64,
    /// `max(0, on_hand - pending)` — safe to promise to a new requester.
    pub available: i64,
}

/// Derives the quantity of each ingredient that is safe to promise to a
/// *new* requester.
///
/// Pending requests are a soft reservation: they are summed on every read
/// rather than persisted as locked rows. The set of pending requests per
/// store is small and short-lived, so recomputing is cheap. Oversubscription
/// is expected here; the approval engine's own validation catches it before
/// any commit.
#[derive(Debug)]
pub struct AvailabilityCalculator<L, R> {
    ledger: L,
    requests: R,
}

impl<L, R> AvailabilityCalculator<L, R>
where
    L: StockLedger,
    R: RequestStore,
{
    pub fn new(ledger: L, requests: R) -> Self {
        Self { ledger, requests }
    }

    /// Quantity safe to promise for one (store, ingredient). Never negative;
    /// an ingredient with no ledger entry yet has availability 0 (not an
    /// error).
    pub fn available_to_promise(&self, store_id: StoreId, ingredient_id: IngredientId) -> i64 {
        let on_hand = self.ledger.main_quantity(store_id, ingredient_id);
        let pending = self
            .pending_demand(store_id)
            .get(&ingredient_id)
            .copied()
            .unwrap_or(0);
        (on_hand - pending).max(0)
    }

    /// Availability for every ingredient known to the store: all ledger
    /// entries plus ingredients that appear only in pending requests (those
    /// report on-hand 0). Ordered by ingredient id.
    pub fn store_availability(&self, store_id: StoreId) -> Vec<IngredientAvailability> {
        let pending = self.pending_demand(store_id);
        let mut units: HashMap<IngredientId, String> = HashMap::new();
        let mut on_hand: HashMap<IngredientId, i64> = HashMap::new();

        for entry in self.ledger.entries_for_store(store_id) {
            units.insert(entry.ingredient_id, entry.main_warehouse.unit.clone());
            on_hand.insert(entry.ingredient_id, entry.main_quantity());
        }

        for request in self.requests.pending_for_store(store_id) {
            for item in request.items() {
                units
                    .entry(item.ingredient_id)
                    .or_insert_with(|| item.unit.clone());
                on_hand.entry(item.ingredient_id).or_insert(0);
            }
        }

        let mut rows: Vec<IngredientAvailability> = on_hand
            .into_iter()
            .map(|(ingredient_id, on_hand)| {
                let pending = pending.get(&ingredient_id).copied().unwrap_or(0);
                IngredientAvailability {
                    ingredient_id,
                    unit: units.remove(&ingredient_id).unwrap_or_default(),
                    on_hand,
                    pending,
                    available: (on_hand - pending).max(0),
                }
            })
            .collect();

        rows.sort_by_key(|row| *row.ingredient_id.as_uuid().as_bytes());
        rows
    }

    /// Pending demand per ingredient across all pending requests of a store.
    fn pending_demand(&self, store_id: StoreId) -> HashMap<IngredientId, i64> {
        let mut demand: HashMap<IngredientId, i64> = HashMap::new();
        for request in self.requests.pending_for_store(store_id) {
            for item in request.items() {
                *demand.entry(item.ingredient_id).or_insert(0) += item.quantity;
            }
        }
        demand
    }
}
