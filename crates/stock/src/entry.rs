use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bakeops_core::{IngredientId, StoreId};

use crate::ledger::LedgerError;

/// One stock bucket: on-hand quantity in the ingredient's display unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub quantity: i64,
    pub unit: String,
    pub last_updated: DateTime<Utc>,
}

impl StockLevel {
    pub fn zero(unit: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            quantity: 0,
            unit: unit.into(),
            last_updated: at,
        }
    }
}

/// Internal consumption location inside a store.
///
/// A closed set: every store has the same stations, and ledger entries key
/// their station buckets by this enum rather than free-form identifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Station {
    Dough,
    Oven,
    Pastry,
    Counter,
}

impl Station {
    pub const ALL: [Station; 4] = [
        Station::Dough,
        Station::Oven,
        Station::Pastry,
        Station::Counter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Station::Dough => "dough",
            Station::Oven => "oven",
            Station::Pastry => "pastry",
            Station::Counter => "counter",
        }
    }
}

impl core::fmt::Display for Station {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-key station buckets.
///
/// A bucket that has never received stock is `None`, not a zero entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationStocks {
    pub dough: Option<StockLevel>,
    pub oven: Option<StockLevel>,
    pub pastry: Option<StockLevel>,
    pub counter: Option<StockLevel>,
}

impl StationStocks {
    pub fn get(&self, station: Station) -> Option<&StockLevel> {
        self.slot(station).as_ref()
    }

    fn slot(&self, station: Station) -> &Option<StockLevel> {
        match station {
            Station::Dough => &self.dough,
            Station::Oven => &self.oven,
            Station::Pastry => &self.pastry,
            Station::Counter => &self.counter,
        }
    }

    fn slot_mut(&mut self, station: Station) -> &mut Option<StockLevel> {
        match station {
            Station::Dough => &mut self.dough,
            Station::Oven => &mut self.oven,
            Station::Pastry => &mut self.pastry,
            Station::Counter => &mut self.counter,
        }
    }
}

/// Ledger record for one (store, ingredient) pair.
///
/// Created lazily on the first stock movement; never deleted, only zeroed.
/// Every bucket keeps `quantity >= 0` at all times: a movement that would
/// go negative is rejected, never clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLedgerEntry {
    pub store_id: StoreId,
    pub ingredient_id: IngredientId,
    pub main_warehouse: StockLevel,
    pub stations: StationStocks,
}

impl StockLedgerEntry {
    /// Fresh entry with an empty main-warehouse bucket.
    pub fn new(
        store_id: StoreId,
        ingredient_id: IngredientId,
        unit: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            store_id,
            ingredient_id,
            main_warehouse: StockLevel::zero(unit, at),
            stations: StationStocks::default(),
        }
    }

    pub fn main_quantity(&self) -> i64 {
        self.main_warehouse.quantity
    }

    /// Add stock to the main warehouse (intake, or a compensating deposit).
    pub fn receive_main(&mut self, quantity: i64, at: DateTime<Utc>) -> Result<(), LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(format!(
                "receive quantity must be positive, got {quantity}"
            )));
        }
        self.main_warehouse.quantity += quantity;
        self.main_warehouse.last_updated = at;
        Ok(())
    }

    /// Remove stock from the main warehouse.
    ///
    /// Fails without mutating when the bucket would go negative.
    pub fn withdraw_main(&mut self, quantity: i64, at: DateTime<Utc>) -> Result<(), LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(format!(
                "withdraw quantity must be positive, got {quantity}"
            )));
        }
        if quantity > self.main_warehouse.quantity {
            return Err(LedgerError::InsufficientStock {
                store_id: self.store_id,
                ingredient_id: self.ingredient_id,
                requested: quantity,
                available: self.main_warehouse.quantity,
            });
        }
        self.main_warehouse.quantity -= quantity;
        self.main_warehouse.last_updated = at;
        Ok(())
    }

    /// Move stock from the main warehouse into one station bucket.
    pub fn move_to_station(
        &mut self,
        station: Station,
        quantity: i64,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.withdraw_main(quantity, at)?;

        let unit = self.main_warehouse.unit.clone();
        let slot = self.stations.slot_mut(station);
        let level = slot.get_or_insert_with(|| StockLevel::zero(unit, at));
        level.quantity += quantity;
        level.last_updated = at;
        Ok(())
    }
}
