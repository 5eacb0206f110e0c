//! `bakeops-stock` — stock ledger domain.
//!
//! Per-(store, ingredient) on-hand quantities split between the main
//! warehouse bucket and fixed station buckets, plus the storage contract
//! (`StockLedger`) for moving them. Business rules here are pure and
//! deterministic; storage lives behind the trait.

pub mod entry;
pub mod ledger;

pub use entry::{Station, StationStocks, StockLedgerEntry, StockLevel};
pub use ledger::{LedgerError, StockLedger, StockMovement};
