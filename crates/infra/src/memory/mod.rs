//! In-memory implementations of the core storage contracts.

pub mod catalog;
pub mod request_store;
pub mod stock_ledger;

pub use catalog::{InMemoryIngredientCatalog, InMemoryStoreDirectory};
pub use request_store::InMemoryRequestStore;
pub use stock_ledger::InMemoryStockLedger;
