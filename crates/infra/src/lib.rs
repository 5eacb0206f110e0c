//! Infrastructure layer: storage implementations for the warehouse core
//! contracts.
//!
//! Everything here is in-memory (dev/test/single-process deployments). The
//! domain crates only see the `StockLedger` / `RequestStore` /
//! `IngredientCatalog` / `StoreDirectory` traits, so a persistent backend
//! can be swapped in without touching business code.

pub mod memory;

pub use memory::{
    InMemoryIngredientCatalog, InMemoryRequestStore, InMemoryStockLedger, InMemoryStoreDirectory,
};
