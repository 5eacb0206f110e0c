use std::sync::Arc;

use serde::{Deserialize, Serialize};

use bakeops_core::StoreId;

/// Store (branch) reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
}

/// Read-only store directory.
///
/// Used by request creation to reject transfers against unknown stores.
pub trait StoreDirectory: Send + Sync {
    fn store_exists(&self, id: StoreId) -> bool;
    fn get(&self, id: StoreId) -> Option<Store>;
    fn list(&self) -> Vec<Store>;
}

impl<D> StoreDirectory for Arc<D>
where
    D: StoreDirectory + ?Sized,
{
    fn store_exists(&self, id: StoreId) -> bool {
        (**self).store_exists(id)
    }

    fn get(&self, id: StoreId) -> Option<Store> {
        (**self).get(id)
    }

    fn list(&self) -> Vec<Store> {
        (**self).list()
    }
}
