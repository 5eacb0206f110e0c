use std::sync::Arc;

use serde::{Deserialize, Serialize};

use bakeops_core::IngredientId;

/// Ingredient reference data as the warehouse core sees it.
///
/// The full record (purchase unit, suppliers, cost roll-up) lives in the
/// recipe side of the system; the core only needs identity and the display
/// unit to echo into transfer items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    /// Display unit (e.g. "g", "kg", "pcs"), echoed into ledger and items.
    pub unit: String,
}

/// Read-only ingredient lookup.
pub trait IngredientCatalog: Send + Sync {
    fn get(&self, id: IngredientId) -> Option<Ingredient>;
    fn list(&self) -> Vec<Ingredient>;
}

impl<C> IngredientCatalog for Arc<C>
where
    C: IngredientCatalog + ?Sized,
{
    fn get(&self, id: IngredientId) -> Option<Ingredient> {
        (**self).get(id)
    }

    fn list(&self) -> Vec<Ingredient> {
        (**self).list()
    }
}
