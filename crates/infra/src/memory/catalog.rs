use std::collections::HashMap;
use std::sync::RwLock;

use bakeops_catalog::{Ingredient, IngredientCatalog, Store, StoreDirectory};
use bakeops_core::{IngredientId, StoreId};

/// In-memory ingredient registry (dev/test seeding surface).
#[derive(Debug, Default)]
pub struct InMemoryIngredientCatalog {
    ingredients: RwLock<HashMap<IngredientId, Ingredient>>,
}

impl InMemoryIngredientCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, ingredient: Ingredient) {
        if let Ok(mut ingredients) = self.ingredients.write() {
            ingredients.insert(ingredient.id, ingredient);
        }
    }
}

impl IngredientCatalog for InMemoryIngredientCatalog {
    fn get(&self, id: IngredientId) -> Option<Ingredient> {
        let ingredients = self.ingredients.read().ok()?;
        ingredients.get(&id).cloned()
    }

    fn list(&self) -> Vec<Ingredient> {
        let ingredients = match self.ingredients.read() {
            Ok(ingredients) => ingredients,
            Err(_) => return vec![],
        };
        let mut rows: Vec<Ingredient> = ingredients.values().cloned().collect();
        rows.sort_by_key(|i| *i.id.as_uuid().as_bytes());
        rows
    }
}

/// In-memory store directory (dev/test seeding surface).
#[derive(Debug, Default)]
pub struct InMemoryStoreDirectory {
    stores: RwLock<HashMap<StoreId, Store>>,
}

impl InMemoryStoreDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, store: Store) {
        if let Ok(mut stores) = self.stores.write() {
            stores.insert(store.id, store);
        }
    }
}

impl StoreDirectory for InMemoryStoreDirectory {
    fn store_exists(&self, id: StoreId) -> bool {
        self.stores.read().map(|stores| stores.contains_key(&id)).unwrap_or(false)
    }

    fn get(&self, id: StoreId) -> Option<Store> {
        let stores = self.stores.read().ok()?;
        stores.get(&id).cloned()
    }

    fn list(&self) -> Vec<Store> {
        let stores = match self.stores.read() {
            Ok(stores) => stores,
            Err(_) => return vec![],
        };
        let mut rows: Vec<Store> = stores.values().cloned().collect();
        rows.sort_by_key(|s| *s.id.as_uuid().as_bytes());
        rows
    }
}
