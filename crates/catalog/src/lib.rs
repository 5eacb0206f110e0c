//! `bakeops-catalog` — reference data the warehouse core consumes.
//!
//! The recipe/purchasing side of the system owns the full ingredient and
//! store records; the core only reads identity, display names, and units
//! through the narrow lookup traits defined here.

pub mod ingredient;
pub mod store;

pub use ingredient::{Ingredient, IngredientCatalog};
pub use store::{Store, StoreDirectory};
