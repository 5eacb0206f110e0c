use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use bakeops_catalog::{Ingredient, IngredientCatalog};
use bakeops_core::IngredientId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_ingredient).get(list_ingredients))
        .route("/:id", get(get_ingredient))
}

pub async fn register_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterIngredientRequest>,
) -> axum::response::Response {
    if body.name.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "name cannot be empty");
    }
    if body.unit.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "unit cannot be empty");
    }

    let ingredient = Ingredient {
        id: IngredientId::new(),
        name: body.name,
        unit: body.unit,
    };
    services.ingredients.register(ingredient.clone());

    (StatusCode::CREATED, Json(ingredient)).into_response()
}

pub async fn list_ingredients(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    (StatusCode::OK, Json(services.ingredients.list())).into_response()
}

pub async fn get_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let ingredient_id: IngredientId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ingredient id");
        }
    };

    match services.ingredients.get(ingredient_id) {
        Some(ingredient) => (StatusCode::OK, Json(ingredient)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "ingredient not found"),
    }
}
