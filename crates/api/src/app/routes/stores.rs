use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use bakeops_catalog::{Store, StoreDirectory};
use bakeops_core::{IngredientId, StoreId};
use bakeops_stock::StockLedger;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_store).get(list_stores))
        .route("/:id", get(get_store))
        .route("/:id/stock", get(store_stock))
        .route("/:id/availability", get(store_availability))
        .route("/:id/availability/:ingredient_id", get(ingredient_availability))
}

pub async fn register_store(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterStoreRequest>,
) -> axum::response::Response {
    if body.name.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "name cannot be empty");
    }

    let store = Store {
        id: StoreId::new(),
        name: body.name,
    };
    services.stores.register(store.clone());

    (StatusCode::CREATED, Json(store)).into_response()
}

pub async fn list_stores(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    (StatusCode::OK, Json(services.stores.list())).into_response()
}

pub async fn get_store(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let store_id: StoreId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };

    match services.stores.get(store_id) {
        Some(store) => (StatusCode::OK, Json(store)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found"),
    }
}

pub async fn store_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let store_id: StoreId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };
    if !services.stores.store_exists(store_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found");
    }

    (StatusCode::OK, Json(services.ledger.entries_for_store(store_id))).into_response()
}

pub async fn store_availability(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let store_id: StoreId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };
    if !services.stores.store_exists(store_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found");
    }

    let rows: Vec<serde_json::Value> = services
        .availability
        .store_availability(store_id)
        .iter()
        .map(dto::availability_to_json)
        .collect();

    (StatusCode::OK, Json(rows)).into_response()
}

pub async fn ingredient_availability(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, ingredient_id)): Path<(String, String)>,
) -> axum::response::Response {
    let store_id: StoreId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };
    let ingredient_id: IngredientId = match ingredient_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ingredient id");
        }
    };
    if !services.stores.store_exists(store_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found");
    }

    let available = services.availability.available_to_promise(store_id, ingredient_id);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "store_id": store_id.to_string(),
            "ingredient_id": ingredient_id.to_string(),
            "available": available,
        })),
    )
        .into_response()
}
