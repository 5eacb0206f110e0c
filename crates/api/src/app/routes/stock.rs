use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use bakeops_catalog::{IngredientCatalog, StoreDirectory};
use bakeops_core::{IngredientId, StoreId};
use bakeops_stock::StockLedger;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/receive", post(receive_stock))
        .route("/move-to-station", post(move_to_station))
}

/// Warehouse intake: goods arrive at a store's main warehouse.
pub async fn receive_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ReceiveStockRequest>,
) -> axum::response::Response {
    let store_id: StoreId = match body.store_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };
    let ingredient_id: IngredientId = match body.ingredient_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ingredient id");
        }
    };
    if !services.stores.store_exists(store_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found");
    }
    let ingredient = match services.ingredients.get(ingredient_id) {
        Some(ingredient) => ingredient,
        None => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "ingredient not found"),
    };

    if let Err(e) = services.ledger.receive_main(
        store_id,
        ingredient_id,
        body.quantity,
        &ingredient.unit,
        Utc::now(),
    ) {
        return errors::ledger_error_to_response(e);
    }

    match services.ledger.entry(store_id, ingredient_id) {
        Some(entry) => (StatusCode::OK, Json(entry)).into_response(),
        None => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            "ledger entry missing after intake",
        ),
    }
}

/// Move stock from the main warehouse into one station bucket.
pub async fn move_to_station(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::MoveToStationRequest>,
) -> axum::response::Response {
    let store_id: StoreId = match body.store_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };
    let ingredient_id: IngredientId = match body.ingredient_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ingredient id");
        }
    };
    let station = match errors::parse_station(&body.station) {
        Ok(v) => v,
        Err(response) => return response,
    };
    if !services.stores.store_exists(store_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found");
    }

    if let Err(e) =
        services
            .ledger
            .move_to_station(store_id, ingredient_id, station, body.quantity, Utc::now())
    {
        return errors::ledger_error_to_response(e);
    }

    match services.ledger.entry(store_id, ingredient_id) {
        Some(entry) => (StatusCode::OK, Json(entry)).into_response(),
        None => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            "ledger entry missing after station move",
        ),
    }
}
