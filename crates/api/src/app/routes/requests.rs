use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use bakeops_catalog::{IngredientCatalog, StoreDirectory};
use bakeops_core::StoreId;
use bakeops_transfer::{
    RequestFilter, RequestItem, RequestStore, TransferRequest, TransferRequestId, TransferStatus,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_request).get(list_requests))
        .route("/bulk-approve", post(bulk_approve))
        .route("/:id", get(get_request))
        .route("/:id/approve", post(approve_request))
        .route("/:id/reject", post(reject_request))
        .route("/:id/complete", post(complete_request))
}

pub async fn create_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateTransferRequest>,
) -> axum::response::Response {
    let store_id: StoreId = match body.store_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };
    if !services.stores.store_exists(store_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found");
    }

    let mut items = Vec::with_capacity(body.items.len());
    for line in &body.items {
        let ingredient_id = match line.ingredient_id.parse() {
            Ok(v) => v,
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    format!("invalid ingredient id '{}'", line.ingredient_id),
                );
            }
        };
        let ingredient = match services.ingredients.get(ingredient_id) {
            Some(ingredient) => ingredient,
            None => {
                return errors::json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("unknown ingredient {ingredient_id}"),
                );
            }
        };
        match RequestItem::new(ingredient_id, ingredient.name, line.quantity, ingredient.unit) {
            Ok(item) => items.push(item),
            Err(e) => return errors::domain_error_to_response(e),
        }
    }

    // Intent only: no stock validation at creation time. The authoritative
    // check happens once, at approval, against live numbers.
    let request = match TransferRequest::new(
        TransferRequestId::new(),
        store_id,
        items,
        caller.staff_id(),
        Utc::now(),
    ) {
        Ok(request) => request,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.requests.insert(request.clone()) {
        return errors::request_store_error_to_response(e);
    }

    tracing::info!(
        request_id = %request.id(),
        store_id = %store_id,
        requested_by = caller.staff_id(),
        items = request.items().len(),
        "transfer request submitted"
    );
    services.notify(
        store_id,
        "transfer.request_submitted",
        serde_json::json!({
            "request_id": request.id().to_string(),
            "requested_by": caller.staff_id(),
        }),
    );

    (StatusCode::CREATED, Json(dto::request_to_json(&request))).into_response()
}

pub async fn list_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListRequestsParams>,
) -> axum::response::Response {
    let store_id: StoreId = match params.store_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };

    let status = match params.status.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<TransferStatus>() {
            Ok(status) => Some(status),
            Err(e) => return errors::domain_error_to_response(e),
        },
    };

    let filter = RequestFilter {
        status,
        requested_by: params.requested_by,
    };

    let rows: Vec<serde_json::Value> = services
        .requests
        .list_by_store(store_id, &filter)
        .iter()
        .map(dto::request_to_json)
        .collect();

    (StatusCode::OK, Json(rows)).into_response()
}

pub async fn get_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let request_id: TransferRequestId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid request id"),
    };

    match services.requests.get(request_id) {
        Some(request) => (StatusCode::OK, Json(dto::request_to_json(&request))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "transfer request not found"),
    }
}

pub async fn approve_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let request_id: TransferRequestId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid request id"),
    };

    let approved = match services.approvals.approve(request_id, caller.staff_id()) {
        Ok(approved) => approved,
        Err(e) => return errors::approval_error_to_response(e),
    };

    services.notify(
        approved.store_id(),
        "transfer.request_approved",
        serde_json::json!({
            "request_id": approved.id().to_string(),
            "decided_by": caller.staff_id(),
        }),
    );

    (StatusCode::OK, Json(dto::request_to_json(&approved))).into_response()
}

pub async fn reject_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let request_id: TransferRequestId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid request id"),
    };

    let rejected = match services.approvals.reject(request_id, caller.staff_id()) {
        Ok(rejected) => rejected,
        Err(e) => return errors::approval_error_to_response(e),
    };

    services.notify(
        rejected.store_id(),
        "transfer.request_rejected",
        serde_json::json!({
            "request_id": rejected.id().to_string(),
            "decided_by": caller.staff_id(),
        }),
    );

    (StatusCode::OK, Json(dto::request_to_json(&rejected))).into_response()
}

pub async fn complete_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let request_id: TransferRequestId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid request id"),
    };

    let completed = match services.approvals.complete(request_id) {
        Ok(completed) => completed,
        Err(e) => return errors::approval_error_to_response(e),
    };

    services.notify(
        completed.store_id(),
        "transfer.request_completed",
        serde_json::json!({
            "request_id": completed.id().to_string(),
        }),
    );

    (StatusCode::OK, Json(dto::request_to_json(&completed))).into_response()
}

pub async fn bulk_approve(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::BulkApproveRequest>,
) -> axum::response::Response {
    let mut request_ids = Vec::with_capacity(body.request_ids.len());
    for raw in &body.request_ids {
        match raw.parse::<TransferRequestId>() {
            Ok(id) => request_ids.push(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    format!("invalid request id '{raw}'"),
                );
            }
        }
    }

    let outcome = match services.approvals.bulk_approve(&request_ids, caller.staff_id()) {
        Ok(outcome) => outcome,
        Err(e) => return errors::approval_error_to_response(e),
    };

    for approved in &outcome.approved {
        services.notify(
            approved.store_id(),
            "transfer.request_approved",
            serde_json::json!({
                "request_id": approved.id().to_string(),
                "decided_by": caller.staff_id(),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "approved_count": outcome.approved_count(),
        })),
    )
        .into_response()
}
