use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bakeops_allocation::ApprovalError;
use bakeops_core::DomainError;
use bakeops_stock::{LedgerError, Station};
use bakeops_transfer::RequestStoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn approval_error_to_response(err: ApprovalError) -> axum::response::Response {
    match err {
        ApprovalError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "transfer request not found")
        }
        ApprovalError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", err.to_string())
        }
        ApprovalError::InsufficientStock {
            store_id,
            ingredient_id,
            required,
            available,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": format!(
                    "insufficient stock for ingredient {ingredient_id} at store {store_id}"
                ),
                "store_id": store_id.to_string(),
                "ingredient_id": ingredient_id.to_string(),
                "required": required,
                "available": available,
            })),
        )
            .into_response(),
        ApprovalError::NothingToApprove => json_error(
            StatusCode::BAD_REQUEST,
            "nothing_to_approve",
            "none of the given requests is pending",
        ),
        ApprovalError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::InsufficientStock {
            store_id,
            ingredient_id,
            requested,
            available,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": format!(
                    "insufficient stock for ingredient {ingredient_id} at store {store_id}"
                ),
                "store_id": store_id.to_string(),
                "ingredient_id": ingredient_id.to_string(),
                "required": requested,
                "available": available,
            })),
        )
            .into_response(),
        LedgerError::InvalidQuantity(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_quantity", msg)
        }
        LedgerError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        LedgerError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
    }
}

pub fn request_store_error_to_response(err: RequestStoreError) -> axum::response::Response {
    match err {
        RequestStoreError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "transfer request not found")
        }
        RequestStoreError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", err.to_string())
        }
        RequestStoreError::Duplicate => {
            json_error(StatusCode::CONFLICT, "conflict", "transfer request already exists")
        }
        RequestStoreError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
    }
}

pub fn parse_station(s: &str) -> Result<Station, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "dough" => Ok(Station::Dough),
        "oven" => Ok(Station::Oven),
        "pastry" => Ok(Station::Pastry),
        "counter" => Ok(Station::Counter),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_station",
            "station must be one of: dough, oven, pastry, counter",
        )),
    }
}
