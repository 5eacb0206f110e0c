use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use bakeops_core::StoreId;

use crate::app::{dto, errors, services};
use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(caller): Extension<crate::context::CallerContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "staff_id": caller.staff_id(),
    }))
}

/// SSE stream of request-decision notifications for one store.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::StreamParams>,
) -> axum::response::Response {
    let store_id: StoreId = match params.store_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id"),
    };

    services::store_sse_stream(services, store_id).into_response()
}
