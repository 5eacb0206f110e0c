use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::context::CallerContext;

/// Header the hosting layer uses to convey the acting staff member.
pub const STAFF_ID_HEADER: &str = "x-staff-id";

/// Require a caller identity on every domain route.
///
/// The identity is not verified here; authentication is the hosting
/// layer's concern. A missing or empty header is rejected so that audit
/// fields (`requested_by`, `decided_by`) are never blank.
pub async fn identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let staff_id = extract_staff_id(req.headers())?;

    req.extensions_mut().insert(CallerContext::new(staff_id));

    Ok(next.run(req).await)
}

fn extract_staff_id(headers: &HeaderMap) -> Result<String, StatusCode> {
    let header = headers
        .get(STAFF_ID_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let staff_id = header.trim();
    if staff_id.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(staff_id.to_string())
}
