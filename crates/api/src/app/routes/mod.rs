use axum::{Router, routing::get};

pub mod ingredients;
pub mod requests;
pub mod stock;
pub mod stores;
pub mod system;

/// Router for all identity-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .nest("/stores", stores::router())
        .nest("/ingredients", ingredients::router())
        .nest("/stock", stock::router())
        .nest("/requests", requests::router())
}
