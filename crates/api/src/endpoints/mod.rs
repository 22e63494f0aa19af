//! API endpoints.

mod components;
mod lab_admin;
mod lab_requests;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/lab/components", components::router())
        .nest("/lab/requests", lab_requests::router())
        .nest("/lab/admin", lab_admin::router())
}
