//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use roboclub_core::{InventoryService, LabRequestService, LabReviewService, ReservationService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub inventory_service: InventoryService,
    pub lab_request_service: LabRequestService,
    pub reservation_service: ReservationService,
    pub lab_review_service: LabReviewService,
}

/// Identity asserted by the portal gateway.
///
/// The gateway terminates the member session and forwards the verified
/// identity as `x-user-id` / `x-user-role` headers; this subsystem trusts
/// those headers and never sees credentials.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub user_id: String,
    pub is_admin: bool,
}

/// Identity middleware.
///
/// Reads the gateway headers and stores a [`RequestIdentity`] in the
/// request extensions. Requests without an identity pass through; the
/// extractors reject them where one is required.
pub async fn identity_middleware(mut req: Request<Body>, next: Next) -> Response {
    let user_id = req
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string);

    if let Some(user_id) = user_id {
        let is_admin = req
            .headers()
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|role| role.eq_ignore_ascii_case("admin"));

        req.extensions_mut()
            .insert(RequestIdentity { user_id, is_admin });
    }

    next.run(req).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    async fn echo_identity(req: Request<Body>) -> String {
        req.extensions()
            .get::<RequestIdentity>()
            .map_or_else(|| "anonymous".to_string(), |id| {
                format!("{}:{}", id.user_id, id.is_admin)
            })
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|req: Request<Body>| async move { echo_identity(req).await }),
            )
            .layer(middleware::from_fn(identity_middleware))
    }

    #[tokio::test]
    async fn test_identity_from_gateway_headers() {
        let res = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("x-user-id", "u1")
                    .header("x-user-role", "admin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"u1:true");
    }

    #[tokio::test]
    async fn test_missing_headers_stay_anonymous() {
        let res = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"anonymous");
    }

    #[tokio::test]
    async fn test_blank_user_id_is_ignored() {
        let res = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("x-user-id", "   ")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"anonymous");
    }
}
