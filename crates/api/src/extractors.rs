//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use roboclub_core::AdminToken;

use crate::middleware::RequestIdentity;

/// Authenticated member extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestIdentity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Identity is set by the gateway middleware
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .map(AuthUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Admin extractor: authenticated identity with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub token: AdminToken,
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))?;

        if !identity.is_admin {
            return Err((StatusCode::FORBIDDEN, "Admin access required"));
        }

        Ok(Self {
            token: AdminToken::new(identity.user_id),
        })
    }
}
