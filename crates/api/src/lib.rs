//! HTTP API layer for roboclub.
//!
//! This crate provides the REST API of the lending subsystem:
//!
//! - **Endpoints**: member-facing catalog/request routes and the admin desk
//! - **Extractors**: gateway-asserted identity and the admin gate
//! - **Middleware**: identity propagation from the portal gateway
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, RequestIdentity, identity_middleware};
