//! Component catalog endpoints (member-facing).

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use roboclub_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create component catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_components))
        .route("/{id}", get(get_component))
}

/// Component response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<roboclub_db::entities::lab_component::Model> for ComponentResponse {
    fn from(component: roboclub_db::entities::lab_component::Model) -> Self {
        Self {
            id: component.id,
            name: component.name,
            description: component.description,
            category: component.category,
            total_quantity: component.total_quantity,
            available_quantity: component.available_quantity,
            created_at: component.created_at,
            updated_at: component.updated_at,
        }
    }
}

/// Component list response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentListResponse {
    pub components: Vec<ComponentResponse>,
    pub total: u64,
}

/// Component list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListComponentsQuery {
    /// Only list components with at least this many units available.
    #[serde(default = "default_min_quantity")]
    pub min_quantity: i32,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_min_quantity() -> i32 {
    1
}

const fn default_limit() -> u64 {
    20
}

/// List components currently available for lending, name-ascending.
async fn list_components(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListComponentsQuery>,
) -> AppResult<ApiResponse<ComponentListResponse>> {
    let page = state
        .inventory_service
        .list_available(query.min_quantity, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(ComponentListResponse {
        components: page.components.into_iter().map(Into::into).collect(),
        total: page.total,
    }))
}

/// Get a single component.
async fn get_component(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ComponentResponse>> {
    let component = state.inventory_service.get_component(&id).await?;
    Ok(ApiResponse::ok(component.into()))
}
