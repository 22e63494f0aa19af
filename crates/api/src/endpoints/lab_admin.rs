//! Lending desk endpoints (admin-facing).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use roboclub_common::AppResult;
use roboclub_core::inventory::{CreateComponentInput, UpdateComponentInput};
use roboclub_db::entities::lab_access_request::{RequestPurpose, RequestStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    components::{ComponentListResponse, ComponentResponse},
    lab_requests::{RequestListResponse, RequesterResponse},
};
use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// Create lending desk router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/components", get(list_components))
        .route("/components", post(create_component))
        .route("/components/{id}", put(update_component))
        .route("/components/{id}", delete(delete_component))
        .route("/requests", get(list_requests))
        .route("/requests/{id}", get(request_detail))
        .route("/requests/{id}/approve", post(approve_request))
        .route("/requests/{id}/reject", post(reject_request))
        .route("/requests/{id}/return", post(mark_returned))
        .route("/stats", get(queue_stats))
}

/// Create component payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComponentPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[validate(range(min = 0))]
    pub total_quantity: i32,
}

/// Update component payload. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComponentPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[validate(range(min = 0))]
    pub total_quantity: Option<i32>,
}

/// Review payload for approve/reject.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub notes: Option<String>,
}

/// Review outcome response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedRequestResponse {
    pub id: String,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub items_returned: bool,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<roboclub_db::entities::lab_access_request::Model> for ReviewedRequestResponse {
    fn from(request: roboclub_db::entities::lab_access_request::Model) -> Self {
        Self {
            id: request.id,
            status: request.status,
            admin_notes: request.admin_notes,
            items_returned: request.items_returned,
            reviewed_by: request.reviewed_by,
            reviewed_at: request.reviewed_at,
            returned_at: request.returned_at,
        }
    }
}

/// Request line item with the component's display name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetailResponse {
    pub id: String,
    pub component_id: String,
    pub component_name: String,
    pub quantity: i32,
    pub is_returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Full request detail for the review screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetailResponse {
    pub id: String,
    pub requester: RequesterResponse,
    pub purpose: RequestPurpose,
    pub return_date: NaiveDate,
    pub group_members: Option<String>,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub items_returned: bool,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ItemDetailResponse>,
}

/// Review queue stats response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatsResponse {
    pub pending_count: u64,
    pub open_count: u64,
}

/// Pagination query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// List every component, including exhausted ones.
async fn list_components(
    admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<ComponentListResponse>> {
    let page = state
        .inventory_service
        .list_all(&admin.token, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(ComponentListResponse {
        components: page.components.into_iter().map(Into::into).collect(),
        total: page.total,
    }))
}

/// Add a component to the inventory.
async fn create_component(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateComponentPayload>,
) -> AppResult<ApiResponse<ComponentResponse>> {
    payload.validate()?;

    let component = state
        .inventory_service
        .create_component(
            &admin.token,
            CreateComponentInput {
                name: payload.name,
                description: payload.description,
                category: payload.category,
                total_quantity: payload.total_quantity,
            },
        )
        .await?;

    Ok(ApiResponse::ok(component.into()))
}

/// Update a component's details or total stock.
async fn update_component(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateComponentPayload>,
) -> AppResult<ApiResponse<ComponentResponse>> {
    payload.validate()?;

    let component = state
        .inventory_service
        .update_component(
            &admin.token,
            &id,
            UpdateComponentInput {
                name: payload.name,
                description: payload.description,
                category: payload.category,
                total_quantity: payload.total_quantity,
            },
        )
        .await?;

    Ok(ApiResponse::ok(component.into()))
}

/// Delete a component. Refused while open requests still reference it.
async fn delete_component(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.inventory_service.delete_component(&admin.token, &id).await?;
    Ok(crate::response::ok())
}

/// List every lending request, newest first.
async fn list_requests(
    admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<RequestListResponse>> {
    let page = state
        .lab_request_service
        .list_all(&admin.token, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(RequestListResponse {
        requests: page.requests.into_iter().map(Into::into).collect(),
        total: page.total,
    }))
}

/// Full detail of one request for the review screen.
async fn request_detail(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RequestDetailResponse>> {
    let detail = state
        .lab_review_service
        .request_detail(&admin.token, &id)
        .await?;

    let request = detail.request;
    Ok(ApiResponse::ok(RequestDetailResponse {
        id: request.id,
        requester: detail.requester.into(),
        purpose: request.purpose,
        return_date: request.return_date,
        group_members: request.group_members,
        status: request.status,
        admin_notes: request.admin_notes,
        items_returned: request.items_returned,
        reviewed_by: request.reviewed_by,
        reviewed_at: request.reviewed_at,
        returned_at: request.returned_at,
        created_at: request.created_at,
        items: detail
            .items
            .into_iter()
            .map(|d| ItemDetailResponse {
                id: d.item.id,
                component_id: d.item.component_id,
                component_name: d.component_name,
                quantity: d.item.quantity,
                is_returned: d.item.is_returned,
                returned_at: d.item.returned_at,
            })
            .collect(),
    }))
}

/// Approve a pending request, reserving its stock.
async fn approve_request(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<ReviewPayload>>,
) -> AppResult<ApiResponse<ReviewedRequestResponse>> {
    let notes = payload.and_then(|Json(p)| p.notes);
    let request = state
        .reservation_service
        .approve(&admin.token, &id, notes)
        .await?;

    Ok(ApiResponse::ok(request.into()))
}

/// Reject a pending request.
async fn reject_request(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<ReviewPayload>>,
) -> AppResult<ApiResponse<ReviewedRequestResponse>> {
    let notes = payload.and_then(|Json(p)| p.notes);
    let request = state
        .reservation_service
        .reject(&admin.token, &id, notes)
        .await?;

    Ok(ApiResponse::ok(request.into()))
}

/// Mark an approved request's equipment as handed back.
async fn mark_returned(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReviewedRequestResponse>> {
    let request = state
        .reservation_service
        .mark_returned(&admin.token, &id)
        .await?;

    Ok(ApiResponse::ok(request.into()))
}

/// Queue counters for the admin dashboard.
async fn queue_stats(
    admin: AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<QueueStatsResponse>> {
    let stats = state.lab_review_service.queue_stats(&admin.token).await?;

    Ok(ApiResponse::ok(QueueStatsResponse {
        pending_count: stats.pending_count,
        open_count: stats.open_count,
    }))
}
