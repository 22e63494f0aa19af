//! Lending request endpoints (member-facing).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use roboclub_common::AppResult;
use roboclub_core::lab_request::{
    CreateRequestInput, NewRequestItem, ProfileSummary, RequestSummary,
};
use roboclub_db::entities::lab_access_request::{RequestPurpose, RequestStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create lending request router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_request))
        .route("/mine", get(list_my_requests))
        .route("/{id}", get(get_request))
}

/// Request line item response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItemResponse {
    pub id: String,
    pub component_id: String,
    pub quantity: i32,
    pub is_returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<roboclub_db::entities::lab_request_item::Model> for RequestItemResponse {
    fn from(item: roboclub_db::entities::lab_request_item::Model) -> Self {
        Self {
            id: item.id,
            component_id: item.component_id,
            quantity: item.quantity,
            is_returned: item.is_returned,
            returned_at: item.returned_at,
        }
    }
}

/// Requester profile response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterResponse {
    pub user_id: String,
    pub display_name: String,
    pub enrollment_id: Option<String>,
}

impl From<ProfileSummary> for RequesterResponse {
    fn from(profile: ProfileSummary) -> Self {
        Self {
            user_id: profile.user_id,
            display_name: profile.display_name,
            enrollment_id: profile.enrollment_id,
        }
    }
}

/// Lending request response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
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
    pub items: Vec<RequestItemResponse>,
}

impl From<RequestSummary> for RequestResponse {
    fn from(summary: RequestSummary) -> Self {
        let request = summary.request;
        Self {
            id: request.id,
            requester: summary.requester.into(),
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
            items: summary.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request list response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListResponse {
    pub requests: Vec<RequestResponse>,
    pub total: u64,
}

/// One requested line in the create payload.
// Serialize is required by the length validator on the parent's item list.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestItem {
    #[validate(length(min = 1))]
    pub component_id: String,

    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Create request payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    #[validate(length(min = 1), nested)]
    pub items: Vec<CreateRequestItem>,

    pub purpose: RequestPurpose,
    pub return_date: NaiveDate,

    #[validate(length(max = 1000))]
    pub group_members: Option<String>,
}

/// Created request response: the bare ledger row, before any review.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRequestResponse {
    pub id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// List query for the member's own requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequestsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Submit a lending request.
async fn create_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateRequestPayload>,
) -> AppResult<ApiResponse<CreatedRequestResponse>> {
    payload.validate()?;

    let input = CreateRequestInput {
        items: payload
            .items
            .into_iter()
            .map(|item| NewRequestItem {
                component_id: item.component_id,
                quantity: item.quantity,
            })
            .collect(),
        purpose: payload.purpose,
        return_date: payload.return_date,
        group_members: payload.group_members,
    };

    let created = state
        .lab_request_service
        .create_request(&user.user_id, input)
        .await?;

    Ok(ApiResponse::ok(CreatedRequestResponse {
        id: created.id,
        status: created.status,
        created_at: created.created_at,
    }))
}

/// List the member's own requests, newest first.
async fn list_my_requests(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> AppResult<ApiResponse<RequestListResponse>> {
    let page = state
        .lab_request_service
        .list_for_user(&user.user_id, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(RequestListResponse {
        requests: page.requests.into_iter().map(Into::into).collect(),
        total: page.total,
    }))
}

/// Get one of the member's own requests.
async fn get_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RequestResponse>> {
    let summary = state
        .lab_request_service
        .get_for_user(&user.user_id, &id)
        .await?;

    Ok(ApiResponse::ok(summary.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(items: Vec<CreateRequestItem>) -> CreateRequestPayload {
        CreateRequestPayload {
            items,
            purpose: RequestPurpose::Project,
            return_date: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            group_members: None,
        }
    }

    #[test]
    fn test_create_payload_rejects_empty_items() {
        let err = payload(vec![]).validate().unwrap_err();
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn test_create_payload_rejects_zero_quantity() {
        let result = payload(vec![CreateRequestItem {
            component_id: "c1".to_string(),
            quantity: 0,
        }])
        .validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_create_payload_accepts_valid_items() {
        let result = payload(vec![CreateRequestItem {
            component_id: "c1".to_string(),
            quantity: 2,
        }])
        .validate();
        assert!(result.is_ok());
    }
}
