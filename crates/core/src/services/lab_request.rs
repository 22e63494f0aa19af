//! Lending request service: the member-facing request ledger.
//!
//! Creation validates against current availability but reserves nothing;
//! stock is locked only when an admin approves (see `reservation`). That
//! soft-hold contract means several pending requests may together promise
//! more than the shelf holds; the approval-time re-check is the backstop.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use roboclub_common::{AppError, AppResult, IdGenerator};
use roboclub_db::{
    entities::{
        LabComponent, LabRequestItem, lab_access_request,
        lab_access_request::{RequestPurpose, RequestStatus},
        lab_request_item, member_profile,
    },
    repositories::{LabRequestRepository, ProfileRepository},
};
use sea_orm::{DatabaseConnection, EntityTrait, Set, TransactionTrait};
use tracing::info;

use super::AdminToken;

/// Lending request service for the member-facing ledger.
#[derive(Clone)]
pub struct LabRequestService {
    db: Arc<DatabaseConnection>,
    requests: LabRequestRepository,
    profiles: ProfileRepository,
    id_gen: IdGenerator,
}

/// One requested component + quantity line.
pub struct NewRequestItem {
    pub component_id: String,
    pub quantity: i32,
}

/// Input for creating a lending request.
pub struct CreateRequestInput {
    pub items: Vec<NewRequestItem>,
    pub purpose: RequestPurpose,
    pub return_date: NaiveDate,
    pub group_members: Option<String>,
}

/// Display summary of the requester, joined from the profile mirror.
#[derive(Debug, Clone)]
pub struct ProfileSummary {
    pub user_id: String,
    pub display_name: String,
    pub enrollment_id: Option<String>,
}

impl ProfileSummary {
    /// Fallback when the directory mirror has no row yet: show the bare ID.
    #[must_use]
    pub fn bare(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            enrollment_id: None,
        }
    }
}

impl From<member_profile::Model> for ProfileSummary {
    fn from(profile: member_profile::Model) -> Self {
        Self {
            user_id: profile.user_id,
            display_name: profile.display_name,
            enrollment_id: Some(profile.enrollment_id),
        }
    }
}

/// A request annotated with its items and the requester's profile.
#[derive(Debug)]
pub struct RequestSummary {
    pub request: lab_access_request::Model,
    pub items: Vec<lab_request_item::Model>,
    pub requester: ProfileSummary,
}

/// A page of request summaries with the total row count.
#[derive(Debug)]
pub struct RequestPage {
    pub requests: Vec<RequestSummary>,
    pub total: u64,
}

impl LabRequestService {
    /// Create a new lending request service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        requests: LabRequestRepository,
        profiles: ProfileRepository,
    ) -> Self {
        Self {
            db,
            requests,
            profiles,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a lending request.
    ///
    /// The request and all of its items are inserted in one transaction;
    /// a failure partway through leaves nothing behind. Quantities are
    /// checked against the shelf at submission time only.
    pub async fn create_request(
        &self,
        user_id: &str,
        input: CreateRequestInput,
    ) -> AppResult<lab_access_request::Model> {
        if input.items.is_empty() {
            return Err(AppError::Validation(
                "A lending request needs at least one item".to_string(),
            ));
        }
        if input.return_date < Utc::now().date_naive() {
            return Err(AppError::Validation(
                "Return date cannot be in the past".to_string(),
            ));
        }
        for item in &input.items {
            if item.quantity < 1 {
                return Err(AppError::Validation(
                    "Item quantity must be at least 1".to_string(),
                ));
            }
        }
        {
            let mut seen = std::collections::HashSet::new();
            for item in &input.items {
                if !seen.insert(item.component_id.as_str()) {
                    return Err(AppError::Validation(
                        "A component appears more than once in the request".to_string(),
                    ));
                }
            }
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Availability check inside the transaction; still only a snapshot,
        // the approval re-checks before any stock moves.
        for item in &input.items {
            let component = LabComponent::find_by_id(&item.component_id)
                .one(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .ok_or_else(|| AppError::ComponentNotFound(item.component_id.clone()))?;

            if item.quantity > component.available_quantity {
                return Err(AppError::InsufficientStock(component.name));
            }
        }

        let request_id = self.id_gen.generate();
        let request = lab_access_request::ActiveModel {
            id: Set(request_id.clone()),
            user_id: Set(user_id.to_string()),
            purpose: Set(input.purpose),
            return_date: Set(input.return_date),
            group_members: Set(input.group_members),
            status: Set(RequestStatus::Pending),
            admin_notes: Set(None),
            items_returned: Set(false),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            returned_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let created = lab_access_request::Entity::insert(request)
            .exec_with_returning(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let item_models: Vec<lab_request_item::ActiveModel> = input
            .items
            .iter()
            .map(|item| lab_request_item::ActiveModel {
                id: Set(self.id_gen.generate()),
                request_id: Set(request_id.clone()),
                component_id: Set(item.component_id.clone()),
                quantity: Set(item.quantity),
                is_returned: Set(false),
                returned_at: Set(None),
            })
            .collect();

        LabRequestItem::insert_many(item_models)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        info!(
            request_id = %created.id,
            user_id = %user_id,
            item_count = input.items.len(),
            "Created lending request"
        );

        Ok(created)
    }

    /// List a member's own requests, newest first, annotated with items
    /// and the requester's profile.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<RequestPage> {
        let requests = self.requests.list_for_user(user_id, limit, offset).await?;
        let total = self.requests.count_for_user(user_id).await?;
        self.annotate(requests, total).await
    }

    /// List every request, newest first (admin view).
    pub async fn list_all(
        &self,
        _token: &AdminToken,
        limit: u64,
        offset: u64,
    ) -> AppResult<RequestPage> {
        let requests = self.requests.list_all(limit, offset).await?;
        let total = self.requests.count_all().await?;
        self.annotate(requests, total).await
    }

    /// Get a request the member owns.
    pub async fn get_for_user(&self, user_id: &str, id: &str) -> AppResult<RequestSummary> {
        let request = self.requests.get_by_id(id).await?;
        if request.user_id != user_id {
            return Err(AppError::Forbidden(
                "Request belongs to another member".to_string(),
            ));
        }

        let items = self.requests.find_items(id).await?;
        let requester = self
            .profiles
            .find_by_id(user_id)
            .await?
            .map_or_else(|| ProfileSummary::bare(user_id), ProfileSummary::from);

        Ok(RequestSummary {
            request,
            items,
            requester,
        })
    }

    async fn annotate(
        &self,
        requests: Vec<lab_access_request::Model>,
        total: u64,
    ) -> AppResult<RequestPage> {
        let request_ids: Vec<String> = requests.iter().map(|r| r.id.clone()).collect();
        let mut items = self.requests.find_items_grouped(&request_ids).await?;

        let user_ids: Vec<String> = {
            let mut ids: Vec<String> = requests.iter().map(|r| r.user_id.clone()).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let profiles: HashMap<String, member_profile::Model> =
            self.profiles.find_by_ids(&user_ids).await?;

        let summaries = requests
            .into_iter()
            .map(|request| {
                let requester = profiles.get(&request.user_id).map_or_else(
                    || ProfileSummary::bare(&request.user_id),
                    |p| ProfileSummary::from(p.clone()),
                );
                let items = items.remove(&request.id).unwrap_or_default();
                RequestSummary {
                    request,
                    items,
                    requester,
                }
            })
            .collect();

        Ok(RequestPage {
            requests: summaries,
            total,
        })
    }
}
