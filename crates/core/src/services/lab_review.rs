//! Review workflow: the admin-facing read side of the lending desk.
//!
//! Queue counters for the dashboard and a fully-joined request detail
//! (line items with component names, requester profile). Lifecycle
//! writes live in `reservation`.

use roboclub_common::AppResult;
use roboclub_db::{
    entities::{lab_access_request, lab_request_item},
    repositories::{ComponentRepository, LabRequestRepository, ProfileRepository},
};

use super::{AdminToken, lab_request::ProfileSummary};

/// Review workflow service for the admin dashboard.
#[derive(Clone)]
pub struct LabReviewService {
    requests: LabRequestRepository,
    components: ComponentRepository,
    profiles: ProfileRepository,
}

/// Counters for the review queue badge.
#[derive(Debug, Clone, Copy)]
pub struct ReviewQueueStats {
    /// Requests awaiting review.
    pub pending_count: u64,
    /// Approved requests whose equipment is still out.
    pub open_count: u64,
}

/// A request line item joined with its component's display name.
pub struct ItemDetail {
    pub item: lab_request_item::Model,
    pub component_name: String,
}

/// A request with everything a reviewer needs on one screen.
pub struct RequestDetail {
    pub request: lab_access_request::Model,
    pub items: Vec<ItemDetail>,
    pub requester: ProfileSummary,
}

impl LabReviewService {
    /// Create a new review workflow service.
    #[must_use]
    pub const fn new(
        requests: LabRequestRepository,
        components: ComponentRepository,
        profiles: ProfileRepository,
    ) -> Self {
        Self {
            requests,
            components,
            profiles,
        }
    }

    /// Queue counters for the admin dashboard.
    pub async fn queue_stats(&self, _token: &AdminToken) -> AppResult<ReviewQueueStats> {
        let pending_count = self.requests.count_pending().await?;
        let open_count = self.requests.count_open().await?;

        Ok(ReviewQueueStats {
            pending_count,
            open_count,
        })
    }

    /// Full detail of one request for the review screen.
    pub async fn request_detail(&self, _token: &AdminToken, id: &str) -> AppResult<RequestDetail> {
        let request = self.requests.get_by_id(id).await?;
        let items = self.requests.find_items(id).await?;

        let component_ids: Vec<String> = {
            let mut ids: Vec<String> = items.iter().map(|i| i.component_id.clone()).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let components = self.components.find_by_ids(&component_ids).await?;

        let requester = self
            .profiles
            .find_by_id(&request.user_id)
            .await?
            .map_or_else(|| ProfileSummary::bare(&request.user_id), ProfileSummary::from);

        let items = items
            .into_iter()
            .map(|item| {
                // Component rows can vanish between the item load and this
                // join; show the raw ID rather than dropping the line.
                let component_name = components
                    .get(&item.component_id)
                    .map_or_else(|| item.component_id.clone(), |c| c.name.clone());
                ItemDetail {
                    item,
                    component_name,
                }
            })
            .collect();

        Ok(RequestDetail {
            request,
            items,
            requester,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use roboclub_db::entities::{
        lab_access_request::{RequestPurpose, RequestStatus},
        lab_component, member_profile,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: sea_orm::DatabaseConnection) -> LabReviewService {
        let db = Arc::new(db);
        LabReviewService::new(
            LabRequestRepository::new(Arc::clone(&db)),
            ComponentRepository::new(Arc::clone(&db)),
            ProfileRepository::new(db),
        )
    }

    fn request(id: &str) -> lab_access_request::Model {
        lab_access_request::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            purpose: RequestPurpose::Project,
            return_date: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            group_members: None,
            status: RequestStatus::Pending,
            admin_notes: None,
            items_returned: false,
            reviewed_by: None,
            reviewed_at: None,
            returned_at: None,
            created_at: Utc::now(),
        }
    }

    fn item(id: &str, component_id: &str, qty: i32) -> lab_request_item::Model {
        lab_request_item::Model {
            id: id.to_string(),
            request_id: "r1".to_string(),
            component_id: component_id.to_string(),
            quantity: qty,
            is_returned: false,
            returned_at: None,
        }
    }

    fn component(id: &str, name: &str) -> lab_component::Model {
        lab_component::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            category: None,
            total_quantity: 5,
            available_quantity: 5,
            created_by: "admin1".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_request_detail_joins_names_and_profile() {
        let profile = member_profile::Model {
            user_id: "u1".to_string(),
            display_name: "Asha Rao".to_string(),
            enrollment_id: "21BRS1042".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request("r1")]])
            .append_query_results([vec![item("i1", "c1", 2), item("i2", "c2", 1)]])
            .append_query_results([vec![
                component("c1", "Arduino Uno"),
                component("c2", "Breadboard"),
            ]])
            .append_query_results([[profile]])
            .into_connection();

        let svc = service(db);
        let token = AdminToken::new("admin1");

        let detail = svc.request_detail(&token, "r1").await.unwrap();

        assert_eq!(detail.requester.display_name, "Asha Rao");
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].component_name, "Arduino Uno");
        assert_eq!(detail.items[1].component_name, "Breadboard");
    }

    #[tokio::test]
    async fn test_request_detail_falls_back_to_ids() {
        // No component row and no profile row; raw IDs stand in.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request("r1")]])
            .append_query_results([vec![item("i1", "c_gone", 1)]])
            .append_query_results([Vec::<lab_component::Model>::new()])
            .append_query_results([Vec::<member_profile::Model>::new()])
            .into_connection();

        let svc = service(db);
        let token = AdminToken::new("admin1");

        let detail = svc.request_detail(&token, "r1").await.unwrap();

        assert_eq!(detail.items[0].component_name, "c_gone");
        assert_eq!(detail.requester.display_name, "u1");
    }
}
