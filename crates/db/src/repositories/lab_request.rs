//! Lending request repository.
//!
//! Read side of the request ledger. Lifecycle writes (create, approve,
//! reject, return) are transactional and live in the core services.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{
    LabAccessRequest, LabRequestItem, lab_access_request,
    lab_access_request::RequestStatus, lab_request_item,
};
use roboclub_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Lending request repository for database operations.
#[derive(Clone)]
pub struct LabRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl LabRequestRepository {
    /// Create a new lending request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<lab_access_request::Model>> {
        LabAccessRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<lab_access_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RequestNotFound(id.to_string()))
    }

    /// Load the line items of a request.
    pub async fn find_items(&self, request_id: &str) -> AppResult<Vec<lab_request_item::Model>> {
        LabRequestItem::find()
            .filter(lab_request_item::Column::RequestId.eq(request_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load items for a batch of requests, grouped by request ID.
    pub async fn find_items_grouped(
        &self,
        request_ids: &[String],
    ) -> AppResult<HashMap<String, Vec<lab_request_item::Model>>> {
        if request_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let items = LabRequestItem::find()
            .filter(lab_request_item::Column::RequestId.is_in(request_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut grouped: HashMap<String, Vec<lab_request_item::Model>> = HashMap::new();
        for item in items {
            grouped.entry(item.request_id.clone()).or_default().push(item);
        }

        Ok(grouped)
    }

    /// List a member's own requests, newest first.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<lab_access_request::Model>> {
        LabAccessRequest::find()
            .filter(lab_access_request::Column::UserId.eq(user_id))
            .order_by_desc(lab_access_request::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every request, newest first (admin view).
    pub async fn list_all(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<lab_access_request::Model>> {
        LabAccessRequest::find()
            .order_by_desc(lab_access_request::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a member's requests (all statuses).
    pub async fn count_for_user(&self, user_id: &str) -> AppResult<u64> {
        LabAccessRequest::find()
            .filter(lab_access_request::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count requests awaiting review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        LabAccessRequest::find()
            .filter(lab_access_request::Column::Status.eq(RequestStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count open requests: approved with equipment still out.
    pub async fn count_open(&self) -> AppResult<u64> {
        LabAccessRequest::find()
            .filter(lab_access_request::Column::Status.eq(RequestStatus::Approved))
            .filter(lab_access_request::Column::ItemsReturned.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all requests.
    pub async fn count_all(&self) -> AppResult<u64> {
        LabAccessRequest::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::lab_access_request::RequestPurpose;
    use chrono::{NaiveDate, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn request(id: &str, user_id: &str, status: RequestStatus) -> lab_access_request::Model {
        lab_access_request::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            purpose: RequestPurpose::Project,
            return_date: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            group_members: None,
            status,
            admin_notes: None,
            items_returned: false,
            reviewed_by: None,
            reviewed_at: None,
            returned_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_maps_missing_to_request_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<lab_access_request::Model>::new()])
                .into_connection(),
        );

        let repo = LabRequestRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();

        assert!(matches!(err, AppError::RequestNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_list_for_user_returns_only_queried_rows() {
        let r1 = request("r1", "u1", RequestStatus::Pending);
        let r2 = request("r2", "u1", RequestStatus::Approved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = LabRequestRepository::new(db);
        let listed = repo.list_for_user("u1", 10, 0).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.user_id == "u1"));
    }

    #[tokio::test]
    async fn test_count_for_user_reads_count_row() {
        let mut row = std::collections::BTreeMap::new();
        row.insert("num_items", sea_orm::Value::BigInt(Some(7)));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = LabRequestRepository::new(db);
        let count = repo.count_for_user("u1").await.unwrap();

        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_find_items_grouped_skips_query_when_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LabRequestRepository::new(db);
        let grouped = repo.find_items_grouped(&[]).await.unwrap();

        assert!(grouped.is_empty());
    }

    #[tokio::test]
    async fn test_find_items_grouped_groups_by_request() {
        let items = vec![
            lab_request_item::Model {
                id: "i1".to_string(),
                request_id: "r1".to_string(),
                component_id: "c1".to_string(),
                quantity: 2,
                is_returned: false,
                returned_at: None,
            },
            lab_request_item::Model {
                id: "i2".to_string(),
                request_id: "r1".to_string(),
                component_id: "c2".to_string(),
                quantity: 1,
                is_returned: false,
                returned_at: None,
            },
            lab_request_item::Model {
                id: "i3".to_string(),
                request_id: "r2".to_string(),
                component_id: "c1".to_string(),
                quantity: 1,
                is_returned: false,
                returned_at: None,
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([items])
                .into_connection(),
        );

        let repo = LabRequestRepository::new(db);
        let grouped = repo
            .find_items_grouped(&["r1".to_string(), "r2".to_string()])
            .await
            .unwrap();

        assert_eq!(grouped["r1"].len(), 2);
        assert_eq!(grouped["r2"].len(), 1);
    }
}
