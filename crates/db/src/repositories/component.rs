//! Lab component repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{
    LabComponent, LabRequestItem, lab_access_request, lab_access_request::RequestStatus,
    lab_component, lab_request_item,
};
use chrono::Utc;
use roboclub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// Lab component repository for database operations.
#[derive(Clone)]
pub struct ComponentRepository {
    db: Arc<DatabaseConnection>,
}

impl ComponentRepository {
    /// Create a new component repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a component by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<lab_component::Model>> {
        LabComponent::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a component by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<lab_component::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ComponentNotFound(id.to_string()))
    }

    /// Load a batch of components keyed by ID.
    pub async fn find_by_ids(
        &self,
        ids: &[String],
    ) -> AppResult<HashMap<String, lab_component::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let components = LabComponent::find()
            .filter(lab_component::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(components.into_iter().map(|c| (c.id.clone(), c)).collect())
    }

    /// Create a new component.
    pub async fn create(&self, model: lab_component::ActiveModel) -> AppResult<lab_component::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a component's descriptive fields.
    pub async fn update(&self, model: lab_component::ActiveModel) -> AppResult<lab_component::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a total-quantity change as one conditional statement.
    ///
    /// The available counter moves by the same delta, clamped into
    /// `[0, new_total]`. The WHERE clause requires the total the caller
    /// read (compare-and-set); returns `false` when another writer got
    /// there first, so the caller can re-read and retry.
    pub async fn apply_total_change(
        &self,
        id: &str,
        old_total: i32,
        new_total: i32,
    ) -> AppResult<bool> {
        use sea_orm::sea_query::Expr;

        let delta = new_total - old_total;
        let result = LabComponent::update_many()
            .col_expr(lab_component::Column::TotalQuantity, Expr::value(new_total))
            .col_expr(
                lab_component::Column::AvailableQuantity,
                Expr::cust(format!(
                    "LEAST({new_total}, GREATEST(available_quantity + {delta}, 0))"
                )),
            )
            .col_expr(lab_component::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(lab_component::Column::Id.eq(id))
            .filter(lab_component::Column::TotalQuantity.eq(old_total))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Delete a component permanently.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        LabComponent::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Count request items that still hold (or may hold) this component:
    /// lines of pending requests, plus unreturned lines of approved ones.
    pub async fn count_open_items(&self, component_id: &str) -> AppResult<u64> {
        LabRequestItem::find()
            .join(JoinType::InnerJoin, lab_request_item::Relation::Request.def())
            .filter(lab_request_item::Column::ComponentId.eq(component_id))
            .filter(
                Condition::any()
                    .add(lab_access_request::Column::Status.eq(RequestStatus::Pending))
                    .add(
                        Condition::all()
                            .add(lab_access_request::Column::Status.eq(RequestStatus::Approved))
                            .add(lab_request_item::Column::IsReturned.eq(false)),
                    ),
            )
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List components with at least `min_quantity` units available,
    /// ordered by name ascending.
    pub async fn list_available(
        &self,
        min_quantity: i32,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<lab_component::Model>> {
        LabComponent::find()
            .filter(lab_component::Column::AvailableQuantity.gte(min_quantity))
            .order_by_asc(lab_component::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count components with at least `min_quantity` units available.
    pub async fn count_available(&self, min_quantity: i32) -> AppResult<u64> {
        LabComponent::find()
            .filter(lab_component::Column::AvailableQuantity.gte(min_quantity))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all components (including exhausted ones), ordered by name.
    pub async fn list_all(&self, limit: u64, offset: u64) -> AppResult<Vec<lab_component::Model>> {
        LabComponent::find()
            .order_by_asc(lab_component::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all components.
    pub async fn count_all(&self) -> AppResult<u64> {
        LabComponent::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn component(id: &str, name: &str, total: i32, available: i32) -> lab_component::Model {
        lab_component::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            category: None,
            total_quantity: total,
            available_quantity: available,
            created_by: "admin1".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_maps_missing_to_component_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<lab_component::Model>::new()])
                .into_connection(),
        );

        let repo = ComponentRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();

        assert!(matches!(err, AppError::ComponentNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_apply_total_change_reports_cas_miss() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ComponentRepository::new(db);
        let applied = repo.apply_total_change("c1", 5, 8).await.unwrap();

        assert!(!applied);
    }

    #[tokio::test]
    async fn test_list_available_orders_by_name() {
        let a = component("c1", "Arduino Uno", 5, 5);
        let b = component("c2", "Breadboard", 10, 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a.clone(), b.clone()]])
                .into_connection(),
        );

        let repo = ComponentRepository::new(db);
        let listed = repo.list_available(1, 20, 0).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Arduino Uno");
    }
}
