//! Inventory service: the durable record of components and their stock.
//!
//! Admin-only CRUD plus the member-facing availability listing. Total
//! edits move the available counter by the same delta, clamped into
//! `[0, new_total]`, as one conditional statement; the lending lifecycle
//! itself never touches this module (see `reservation`).

use chrono::Utc;
use roboclub_common::{AppError, AppResult, IdGenerator};
use roboclub_db::{entities::lab_component, repositories::ComponentRepository};
use sea_orm::Set;
use tracing::info;

use super::AdminToken;

/// Inventory service for component stock-keeping.
#[derive(Clone)]
pub struct InventoryService {
    components: ComponentRepository,
    id_gen: IdGenerator,
}

/// Input for creating a component.
pub struct CreateComponentInput {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub total_quantity: i32,
}

/// Input for updating a component. `None` fields are left unchanged.
#[derive(Default)]
pub struct UpdateComponentInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub total_quantity: Option<i32>,
}

/// A page of components with the total row count.
pub struct ComponentPage {
    pub components: Vec<lab_component::Model>,
    pub total: u64,
}

impl InventoryService {
    /// Create a new inventory service.
    #[must_use]
    pub const fn new(components: ComponentRepository) -> Self {
        Self {
            components,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a component; the full stock starts on the shelf.
    pub async fn create_component(
        &self,
        token: &AdminToken,
        input: CreateComponentInput,
    ) -> AppResult<lab_component::Model> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Component name cannot be empty".to_string(),
            ));
        }
        if input.total_quantity < 0 {
            return Err(AppError::Validation(
                "Total quantity cannot be negative".to_string(),
            ));
        }

        let model = lab_component::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            description: Set(input.description),
            category: Set(input.category),
            total_quantity: Set(input.total_quantity),
            available_quantity: Set(input.total_quantity),
            created_by: Set(token.admin_id().to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let component = self.components.create(model).await?;

        info!(
            component_id = %component.id,
            name = %component.name,
            total = component.total_quantity,
            "Created lab component"
        );

        Ok(component)
    }

    /// Update a component's fields.
    ///
    /// A total-quantity change is applied with a compare-and-set on the
    /// total the service read; on a miss the mutation is retried once
    /// against fresh state, then surfaced as a conflict.
    pub async fn update_component(
        &self,
        _token: &AdminToken,
        id: &str,
        input: UpdateComponentInput,
    ) -> AppResult<lab_component::Model> {
        let existing = self.components.get_by_id(id).await?;

        if let Some(new_total) = input.total_quantity {
            if new_total < 0 {
                return Err(AppError::Validation(
                    "Total quantity cannot be negative".to_string(),
                ));
            }

            let mut applied = self
                .components
                .apply_total_change(id, existing.total_quantity, new_total)
                .await?;
            if !applied {
                // One retry against fresh state; no re-read after the
                // final miss.
                let fresh_total = self.components.get_by_id(id).await?.total_quantity;
                applied = self
                    .components
                    .apply_total_change(id, fresh_total, new_total)
                    .await?;
            }
            if !applied {
                return Err(AppError::Conflict(
                    "Component stock changed concurrently; please retry".to_string(),
                ));
            }
        }

        let has_detail_change =
            input.name.is_some() || input.description.is_some() || input.category.is_some();
        if has_detail_change {
            let mut model = lab_component::ActiveModel {
                id: Set(id.to_string()),
                ..Default::default()
            };
            if let Some(name) = input.name {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(AppError::Validation(
                        "Component name cannot be empty".to_string(),
                    ));
                }
                model.name = Set(name);
            }
            if let Some(description) = input.description {
                model.description = Set(Some(description));
            }
            if let Some(category) = input.category {
                model.category = Set(Some(category));
            }
            model.updated_at = Set(Some(Utc::now()));
            self.components.update(model).await?;
        }

        self.components.get_by_id(id).await
    }

    /// Delete a component.
    ///
    /// Refused while any open request still references it; releasing a
    /// component's last open item makes it deletable again.
    pub async fn delete_component(&self, _token: &AdminToken, id: &str) -> AppResult<()> {
        let component = self.components.get_by_id(id).await?;

        let open_items = self.components.count_open_items(id).await?;
        if open_items > 0 {
            return Err(AppError::Conflict(format!(
                "Component '{}' has {open_items} open request item(s) and cannot be deleted",
                component.name
            )));
        }

        self.components.delete(id).await?;

        info!(component_id = %id, name = %component.name, "Deleted lab component");
        Ok(())
    }

    /// Get a single component.
    pub async fn get_component(&self, id: &str) -> AppResult<lab_component::Model> {
        self.components.get_by_id(id).await
    }

    /// List components with at least `min_quantity` available, name-ascending.
    pub async fn list_available(
        &self,
        min_quantity: i32,
        limit: u64,
        offset: u64,
    ) -> AppResult<ComponentPage> {
        let min_quantity = min_quantity.max(1);
        let components = self
            .components
            .list_available(min_quantity, limit, offset)
            .await?;
        let total = self.components.count_available(min_quantity).await?;

        Ok(ComponentPage { components, total })
    }

    /// List every component, including exhausted ones (admin view).
    pub async fn list_all(
        &self,
        _token: &AdminToken,
        limit: u64,
        offset: u64,
    ) -> AppResult<ComponentPage> {
        let components = self.components.list_all(limit, offset).await?;
        let total = self.components.count_all().await?;

        Ok(ComponentPage { components, total })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: sea_orm::DatabaseConnection) -> InventoryService {
        InventoryService::new(ComponentRepository::new(Arc::new(db)))
    }

    fn component(id: &str, total: i32, available: i32) -> lab_component::Model {
        lab_component::Model {
            id: id.to_string(),
            name: "Arduino Uno".to_string(),
            description: None,
            category: Some("boards".to_string()),
            total_quantity: total,
            available_quantity: available,
            created_by: "admin1".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_component_rejects_empty_name() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let token = AdminToken::new("admin1");

        let err = svc
            .create_component(
                &token,
                CreateComponentInput {
                    name: "   ".to_string(),
                    description: None,
                    category: None,
                    total_quantity: 5,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_component_rejects_negative_total() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let token = AdminToken::new("admin1");

        let err = svc
            .create_component(
                &token,
                CreateComponentInput {
                    name: "Servo".to_string(),
                    description: None,
                    category: None,
                    total_quantity: -1,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_component_starts_fully_available() {
        let created = component("c1", 5, 5);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[created.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let svc = service(db);
        let token = AdminToken::new("admin1");

        let model = svc
            .create_component(
                &token,
                CreateComponentInput {
                    name: "Arduino Uno".to_string(),
                    description: None,
                    category: Some("boards".to_string()),
                    total_quantity: 5,
                },
            )
            .await
            .unwrap();

        assert_eq!(model.available_quantity, model.total_quantity);
    }

    #[tokio::test]
    async fn test_update_component_surfaces_conflict_after_retry() {
        // Read, CAS miss, re-read, CAS miss again -> conflict.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[component("c1", 5, 5)], [component("c1", 6, 6)]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let svc = service(db);
        let token = AdminToken::new("admin1");

        let err = svc
            .update_component(
                &token,
                "c1",
                UpdateComponentInput {
                    total_quantity: Some(8),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_component_blocked_by_open_items() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[component("c1", 5, 5)]])
            .append_query_results([[count_row(2)]])
            .into_connection();

        let svc = service(db);
        let token = AdminToken::new("admin1");

        let err = svc.delete_component(&token, "c1").await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    // Count queries come back as a single row with a `num_items` column.
    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut row = std::collections::BTreeMap::new();
        row.insert("num_items", sea_orm::Value::BigInt(Some(n)));
        row
    }
}
