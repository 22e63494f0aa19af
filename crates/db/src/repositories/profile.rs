//! Member profile repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{MemberProfile, member_profile};
use roboclub_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::OnConflict,
};

/// Member profile repository for display joins.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by user ID.
    pub async fn find_by_id(&self, user_id: &str) -> AppResult<Option<member_profile::Model>> {
        MemberProfile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load profiles for a batch of user IDs, keyed by user ID.
    ///
    /// Missing profiles are simply absent from the map; the directory
    /// mirror may lag behind the identity provider.
    pub async fn find_by_ids(
        &self,
        user_ids: &[String],
    ) -> AppResult<HashMap<String, member_profile::Model>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = MemberProfile::find()
            .filter(member_profile::Column::UserId.is_in(user_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect())
    }

    /// Insert or refresh a mirror row (called from the identity sync hook).
    pub async fn upsert(&self, model: member_profile::ActiveModel) -> AppResult<()> {
        MemberProfile::insert(model)
            .on_conflict(
                OnConflict::column(member_profile::Column::UserId)
                    .update_columns([
                        member_profile::Column::DisplayName,
                        member_profile::Column::EnrollmentId,
                        member_profile::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_ids_keys_by_user_id() {
        let profiles = vec![
            member_profile::Model {
                user_id: "u1".to_string(),
                display_name: "Asha Rao".to_string(),
                enrollment_id: "21BRS1043".to_string(),
                created_at: Utc::now(),
                updated_at: None,
            },
            member_profile::Model {
                user_id: "u2".to_string(),
                display_name: "Dev Patel".to_string(),
                enrollment_id: "22BRS0911".to_string(),
                created_at: Utc::now(),
                updated_at: None,
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([profiles])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let map = repo
            .find_by_ids(&["u1".to_string(), "u2".to_string()])
            .await
            .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["u1"].enrollment_id, "21BRS1043");
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ProfileRepository::new(db);
        let map = repo.find_by_ids(&[]).await.unwrap();

        assert!(map.is_empty());
    }
}
