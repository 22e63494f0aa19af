//! Member profile mirror entity.
//!
//! Display-only mirror of the club's identity directory (name and
//! enrollment number). The lending subsystem reads it for joins and never
//! treats it as authoritative; the identity service keeps it in sync.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Display profile of a club member.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_profile")]
pub struct Model {
    /// Member's user ID as issued by the identity provider.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    /// Human-readable name.
    pub display_name: String,

    /// Institute enrollment number.
    pub enrollment_id: String,

    /// When the mirror row was created.
    pub created_at: DateTime<Utc>,

    /// When the mirror row was last synced.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
