//! Lab component entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A physical lab part tracked by the inventory (e.g. a microcontroller board).
///
/// Invariant: `0 <= available_quantity <= total_quantity` at all times.
/// Every mutation path goes through a conditional UPDATE that preserves it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lab_component")]
pub struct Model {
    /// Unique component ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Component name.
    pub name: String,

    /// Free-text description (optional).
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Category label, e.g. "sensors" or "actuators" (optional).
    #[sea_orm(nullable)]
    pub category: Option<String>,

    /// Total units owned by the lab.
    pub total_quantity: i32,

    /// Units currently on the shelf (not reserved by an approved request).
    pub available_quantity: i32,

    /// Admin who created the component.
    pub created_by: String,

    /// When the component was created.
    pub created_at: DateTime<Utc>,

    /// When the component was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lab_request_item::Entity")]
    RequestItems,
}

impl Related<super::lab_request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
