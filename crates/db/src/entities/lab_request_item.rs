//! Lab request item entity (line item of a lending request).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One component + quantity line of a lending request.
///
/// Items are owned by their request (deleted with it). The component side
/// cascades too: the inventory service refuses to delete a component with
/// open items, and once one may go its closed history lines go with it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lab_request_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Parent lending request.
    pub request_id: String,

    /// Component being borrowed.
    pub component_id: String,

    /// How many units (>= 1).
    pub quantity: i32,

    /// Whether this line has been handed back. Per-item granularity; the
    /// reference workflow flips all lines of a request together.
    pub is_returned: bool,

    /// When this line was handed back.
    #[sea_orm(nullable)]
    pub returned_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lab_access_request::Entity",
        from = "Column::RequestId",
        to = "super::lab_access_request::Column::Id"
    )]
    Request,
    #[sea_orm(
        belongs_to = "super::lab_component::Entity",
        from = "Column::ComponentId",
        to = "super::lab_component::Column::Id"
    )]
    Component,
}

impl Related<super::lab_access_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

impl Related<super::lab_component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Component.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
