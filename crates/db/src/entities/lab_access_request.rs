//! Lab access request entity for the equipment lending workflow.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status for lending requests.
///
/// Transitions are one-way: pending -> approved or pending -> rejected.
/// The transition itself is enforced by a conditional UPDATE whose WHERE
/// clause requires the pending state, so a stale reviewer loses the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum RequestStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Why the member wants the equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum RequestPurpose {
    #[sea_orm(string_value = "self_learning")]
    SelfLearning,
    #[sea_orm(string_value = "project")]
    Project,
    #[sea_orm(string_value = "institute_task")]
    InstituteTask,
}

/// A member's request to borrow one or more components.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lab_access_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Member who submitted the request. Supplied by the identity provider;
    /// only the bare ID is stored here.
    pub user_id: String,

    /// Purpose category.
    pub purpose: RequestPurpose,

    /// Date the equipment is promised back.
    pub return_date: Date,

    /// Names of group members working with the equipment (free text).
    #[sea_orm(column_type = "Text", nullable)]
    pub group_members: Option<String>,

    /// Current review status.
    pub status: RequestStatus,

    /// Note from the reviewing admin (optional, e.g. rejection reason).
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,

    /// Whether every item of the request has been handed back.
    /// Only meaningful once the request is approved.
    pub items_returned: bool,

    /// Admin who reviewed the request.
    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    /// When the request was reviewed.
    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTime<Utc>>,

    /// When the items were returned.
    #[sea_orm(nullable)]
    pub returned_at: Option<DateTime<Utc>>,

    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lab_request_item::Entity")]
    Items,
}

impl Related<super::lab_request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
