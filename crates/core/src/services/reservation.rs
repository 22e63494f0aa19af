//! Reservation engine: the only writer of `available_quantity` in the
//! lending lifecycle.
//!
//! Every lifecycle transition is a conditional UPDATE whose WHERE clause
//! names the legal source state, executed inside one transaction with the
//! stock movements it implies. Concurrent reviewers serialize on the rows:
//! the loser's UPDATE matches zero rows and the whole call aborts with the
//! stores untouched.

use std::sync::Arc;

use chrono::Utc;
use roboclub_common::{AppError, AppResult};
use roboclub_db::entities::{
    LabAccessRequest, LabComponent, LabRequestItem, lab_access_request,
    lab_access_request::RequestStatus, lab_component, lab_request_item,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    TransactionTrait, sea_query::Expr,
};
use tracing::{info, warn};

use super::AdminToken;

/// Reservation engine for the lending lifecycle.
#[derive(Clone)]
pub struct ReservationService {
    db: Arc<DatabaseConnection>,
}

impl ReservationService {
    /// Create a new reservation service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Approve a pending request, reserving its stock.
    ///
    /// Re-checks every line against the shelf at approval time; a single
    /// under-stocked component aborts the whole approval. Either the
    /// status flip and every decrement land together, or none do.
    pub async fn approve(
        &self,
        token: &AdminToken,
        request_id: &str,
        notes: Option<String>,
    ) -> AppResult<lab_access_request::Model> {
        let now = Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Flip pending -> approved first; a concurrent reviewer of the same
        // request matches zero rows here and never reaches the stock.
        let flipped = LabAccessRequest::update_many()
            .col_expr(
                lab_access_request::Column::Status,
                Expr::value(RequestStatus::Approved),
            )
            .col_expr(
                lab_access_request::Column::ReviewedBy,
                Expr::value(token.admin_id().to_string()),
            )
            .col_expr(lab_access_request::Column::ReviewedAt, Expr::value(now))
            .col_expr(
                lab_access_request::Column::AdminNotes,
                Expr::value(notes.clone()),
            )
            .filter(lab_access_request::Column::Id.eq(request_id))
            .filter(lab_access_request::Column::Status.eq(RequestStatus::Pending))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if flipped.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(self.explain_missed_flip(request_id, "pending").await?);
        }

        let mut items = LabRequestItem::find()
            .filter(lab_request_item::Column::RequestId.eq(request_id))
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        // Component rows are always locked in ID order so overlapping
        // approvals and returns cannot deadlock each other.
        items.sort_by(|a, b| a.component_id.cmp(&b.component_id));

        for item in &items {
            // Conditional decrement: only succeeds while enough is on the
            // shelf, so the counter can never go negative.
            let decremented = LabComponent::update_many()
                .col_expr(
                    lab_component::Column::AvailableQuantity,
                    Expr::col(lab_component::Column::AvailableQuantity).sub(item.quantity),
                )
                .col_expr(lab_component::Column::UpdatedAt, Expr::value(now))
                .filter(lab_component::Column::Id.eq(&item.component_id))
                .filter(lab_component::Column::AvailableQuantity.gte(item.quantity))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if decremented.rows_affected == 0 {
                let name = component_name(&txn, &item.component_id).await?;
                txn.rollback()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                warn!(
                    request_id = %request_id,
                    component = %name,
                    wanted = item.quantity,
                    "Approval aborted: insufficient stock"
                );
                return Err(AppError::InsufficientStock(name));
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        info!(
            request_id = %request_id,
            reviewer = %token.admin_id(),
            item_count = items.len(),
            "Approved lending request"
        );

        self.reload(request_id).await
    }

    /// Reject a pending request. Nothing was reserved, nothing moves.
    pub async fn reject(
        &self,
        token: &AdminToken,
        request_id: &str,
        notes: Option<String>,
    ) -> AppResult<lab_access_request::Model> {
        let flipped = LabAccessRequest::update_many()
            .col_expr(
                lab_access_request::Column::Status,
                Expr::value(RequestStatus::Rejected),
            )
            .col_expr(
                lab_access_request::Column::ReviewedBy,
                Expr::value(token.admin_id().to_string()),
            )
            .col_expr(
                lab_access_request::Column::ReviewedAt,
                Expr::value(Utc::now()),
            )
            .col_expr(lab_access_request::Column::AdminNotes, Expr::value(notes))
            .filter(lab_access_request::Column::Id.eq(request_id))
            .filter(lab_access_request::Column::Status.eq(RequestStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if flipped.rows_affected == 0 {
            return Err(self.explain_missed_flip(request_id, "pending").await?);
        }

        info!(
            request_id = %request_id,
            reviewer = %token.admin_id(),
            "Rejected lending request"
        );

        self.reload(request_id).await
    }

    /// Mark an approved request's equipment as handed back, releasing its
    /// stock.
    ///
    /// The increment clamps at `total_quantity` in case an admin shrank
    /// the total while the equipment was out.
    pub async fn mark_returned(
        &self,
        token: &AdminToken,
        request_id: &str,
    ) -> AppResult<lab_access_request::Model> {
        let now = Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let flipped = LabAccessRequest::update_many()
            .col_expr(lab_access_request::Column::ItemsReturned, Expr::value(true))
            .col_expr(lab_access_request::Column::ReturnedAt, Expr::value(now))
            .filter(lab_access_request::Column::Id.eq(request_id))
            .filter(lab_access_request::Column::Status.eq(RequestStatus::Approved))
            .filter(lab_access_request::Column::ItemsReturned.eq(false))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if flipped.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(self
                .explain_missed_flip(request_id, "approved and unreturned")
                .await?);
        }

        let mut items = LabRequestItem::find()
            .filter(lab_request_item::Column::RequestId.eq(request_id))
            .filter(lab_request_item::Column::IsReturned.eq(false))
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        // Same lock order as approval; see above.
        items.sort_by(|a, b| a.component_id.cmp(&b.component_id));

        for item in &items {
            let incremented = LabComponent::update_many()
                .col_expr(
                    lab_component::Column::AvailableQuantity,
                    Expr::cust(format!(
                        "LEAST(total_quantity, available_quantity + {})",
                        item.quantity
                    )),
                )
                .col_expr(lab_component::Column::UpdatedAt, Expr::value(now))
                .filter(lab_component::Column::Id.eq(&item.component_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if incremented.rows_affected == 0 {
                txn.rollback()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                return Err(AppError::ComponentNotFound(item.component_id.clone()));
            }
        }

        LabRequestItem::update_many()
            .col_expr(lab_request_item::Column::IsReturned, Expr::value(true))
            .col_expr(lab_request_item::Column::ReturnedAt, Expr::value(now))
            .filter(lab_request_item::Column::RequestId.eq(request_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        info!(
            request_id = %request_id,
            admin = %token.admin_id(),
            item_count = items.len(),
            "Marked lending request returned"
        );

        self.reload(request_id).await
    }

    /// A conditional flip matched zero rows: report whether the request is
    /// missing or just in the wrong state.
    async fn explain_missed_flip(
        &self,
        request_id: &str,
        wanted_state: &str,
    ) -> AppResult<AppError> {
        let found = LabAccessRequest::find_by_id(request_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(match found {
            Some(_) => AppError::InvalidState(format!(
                "Request {request_id} is not {wanted_state}"
            )),
            None => AppError::RequestNotFound(request_id.to_string()),
        })
    }

    async fn reload(&self, request_id: &str) -> AppResult<lab_access_request::Model> {
        LabAccessRequest::find_by_id(request_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::RequestNotFound(request_id.to_string()))
    }
}

async fn component_name(txn: &DatabaseTransaction, component_id: &str) -> AppResult<String> {
    let component = LabComponent::find_by_id(component_id)
        .one(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(component.map_or_else(|| component_id.to_string(), |c| c.name))
}
