//! Create lab request item table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LabRequestItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabRequestItem::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LabRequestItem::RequestId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabRequestItem::ComponentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabRequestItem::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(LabRequestItem::Quantity).gte(1)),
                    )
                    .col(
                        ColumnDef::new(LabRequestItem::IsReturned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LabRequestItem::ReturnedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lab_request_item_request")
                            .from(LabRequestItem::Table, LabRequestItem::RequestId)
                            .to(LabAccessRequest::Table, LabAccessRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Open items block the delete at the service layer;
                    // once a component may go, its closed history lines
                    // go with it.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lab_request_item_component")
                            .from(LabRequestItem::Table, LabRequestItem::ComponentId)
                            .to(LabComponent::Table, LabComponent::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: request_id (loading a request's items)
        manager
            .create_index(
                Index::create()
                    .name("idx_lab_request_item_request_id")
                    .table(LabRequestItem::Table)
                    .col(LabRequestItem::RequestId)
                    .to_owned(),
            )
            .await?;

        // Index: component_id (open-item guard before component delete)
        manager
            .create_index(
                Index::create()
                    .name("idx_lab_request_item_component_id")
                    .table(LabRequestItem::Table)
                    .col(LabRequestItem::ComponentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LabRequestItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LabRequestItem {
    Table,
    Id,
    RequestId,
    ComponentId,
    Quantity,
    IsReturned,
    ReturnedAt,
}

#[derive(DeriveIden)]
enum LabAccessRequest {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum LabComponent {
    Table,
    Id,
}
