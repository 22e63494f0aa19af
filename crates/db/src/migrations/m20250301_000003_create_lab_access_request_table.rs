//! Create lab access request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LabAccessRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabAccessRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LabAccessRequest::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabAccessRequest::Purpose)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LabAccessRequest::ReturnDate).date().not_null())
                    .col(ColumnDef::new(LabAccessRequest::GroupMembers).text())
                    .col(
                        ColumnDef::new(LabAccessRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(LabAccessRequest::AdminNotes).text())
                    .col(
                        ColumnDef::new(LabAccessRequest::ItemsReturned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LabAccessRequest::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(LabAccessRequest::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(LabAccessRequest::ReturnedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(LabAccessRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (member's own request listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_lab_access_request_user_id")
                    .table(LabAccessRequest::Table)
                    .col(LabAccessRequest::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: (status, items_returned) (pending / open counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_lab_access_request_status_returned")
                    .table(LabAccessRequest::Table)
                    .col(LabAccessRequest::Status)
                    .col(LabAccessRequest::ItemsReturned)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LabAccessRequest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LabAccessRequest {
    Table,
    Id,
    UserId,
    Purpose,
    ReturnDate,
    GroupMembers,
    Status,
    AdminNotes,
    ItemsReturned,
    ReviewedBy,
    ReviewedAt,
    ReturnedAt,
    CreatedAt,
}
