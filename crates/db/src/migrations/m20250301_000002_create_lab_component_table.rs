//! Create lab component table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LabComponent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabComponent::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LabComponent::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LabComponent::Description).text())
                    .col(ColumnDef::new(LabComponent::Category).string_len(64))
                    .col(
                        ColumnDef::new(LabComponent::TotalQuantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(LabComponent::TotalQuantity).gte(0)),
                    )
                    .col(
                        ColumnDef::new(LabComponent::AvailableQuantity)
                            .integer()
                            .not_null()
                            // Postgres accepts cross-column checks in a column
                            // constraint; it becomes a table constraint.
                            .check(
                                Expr::col(LabComponent::AvailableQuantity).gte(0).and(
                                    Expr::col(LabComponent::AvailableQuantity)
                                        .lte(Expr::col(LabComponent::TotalQuantity)),
                                ),
                            ),
                    )
                    .col(
                        ColumnDef::new(LabComponent::CreatedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabComponent::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LabComponent::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: name (availability listing is ordered by name)
        manager
            .create_index(
                Index::create()
                    .name("idx_lab_component_name")
                    .table(LabComponent::Table)
                    .col(LabComponent::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LabComponent::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LabComponent {
    Table,
    Id,
    Name,
    Description,
    Category,
    TotalQuantity,
    AvailableQuantity,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
