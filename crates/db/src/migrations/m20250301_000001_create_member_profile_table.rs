//! Create member profile table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MemberProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MemberProfile::UserId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MemberProfile::DisplayName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberProfile::EnrollmentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberProfile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(MemberProfile::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: enrollment_id (admin lookups by roll number)
        manager
            .create_index(
                Index::create()
                    .name("idx_member_profile_enrollment_id")
                    .table(MemberProfile::Table)
                    .col(MemberProfile::EnrollmentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MemberProfile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MemberProfile {
    Table,
    UserId,
    DisplayName,
    EnrollmentId,
    CreatedAt,
    UpdatedAt,
}
