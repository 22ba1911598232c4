use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_uniq(User::Username))
                    .col(string_uniq(User::Email))
                    .col(string_null(User::Phone).unique_key())
                    .col(string(User::PasswordHash))
                    .col(string(User::Role))
                    .col(string(User::DisplayName))
                    .col(text_null(User::Bio))
                    .col(string_null(User::AvatarUrl))
                    .col(boolean(User::PhoneVerified).default(false))
                    .col(timestamp_with_time_zone(User::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    Username,
    Email,
    Phone,
    PasswordHash,
    Role,
    DisplayName,
    Bio,
    AvatarUrl,
    PhoneVerified,
    CreatedAt,
}
