use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentCard::Table)
                    .if_not_exists()
                    .col(pk_auto(PaymentCard::Id))
                    .col(integer(PaymentCard::UserId))
                    .col(string(PaymentCard::Brand))
                    .col(string(PaymentCard::Last4))
                    .col(string(PaymentCard::HolderName))
                    .col(integer(PaymentCard::ExpiryMonth))
                    .col(integer(PaymentCard::ExpiryYear))
                    .col(boolean(PaymentCard::IsDefault))
                    .col(timestamp_with_time_zone(PaymentCard::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_card_user_id")
                            .from(PaymentCard::Table, PaymentCard::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentCard::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PaymentCard {
    Table,
    Id,
    UserId,
    Brand,
    Last4,
    HolderName,
    ExpiryMonth,
    ExpiryYear,
    IsDefault,
    CreatedAt,
}
