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
                    .table(Discount::Table)
                    .if_not_exists()
                    .col(pk_auto(Discount::Id))
                    .col(integer(Discount::ShopId))
                    .col(string(Discount::Code))
                    .col(text_null(Discount::Description))
                    .col(string(Discount::Kind))
                    .col(big_integer(Discount::Value))
                    .col(big_integer_null(Discount::MaxDiscountAmount))
                    .col(big_integer(Discount::MinOrderTotal))
                    .col(integer_null(Discount::MaxUses))
                    .col(integer(Discount::UsedCount))
                    .col(integer(Discount::MaxUsesPerUser))
                    .col(timestamp_with_time_zone(Discount::StartsAt))
                    .col(timestamp_with_time_zone(Discount::EndsAt))
                    .col(boolean(Discount::Active))
                    .col(timestamp_with_time_zone(Discount::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_discount_shop_id")
                            .from(Discount::Table, Discount::ShopId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_discount_shop_id_code")
                    .table(Discount::Table)
                    .col(Discount::ShopId)
                    .col(Discount::Code)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Discount::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Discount {
    Table,
    Id,
    ShopId,
    Code,
    Description,
    Kind,
    Value,
    MaxDiscountAmount,
    MinOrderTotal,
    MaxUses,
    UsedCount,
    MaxUsesPerUser,
    StartsAt,
    EndsAt,
    Active,
    CreatedAt,
}
