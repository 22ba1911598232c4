use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000016_create_discount_table::Discount,
    m20260105_000001_create_user_table::User,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscountUsage::Table)
                    .if_not_exists()
                    .col(pk_auto(DiscountUsage::Id))
                    .col(integer(DiscountUsage::DiscountId))
                    .col(integer(DiscountUsage::UserId))
                    .col(integer(DiscountUsage::Count))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_discount_usage_discount_id")
                            .from(DiscountUsage::Table, DiscountUsage::DiscountId)
                            .to(Discount::Table, Discount::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_discount_usage_user_id")
                            .from(DiscountUsage::Table, DiscountUsage::UserId)
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
                    .name("idx_discount_usage_discount_id_user_id")
                    .table(DiscountUsage::Table)
                    .col(DiscountUsage::DiscountId)
                    .col(DiscountUsage::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscountUsage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscountUsage {
    Table,
    Id,
    DiscountId,
    UserId,
    Count,
}
