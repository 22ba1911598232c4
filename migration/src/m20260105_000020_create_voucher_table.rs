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
                    .table(Voucher::Table)
                    .if_not_exists()
                    .col(pk_auto(Voucher::Id))
                    .col(integer(Voucher::UserId))
                    .col(integer(Voucher::DiscountId))
                    .col(timestamp_with_time_zone(Voucher::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voucher_user_id")
                            .from(Voucher::Table, Voucher::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voucher_discount_id")
                            .from(Voucher::Table, Voucher::DiscountId)
                            .to(Discount::Table, Discount::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_voucher_user_id_discount_id")
                    .table(Voucher::Table)
                    .col(Voucher::UserId)
                    .col(Voucher::DiscountId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Voucher::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Voucher {
    Table,
    Id,
    UserId,
    DiscountId,
    CreatedAt,
}
