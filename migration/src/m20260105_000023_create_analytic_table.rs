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
                    .table(Analytic::Table)
                    .if_not_exists()
                    .col(pk_auto(Analytic::Id))
                    .col(integer(Analytic::ShopId))
                    .col(date(Analytic::Date))
                    .col(integer(Analytic::OrderCount))
                    .col(integer(Analytic::CompletedCount))
                    .col(integer(Analytic::CancelledCount))
                    .col(big_integer(Analytic::Revenue))
                    .col(big_integer(Analytic::ItemsSold))
                    .col(big_integer(Analytic::VideoViews))
                    .col(timestamp_with_time_zone(Analytic::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_analytic_shop_id")
                            .from(Analytic::Table, Analytic::ShopId)
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
                    .name("idx_analytic_shop_id_date")
                    .table(Analytic::Table)
                    .col(Analytic::ShopId)
                    .col(Analytic::Date)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Analytic::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Analytic {
    Table,
    Id,
    ShopId,
    Date,
    OrderCount,
    CompletedCount,
    CancelledCount,
    Revenue,
    ItemsSold,
    VideoViews,
    UpdatedAt,
}
