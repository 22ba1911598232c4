use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000016_create_discount_table::Discount,
    m20260105_000014_create_order_table::Order,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderDiscount::Table)
                    .if_not_exists()
                    .col(pk_auto(OrderDiscount::Id))
                    .col(integer(OrderDiscount::OrderId))
                    .col(integer(OrderDiscount::DiscountId))
                    .col(big_integer(OrderDiscount::Amount))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_discount_order_id")
                            .from(OrderDiscount::Table, OrderDiscount::OrderId)
                            .to(Order::Table, Order::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_discount_discount_id")
                            .from(OrderDiscount::Table, OrderDiscount::DiscountId)
                            .to(Discount::Table, Discount::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderDiscount::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OrderDiscount {
    Table,
    Id,
    OrderId,
    DiscountId,
    Amount,
}
