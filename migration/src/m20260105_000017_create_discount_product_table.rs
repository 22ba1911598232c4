use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000016_create_discount_table::Discount,
    m20260105_000005_create_product_table::Product,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscountProduct::Table)
                    .if_not_exists()
                    .col(pk_auto(DiscountProduct::Id))
                    .col(integer(DiscountProduct::DiscountId))
                    .col(integer(DiscountProduct::ProductId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_discount_product_discount_id")
                            .from(DiscountProduct::Table, DiscountProduct::DiscountId)
                            .to(Discount::Table, Discount::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_discount_product_product_id")
                            .from(DiscountProduct::Table, DiscountProduct::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscountProduct::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscountProduct {
    Table,
    Id,
    DiscountId,
    ProductId,
}
