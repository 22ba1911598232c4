use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000003_create_address_table::Address,
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
                    .table(ShopDeliveryOption::Table)
                    .if_not_exists()
                    .col(integer(ShopDeliveryOption::ShopId).primary_key())
                    .col(big_integer(ShopDeliveryOption::FeePerKm))
                    .col(big_integer(ShopDeliveryOption::MinFee))
                    .col(double(ShopDeliveryOption::MaxDistanceKm))
                    .col(integer(ShopDeliveryOption::PickupAddressId))
                    .col(timestamp_with_time_zone(ShopDeliveryOption::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shop_delivery_option_shop_id")
                            .from(ShopDeliveryOption::Table, ShopDeliveryOption::ShopId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shop_delivery_option_pickup_address_id")
                            .from(ShopDeliveryOption::Table, ShopDeliveryOption::PickupAddressId)
                            .to(Address::Table, Address::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShopDeliveryOption::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ShopDeliveryOption {
    Table,
    ShopId,
    FeePerKm,
    MinFee,
    MaxDistanceKm,
    PickupAddressId,
    UpdatedAt,
}
