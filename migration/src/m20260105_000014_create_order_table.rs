use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000003_create_address_table::Address,
    m20260105_000013_create_payment_table::Payment,
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
                    .table(Order::Table)
                    .if_not_exists()
                    .col(pk_auto(Order::Id))
                    .col(string_uniq(Order::TrackingId))
                    .col(integer(Order::UserId))
                    .col(integer(Order::ShopId))
                    .col(integer(Order::AddressId))
                    .col(string(Order::PaymentMethod))
                    .col(string(Order::Status))
                    .col(big_integer(Order::Subtotal))
                    .col(big_integer(Order::DiscountTotal))
                    .col(big_integer(Order::DeliveryFee))
                    .col(big_integer(Order::Total))
                    .col(string(Order::DeliveryMethod))
                    .col(string(Order::DeliveryType))
                    .col(text(Order::DeliveryStatusLog))
                    .col(string_null(Order::CourierDeliveryId))
                    .col(string_null(Order::CourierTrackingUrl))
                    .col(text_null(Order::Note))
                    .col(boolean(Order::IsPaid))
                    .col(integer_null(Order::PaymentId))
                    .col(timestamp_with_time_zone(Order::CreatedAt))
                    .col(timestamp_with_time_zone(Order::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user_id")
                            .from(Order::Table, Order::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_shop_id")
                            .from(Order::Table, Order::ShopId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_address_id")
                            .from(Order::Table, Order::AddressId)
                            .to(Address::Table, Address::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_payment_id")
                            .from(Order::Table, Order::PaymentId)
                            .to(Payment::Table, Payment::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_id")
                    .table(Order::Table)
                    .col(Order::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_shop_id")
                    .table(Order::Table)
                    .col(Order::ShopId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_courier_delivery_id")
                    .table(Order::Table)
                    .col(Order::CourierDeliveryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Order::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Order {
    #[sea_orm(iden = "orders")]
    Table,
    Id,
    TrackingId,
    UserId,
    ShopId,
    AddressId,
    PaymentMethod,
    Status,
    Subtotal,
    DiscountTotal,
    DeliveryFee,
    Total,
    DeliveryMethod,
    DeliveryType,
    DeliveryStatusLog,
    CourierDeliveryId,
    CourierTrackingUrl,
    Note,
    IsPaid,
    PaymentId,
    CreatedAt,
    UpdatedAt,
}
