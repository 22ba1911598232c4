use crate::server::{
    data::order::OrderRepository,
    model::{
        delivery::{DeliveryMethod, DeliveryStatus, DeliveryType},
        order::{DeliveryStateUpdate, NewOrder, OrderItem, OrderStatus, PaymentMethod},
    },
};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod create;
mod list;
mod payment_link;
mod update_delivery_state;
