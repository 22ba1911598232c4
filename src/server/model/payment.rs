//! Payment and card domain models.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use std::str::FromStr;

use crate::{
    model::payment::{AddCardDto, PaymentCardDto, PaymentDto},
    server::model::{invalid_column, order::PaymentMethod},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!("Unknown payment status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: i32,
    pub user_id: i32,
    pub method: PaymentMethod,
    pub amount: i64,
    pub status: PaymentStatus,
    pub txn_ref: String,
    pub gateway_transaction_no: Option<String>,
    pub response_code: Option<String>,
    pub order_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn from_entity(entity: entity::payment::Model, order_ids: Vec<i32>) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            user_id: entity.user_id,
            method: entity
                .method
                .parse()
                .map_err(|_| invalid_column("payment.method", &entity.method))?,
            amount: entity.amount,
            status: entity
                .status
                .parse()
                .map_err(|_| invalid_column("payment.status", &entity.status))?,
            txn_ref: entity.txn_ref,
            gateway_transaction_no: entity.gateway_transaction_no,
            response_code: entity.response_code,
            order_ids,
            created_at: entity.created_at,
            paid_at: entity.paid_at,
        })
    }

    pub fn into_dto(self) -> PaymentDto {
        PaymentDto {
            id: self.id,
            method: self.method.as_str().to_string(),
            amount: self.amount,
            status: self.status.as_str().to_string(),
            txn_ref: self.txn_ref,
            gateway_transaction_no: self.gateway_transaction_no,
            response_code: self.response_code,
            order_ids: self.order_ids,
            created_at: self.created_at,
            paid_at: self.paid_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCard {
    pub id: i32,
    pub user_id: i32,
    pub brand: String,
    pub last4: String,
    pub holder_name: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
    pub is_default: bool,
}

impl PaymentCard {
    pub fn from_entity(entity: entity::payment_card::Model) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            brand: entity.brand,
            last4: entity.last4,
            holder_name: entity.holder_name,
            expiry_month: entity.expiry_month,
            expiry_year: entity.expiry_year,
            is_default: entity.is_default,
        }
    }

    pub fn into_dto(self) -> PaymentCardDto {
        PaymentCardDto {
            id: self.id,
            brand: self.brand,
            last4: self.last4,
            holder_name: self.holder_name,
            expiry_month: self.expiry_month,
            expiry_year: self.expiry_year,
            is_default: self.is_default,
        }
    }
}

/// Card details kept after validation; the full number is never stored.
#[derive(Debug, Clone)]
pub struct NewPaymentCard {
    pub user_id: i32,
    pub brand: String,
    pub last4: String,
    pub holder_name: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
}

/// Card details as submitted by the customer.
#[derive(Debug, Clone)]
pub struct AddCardParams {
    pub user_id: i32,
    pub number: String,
    pub holder_name: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
}

impl AddCardParams {
    pub fn from_dto(user_id: i32, dto: AddCardDto) -> Self {
        Self {
            user_id,
            number: dto.number,
            holder_name: dto.holder_name,
            expiry_month: dto.expiry_month,
            expiry_year: dto.expiry_year,
        }
    }
}
