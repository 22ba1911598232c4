//! Delivery orchestration state.
//!
//! An order's delivery is described by its [`DeliveryType`] (who is carrying it,
//! if anyone) and its [`StatusLog`], the ordered history of delivery statuses.
//! The log keeps at most one entry per status; a courier regressing to
//! `ALLOCATING` rewinds it (see [`StatusLog::apply`]).

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::{
    delivery::{DeliveryOptionDto, StatusLogEntryDto, UpsertDeliveryOptionDto},
    order::DeliveryQuoteDto,
};

/// Who is currently carrying an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryType {
    /// Not dispatched yet, or dispatch was cancelled/failed.
    None,
    /// Shop-operated delivery.
    SelfDelivery,
    /// Third-party courier.
    Grab,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::SelfDelivery => "SELF",
            Self::Grab => "GRAB",
        }
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Self::None),
            "SELF" => Ok(Self::SelfDelivery),
            "GRAB" => Ok(Self::Grab),
            other => Err(format!("Unknown delivery type '{}'", other)),
        }
    }
}

/// Delivery method chosen by the customer at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryMethod {
    SelfDelivery,
    Grab,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfDelivery => "SELF",
            Self::Grab => "GRAB",
        }
    }
}

impl FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SELF" => Ok(Self::SelfDelivery),
            "GRAB" => Ok(Self::Grab),
            other => Err(format!("Unknown delivery method '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Allocating,
    PendingPickup,
    PickingUp,
    PendingDropOff,
    InDelivery,
    Completed,
    Canceled,
    Returned,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allocating => "ALLOCATING",
            Self::PendingPickup => "PENDING_PICKUP",
            Self::PickingUp => "PICKING_UP",
            Self::PendingDropOff => "PENDING_DROP_OFF",
            Self::InDelivery => "IN_DELIVERY",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
            Self::Returned => "RETURNED",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALLOCATING" => Ok(Self::Allocating),
            "PENDING_PICKUP" => Ok(Self::PendingPickup),
            "PICKING_UP" => Ok(Self::PickingUp),
            "PENDING_DROP_OFF" => Ok(Self::PendingDropOff),
            "IN_DELIVERY" => Ok(Self::InDelivery),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELED" | "CANCELLED" => Ok(Self::Canceled),
            "RETURNED" => Ok(Self::Returned),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!("Unknown delivery status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusLogEntry {
    pub status: DeliveryStatus,
    pub at: DateTime<Utc>,
}

impl StatusLogEntry {
    pub fn into_dto(self) -> StatusLogEntryDto {
        StatusLogEntryDto {
            status: self.status.as_str().to_string(),
            at: self.at,
        }
    }
}

/// Ordered delivery history, persisted as JSON on the order row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusLog(Vec<StatusLogEntry>);

impl StatusLog {
    pub fn new(entries: Vec<StatusLogEntry>) -> Self {
        Self(entries)
    }

    /// Parses the stored column; an empty string is an empty log.
    pub fn from_json(raw: &str) -> Result<Self, DbErr> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
            .map(Self)
            .map_err(|e| DbErr::Custom(format!("Invalid delivery status log: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, DbErr> {
        serde_json::to_string(&self.0)
            .map_err(|e| DbErr::Custom(format!("Failed to serialize delivery status log: {}", e)))
    }

    pub fn entries(&self) -> &[StatusLogEntry] {
        &self.0
    }

    pub fn last_status(&self) -> Option<DeliveryStatus> {
        self.0.last().map(|e| e.status)
    }

    pub fn contains(&self, status: DeliveryStatus) -> bool {
        self.0.iter().any(|e| e.status == status)
    }

    /// Reconciles a reported status into the log.
    ///
    /// - `ALLOCATING` already present: the courier lost its driver. Everything
    ///   after the existing `ALLOCATING` entry is dropped and its timestamp
    ///   becomes `at`.
    /// - Any other status already present: no change.
    /// - Otherwise the status is appended.
    ///
    /// # Returns
    /// - `true` - The log changed
    /// - `false` - The status was a duplicate
    pub fn apply(&mut self, status: DeliveryStatus, at: DateTime<Utc>) -> bool {
        let existing = self.0.iter().position(|e| e.status == status);

        match (status, existing) {
            (DeliveryStatus::Allocating, Some(index)) => {
                self.0.truncate(index + 1);
                self.0[index].at = at;
                true
            }
            (_, Some(_)) => false,
            (_, None) => {
                self.0.push(StatusLogEntry { status, at });
                true
            }
        }
    }

    pub fn into_dto(self) -> Vec<StatusLogEntryDto> {
        self.0.into_iter().map(StatusLogEntry::into_dto).collect()
    }
}

/// A shop's self-delivery tariff.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOption {
    pub shop_id: i32,
    pub fee_per_km: i64,
    pub min_fee: i64,
    pub max_distance_km: f64,
    pub pickup_address_id: i32,
    pub updated_at: DateTime<Utc>,
}

impl DeliveryOption {
    pub fn from_entity(entity: entity::shop_delivery_option::Model) -> Self {
        Self {
            shop_id: entity.shop_id,
            fee_per_km: entity.fee_per_km,
            min_fee: entity.min_fee,
            max_distance_km: entity.max_distance_km,
            pickup_address_id: entity.pickup_address_id,
            updated_at: entity.updated_at,
        }
    }

    pub fn into_dto(self) -> DeliveryOptionDto {
        DeliveryOptionDto {
            shop_id: self.shop_id,
            fee_per_km: self.fee_per_km,
            min_fee: self.min_fee,
            max_distance_km: self.max_distance_km,
            pickup_address_id: self.pickup_address_id,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpsertDeliveryOptionParams {
    pub shop_id: i32,
    pub fee_per_km: i64,
    pub min_fee: i64,
    pub max_distance_km: f64,
    pub pickup_address_id: i32,
}

impl UpsertDeliveryOptionParams {
    pub fn from_dto(shop_id: i32, dto: UpsertDeliveryOptionDto) -> Self {
        Self {
            shop_id,
            fee_per_km: dto.fee_per_km,
            min_fee: dto.min_fee,
            max_distance_km: dto.max_distance_km,
            pickup_address_id: dto.pickup_address_id,
        }
    }
}

/// Price of delivering one shop group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryQuote {
    pub method: DeliveryMethod,
    pub fee: i64,
    pub distance_km: Option<f64>,
}

impl DeliveryQuote {
    pub fn into_dto(self) -> DeliveryQuoteDto {
        DeliveryQuoteDto {
            method: self.method.as_str().to_string(),
            fee: self.fee,
            distance_km: self.distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    fn statuses(log: &StatusLog) -> Vec<DeliveryStatus> {
        log.entries().iter().map(|e| e.status).collect()
    }

    #[test]
    fn appends_new_statuses_in_order() {
        let mut log = StatusLog::default();
        assert!(log.apply(DeliveryStatus::Allocating, at(0)));
        assert!(log.apply(DeliveryStatus::PendingPickup, at(1)));
        assert!(log.apply(DeliveryStatus::PickingUp, at(2)));

        assert_eq!(
            statuses(&log),
            vec![
                DeliveryStatus::Allocating,
                DeliveryStatus::PendingPickup,
                DeliveryStatus::PickingUp
            ]
        );
        assert_eq!(log.last_status(), Some(DeliveryStatus::PickingUp));
    }

    #[test]
    fn ignores_duplicate_status() {
        let mut log = StatusLog::default();
        log.apply(DeliveryStatus::Allocating, at(0));
        log.apply(DeliveryStatus::PendingPickup, at(1));

        assert!(!log.apply(DeliveryStatus::PendingPickup, at(5)));
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.entries()[1].at, at(1));
    }

    /// Tests the courier regressing to allocation after a driver drops the job.
    ///
    /// Expected: entries after ALLOCATING removed and its timestamp rewritten
    #[test]
    fn rewinds_on_allocating_regression() {
        let mut log = StatusLog::default();
        log.apply(DeliveryStatus::Allocating, at(0));
        log.apply(DeliveryStatus::PendingPickup, at(1));
        log.apply(DeliveryStatus::PickingUp, at(2));

        assert!(log.apply(DeliveryStatus::Allocating, at(10)));
        assert_eq!(statuses(&log), vec![DeliveryStatus::Allocating]);
        assert_eq!(log.entries()[0].at, at(10));

        // The next driver's statuses are appended again
        assert!(log.apply(DeliveryStatus::PendingPickup, at(11)));
        assert_eq!(log.entries().len(), 2);
    }

    #[test]
    fn round_trips_through_json_column() {
        let mut log = StatusLog::default();
        log.apply(DeliveryStatus::InDelivery, at(0));

        let raw = log.to_json().unwrap();
        assert!(raw.contains("IN_DELIVERY"));
        assert_eq!(StatusLog::from_json(&raw).unwrap(), log);
        assert_eq!(StatusLog::from_json("").unwrap(), StatusLog::default());
        assert!(StatusLog::from_json("{").is_err());
    }

    #[test]
    fn parses_courier_spelling_variants() {
        assert_eq!(
            "CANCELLED".parse::<DeliveryStatus>(),
            Ok(DeliveryStatus::Canceled)
        );
        assert!("LOST".parse::<DeliveryStatus>().is_err());
    }
}
