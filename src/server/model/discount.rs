//! Discount domain models and eligibility rules.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use std::str::FromStr;

use crate::{
    model::discount::{CreateDiscountDto, DiscountDto, UpdateDiscountDto, VoucherDto},
    server::model::invalid_column,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "PERCENTAGE",
            Self::Fixed => "FIXED",
        }
    }
}

impl FromStr for DiscountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERCENTAGE" => Ok(Self::Percentage),
            "FIXED" => Ok(Self::Fixed),
            other => Err(format!("Unknown discount kind '{}'", other)),
        }
    }
}

/// One priced line considered for a discount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountLine {
    pub product_id: i32,
    pub line_total: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Discount {
    pub id: i32,
    pub shop_id: i32,
    pub code: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_total: i64,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub max_uses_per_user: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub active: bool,
    /// Products the discount is limited to; empty applies to the whole shop.
    pub product_ids: Vec<i32>,
}

impl Discount {
    pub fn from_entity(
        entity: entity::discount::Model,
        product_ids: Vec<i32>,
    ) -> Result<Self, DbErr> {
        let kind = entity
            .kind
            .parse()
            .map_err(|_| invalid_column("discount.kind", &entity.kind))?;

        Ok(Self {
            id: entity.id,
            shop_id: entity.shop_id,
            code: entity.code,
            description: entity.description,
            kind,
            value: entity.value,
            max_discount_amount: entity.max_discount_amount,
            min_order_total: entity.min_order_total,
            max_uses: entity.max_uses,
            used_count: entity.used_count,
            max_uses_per_user: entity.max_uses_per_user,
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
            active: entity.active,
            product_ids,
        })
    }

    pub fn into_dto(self) -> DiscountDto {
        DiscountDto {
            id: self.id,
            shop_id: self.shop_id,
            code: self.code,
            description: self.description,
            kind: self.kind.as_str().to_string(),
            value: self.value,
            max_discount_amount: self.max_discount_amount,
            min_order_total: self.min_order_total,
            max_uses: self.max_uses,
            used_count: self.used_count,
            max_uses_per_user: self.max_uses_per_user,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            active: self.active,
            product_ids: self.product_ids,
        }
    }

    /// Sum of the lines this discount applies to.
    pub fn applicable_subtotal(&self, lines: &[DiscountLine]) -> i64 {
        lines
            .iter()
            .filter(|line| self.product_ids.is_empty() || self.product_ids.contains(&line.product_id))
            .map(|line| line.line_total)
            .sum()
    }

    /// Checks eligibility and computes the amount taken off.
    ///
    /// # Arguments
    /// - `user_usage` - How many times the customer has already redeemed it
    /// - `lines` - Priced lines of the shop group being ordered
    /// - `now` - Evaluation time
    ///
    /// # Returns
    /// - `Ok(amount)` - Eligible, with the discount amount
    /// - `Err(reason)` - Human readable reason it does not apply
    pub fn evaluate(
        &self,
        user_usage: i32,
        lines: &[DiscountLine],
        now: DateTime<Utc>,
    ) -> Result<i64, String> {
        if !self.active {
            return Err(format!("Discount {} is not active", self.code));
        }
        if now < self.starts_at || now > self.ends_at {
            return Err(format!("Discount {} is not valid at this time", self.code));
        }
        if let Some(max_uses) = self.max_uses {
            if self.used_count >= max_uses {
                return Err(format!("Discount {} has been fully redeemed", self.code));
            }
        }
        if user_usage >= self.max_uses_per_user {
            return Err(format!("You have already used discount {}", self.code));
        }

        let subtotal = self.applicable_subtotal(lines);
        if subtotal <= 0 {
            return Err(format!("Discount {} does not apply to these items", self.code));
        }
        if subtotal < self.min_order_total {
            return Err(format!(
                "Discount {} requires a minimum order of {}",
                self.code, self.min_order_total
            ));
        }

        let amount = match self.kind {
            DiscountKind::Percentage => {
                let amount = subtotal * self.value / 100;
                match self.max_discount_amount {
                    Some(cap) => amount.min(cap),
                    None => amount,
                }
            }
            DiscountKind::Fixed => self.value.min(subtotal),
        };

        Ok(amount)
    }
}

#[derive(Debug, Clone)]
pub struct CreateDiscountParams {
    pub shop_id: i32,
    pub code: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_total: i64,
    pub max_uses: Option<i32>,
    pub max_uses_per_user: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub product_ids: Vec<i32>,
}

impl CreateDiscountParams {
    pub fn from_dto(shop_id: i32, dto: CreateDiscountDto) -> Result<Self, String> {
        Ok(Self {
            shop_id,
            code: dto.code.trim().to_uppercase(),
            description: dto.description,
            kind: dto.kind.parse()?,
            value: dto.value,
            max_discount_amount: dto.max_discount_amount,
            min_order_total: dto.min_order_total,
            max_uses: dto.max_uses,
            max_uses_per_user: dto.max_uses_per_user.unwrap_or(1),
            starts_at: dto.starts_at,
            ends_at: dto.ends_at,
            product_ids: dto.product_ids,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDiscountParams {
    pub description: Option<String>,
    pub value: Option<i64>,
    pub max_discount_amount: Option<i64>,
    pub min_order_total: Option<i64>,
    pub max_uses: Option<i32>,
    pub max_uses_per_user: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub product_ids: Option<Vec<i32>>,
}

impl UpdateDiscountParams {
    pub fn from_dto(dto: UpdateDiscountDto) -> Self {
        Self {
            description: dto.description,
            value: dto.value,
            max_discount_amount: dto.max_discount_amount,
            min_order_total: dto.min_order_total,
            max_uses: dto.max_uses,
            max_uses_per_user: dto.max_uses_per_user,
            starts_at: dto.starts_at,
            ends_at: dto.ends_at,
            active: dto.active,
            product_ids: dto.product_ids,
        }
    }
}

/// A discount saved by a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct Voucher {
    pub id: i32,
    pub discount: Discount,
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    pub fn into_dto(self) -> VoucherDto {
        VoucherDto {
            id: self.id,
            discount: self.discount.into_dto(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn discount(kind: DiscountKind, value: i64) -> Discount {
        let now = Utc::now();
        Discount {
            id: 1,
            shop_id: 1,
            code: "SAVE".to_string(),
            description: None,
            kind,
            value,
            max_discount_amount: None,
            min_order_total: 0,
            max_uses: None,
            used_count: 0,
            max_uses_per_user: 1,
            starts_at: now - Duration::days(1),
            ends_at: now + Duration::days(1),
            active: true,
            product_ids: vec![],
        }
    }

    fn lines() -> Vec<DiscountLine> {
        vec![
            DiscountLine {
                product_id: 1,
                line_total: 60_000,
            },
            DiscountLine {
                product_id: 2,
                line_total: 40_000,
            },
        ]
    }

    #[test]
    fn percentage_floors_and_caps() {
        let mut d = discount(DiscountKind::Percentage, 15);
        assert_eq!(d.evaluate(0, &lines(), Utc::now()), Ok(15_000));

        d.max_discount_amount = Some(10_000);
        assert_eq!(d.evaluate(0, &lines(), Utc::now()), Ok(10_000));

        let odd = vec![DiscountLine {
            product_id: 1,
            line_total: 999,
        }];
        d.max_discount_amount = None;
        assert_eq!(d.evaluate(0, &odd, Utc::now()), Ok(149));
    }

    #[test]
    fn fixed_never_exceeds_subtotal() {
        let d = discount(DiscountKind::Fixed, 150_000);
        assert_eq!(d.evaluate(0, &lines(), Utc::now()), Ok(100_000));
    }

    #[test]
    fn restricts_to_listed_products() {
        let mut d = discount(DiscountKind::Percentage, 10);
        d.product_ids = vec![2];
        assert_eq!(d.evaluate(0, &lines(), Utc::now()), Ok(4_000));

        d.product_ids = vec![3];
        assert!(d.evaluate(0, &lines(), Utc::now()).is_err());
    }

    #[test]
    fn rejects_ineligible_discounts() {
        let now = Utc::now();

        let mut d = discount(DiscountKind::Fixed, 1_000);
        d.active = false;
        assert!(d.evaluate(0, &lines(), now).is_err());

        let mut d = discount(DiscountKind::Fixed, 1_000);
        d.ends_at = now - Duration::hours(1);
        assert!(d.evaluate(0, &lines(), now).is_err());

        let mut d = discount(DiscountKind::Fixed, 1_000);
        d.max_uses = Some(5);
        d.used_count = 5;
        assert!(d.evaluate(0, &lines(), now).is_err());

        let d = discount(DiscountKind::Fixed, 1_000);
        assert!(d.evaluate(1, &lines(), now).is_err());

        let mut d = discount(DiscountKind::Fixed, 1_000);
        d.min_order_total = 100_001;
        assert!(d.evaluate(0, &lines(), now).is_err());
        d.min_order_total = 100_000;
        assert_eq!(d.evaluate(0, &lines(), now), Ok(1_000));
    }
}
