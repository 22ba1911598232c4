//! Saved payment cards.
//!
//! Only the brand and last four digits of a validated number are kept.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::payment_card::PaymentCardRepository,
    error::{payment::PaymentError, AppError},
    model::payment::{AddCardParams, NewPaymentCard, PaymentCard},
};

pub const MIN_CARD_DIGITS: usize = 12;
pub const MAX_CARD_DIGITS: usize = 19;

/// Luhn checksum over a string of ASCII digits.
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Card brand from the number's prefix.
pub fn detect_brand(digits: &str) -> &'static str {
    let prefix = |n: usize| digits.get(..n).and_then(|p| p.parse::<u32>().ok());

    if digits.starts_with('4') {
        "VISA"
    } else if matches!(prefix(2), Some(51..=55)) || matches!(prefix(4), Some(2221..=2720)) {
        "MASTERCARD"
    } else if matches!(prefix(2), Some(34 | 37)) {
        "AMEX"
    } else {
        "OTHER"
    }
}

/// Strips separators and checks length and checksum.
pub fn normalize_number(number: &str) -> Result<String, PaymentError> {
    let digits: String = number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len())
        || !digits.chars().all(|c| c.is_ascii_digit())
        || !luhn_valid(&digits)
    {
        return Err(PaymentError::InvalidCardNumber);
    }

    Ok(digits)
}

/// A card stays valid through the last day of its expiry month.
pub fn check_expiry(month: i32, year: i32, today: NaiveDate) -> Result<(), PaymentError> {
    if !(1..=12).contains(&month) {
        return Err(PaymentError::InvalidExpiry);
    }
    if (year, month as u32) < (today.year(), today.month()) {
        return Err(PaymentError::InvalidExpiry);
    }
    Ok(())
}

pub struct CardService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CardService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and saves a card. The user's first card becomes the default.
    pub async fn add(&self, params: AddCardParams) -> Result<PaymentCard, AppError> {
        let holder_name = params.holder_name.trim().to_string();
        if holder_name.is_empty() {
            return Err(AppError::BadRequest("Card holder name is required".to_string()));
        }

        let digits = normalize_number(&params.number)?;
        check_expiry(params.expiry_month, params.expiry_year, Utc::now().date_naive())?;

        let repo = PaymentCardRepository::new(self.db);
        let is_default = repo.count(params.user_id).await? == 0;

        let card = NewPaymentCard {
            user_id: params.user_id,
            brand: detect_brand(&digits).to_string(),
            last4: digits[digits.len() - 4..].to_string(),
            holder_name,
            expiry_month: params.expiry_month,
            expiry_year: params.expiry_year,
        };

        let card = repo.create(card, is_default).await?;
        tracing::info!("User {} added {} card {}", card.user_id, card.brand, card.id);

        Ok(card)
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<PaymentCard>, AppError> {
        Ok(PaymentCardRepository::new(self.db).list(user_id).await?)
    }

    pub async fn set_default(&self, id: i32, user_id: i32) -> Result<PaymentCard, AppError> {
        let repo = PaymentCardRepository::new(self.db);
        let card = self.find_owned(id, user_id).await?;

        repo.set_default(card.id, user_id).await?;

        Ok(PaymentCard {
            is_default: true,
            ..card
        })
    }

    /// Removes a card, promoting the most recent remaining one if it was the default.
    pub async fn delete(&self, id: i32, user_id: i32) -> Result<(), AppError> {
        let repo = PaymentCardRepository::new(self.db);
        let card = self.find_owned(id, user_id).await?;

        repo.delete(card.id, user_id).await?;

        if card.is_default {
            if let Some(next) = repo.most_recent(user_id).await? {
                repo.set_default(next.id, user_id).await?;
            }
        }

        Ok(())
    }

    pub async fn find_owned(&self, id: i32, user_id: i32) -> Result<PaymentCard, AppError> {
        PaymentCardRepository::new(self.db)
            .find_owned(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Card not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    #[test]
    fn checks_luhn() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("5555555555554444"));
        assert!(!luhn_valid("4111111111111112"));
    }

    #[test]
    fn detects_brands() {
        assert_eq!(detect_brand("4111111111111111"), "VISA");
        assert_eq!(detect_brand("5555555555554444"), "MASTERCARD");
        assert_eq!(detect_brand("2221000000000009"), "MASTERCARD");
        assert_eq!(detect_brand("378282246310005"), "AMEX");
        assert_eq!(detect_brand("6011111111111117"), "OTHER");
    }

    /// Tests number normalization.
    ///
    /// Expected: separators stripped; short, non-numeric and bad checksum numbers rejected
    #[test]
    fn normalizes_numbers() {
        assert_eq!(
            normalize_number("4111 1111-1111 1111").unwrap(),
            "4111111111111111"
        );
        assert!(normalize_number("41111111111").is_err());
        assert!(normalize_number("4111x11111111111").is_err());
        assert!(normalize_number("4111111111111112").is_err());
    }

    #[test]
    fn checks_expiry() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 20).unwrap();
        assert!(check_expiry(5, 2026, today).is_ok());
        assert!(check_expiry(1, 2027, today).is_ok());
        assert!(check_expiry(4, 2026, today).is_err());
        assert!(check_expiry(13, 2030, today).is_err());
    }

    /// Tests default card handling across add and delete.
    ///
    /// Expected: first card default, second not; deleting the default promotes
    /// the remaining card
    #[tokio::test]
    async fn keeps_one_default_card() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let user = factory::create_user(db).await.unwrap();
        let service = CardService::new(db);
        let year = Utc::now().year() + 2;

        let add = |number: &str| AddCardParams {
            user_id: user.id,
            number: number.to_string(),
            holder_name: "Nguyen Van A".to_string(),
            expiry_month: 12,
            expiry_year: year,
        };

        let first = service.add(add("4111111111111111")).await.unwrap();
        let second = service.add(add("5555555555554444")).await.unwrap();
        assert!(first.is_default);
        assert!(!second.is_default);
        assert_eq!(second.last4, "4444");
        assert_eq!(second.brand, "MASTERCARD");

        service.delete(first.id, user.id).await.unwrap();
        let cards = service.list(user.id).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert!(cards[0].is_default);
    }
}
