//! One-time phone verification codes.
//!
//! Codes live in memory keyed by phone number, expire after five minutes and are
//! consumed by the first successful verification.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::server::util::token::generate_digits;

/// Time-to-live for verification codes in seconds.
pub const OTP_TTL_SECONDS: u64 = 300;
/// Number of digits in a verification code.
pub const OTP_LENGTH: usize = 6;

#[derive(Clone)]
struct PendingCode {
    code: String,
    expires_at: Instant,
}

impl PendingCode {
    fn new(code: String, ttl: Duration) -> Self {
        Self {
            code,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory store of outstanding verification codes.
///
/// Cloning shares the same store.
#[derive(Clone)]
pub struct OtpService {
    codes: Arc<RwLock<HashMap<String, PendingCode>>>,
    ttl: Duration,
}

impl OtpService {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(OTP_TTL_SECONDS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Generates a fresh code for the phone, replacing any outstanding one.
    ///
    /// Expired codes for other phones are dropped at the same time.
    ///
    /// # Returns
    /// - `String` - The six digit code to deliver to the phone
    pub async fn generate(&self, phone: &str) -> String {
        let code = generate_digits(OTP_LENGTH);
        let mut codes = self.codes.write().await;
        codes.retain(|_, pending| !pending.is_expired());
        codes.insert(phone.to_string(), PendingCode::new(code.clone(), self.ttl));
        code
    }

    /// Checks the code for the phone and consumes it on success.
    ///
    /// A wrong code leaves the pending code in place; an expired one is removed.
    ///
    /// # Returns
    /// - `true` - Code matched and was still valid
    /// - `false` - No code, wrong code or expired code
    pub async fn validate_and_consume(&self, phone: &str, input: &str) -> bool {
        let mut codes = self.codes.write().await;

        let Some(pending) = codes.get(phone) else {
            return false;
        };

        if pending.is_expired() {
            codes.remove(phone);
            return false;
        }

        if pending.code == input {
            codes.remove(phone);
            return true;
        }

        false
    }

    #[cfg(test)]
    pub async fn has_pending(&self, phone: &str) -> bool {
        self.codes
            .read()
            .await
            .get(phone)
            .is_some_and(|p| !p.is_expired())
    }
}

impl Default for OtpService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    const PHONE: &str = "+84901234567";

    /// Tests generating a verification code.
    ///
    /// Expected: six digit code stored for the phone
    #[tokio::test]
    async fn generates_six_digit_code() {
        let service = OtpService::new();
        assert!(!service.has_pending(PHONE).await);

        let code = service.generate(PHONE).await;

        assert_eq!(code.len(), OTP_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert!(service.has_pending(PHONE).await);
    }

    /// Tests that a correct code is consumed and cannot be reused.
    ///
    /// Expected: first validation true, second false
    #[tokio::test]
    async fn code_is_single_use() {
        let service = OtpService::new();
        let code = service.generate(PHONE).await;

        assert!(service.validate_and_consume(PHONE, &code).await);
        assert!(!service.validate_and_consume(PHONE, &code).await);
    }

    /// Tests that a wrong code keeps the pending code.
    ///
    /// Expected: validation false and code still pending
    #[tokio::test]
    async fn wrong_code_keeps_pending() {
        let service = OtpService::new();
        let code = service.generate(PHONE).await;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        assert!(!service.validate_and_consume(PHONE, wrong).await);
        assert!(service.has_pending(PHONE).await);
    }

    /// Tests that codes are scoped to their phone.
    ///
    /// Expected: the code fails for another phone
    #[tokio::test]
    async fn code_is_bound_to_phone() {
        let service = OtpService::new();
        let code = service.generate(PHONE).await;

        assert!(!service.validate_and_consume("+84900000000", &code).await);
    }

    /// Tests that codes expire after their TTL.
    ///
    /// Expected: validation fails once the TTL has passed
    #[tokio::test]
    async fn code_expires_after_ttl() {
        let service = OtpService::with_ttl(Duration::from_millis(50));
        let code = service.generate(PHONE).await;

        sleep(Duration::from_millis(80)).await;

        assert!(!service.has_pending(PHONE).await);
        assert!(!service.validate_and_consume(PHONE, &code).await);
    }
}
