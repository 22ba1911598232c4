//! Hosted payment page signing (VNPay protocol 2.1.0).
//!
//! Parameters are sorted by key, form-urlencoded and signed with HMAC-SHA512
//! over the encoded query. Callbacks are verified the same way.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use url::form_urlencoded;

use crate::server::{config::PaymentGatewayConfig, error::payment::PaymentError};

type HmacSha512 = Hmac<Sha512>;

pub const GATEWAY_VERSION: &str = "2.1.0";
pub const SECURE_HASH_PARAM: &str = "vnp_SecureHash";
pub const SECURE_HASH_TYPE_PARAM: &str = "vnp_SecureHashType";
/// Response code the gateway sends for a successful charge.
pub const SUCCESS_RESPONSE_CODE: &str = "00";

/// Parsed gateway callback.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCallback {
    pub txn_ref: String,
    /// Amount as sent by the gateway, in hundredths of a currency unit.
    pub amount: i64,
    pub response_code: String,
    pub transaction_no: Option<String>,
}

impl GatewayCallback {
    /// Extracts the fields used for settlement from a verified query.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, PaymentError> {
        let field = |name: &str| {
            query
                .get(name)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| PaymentError::Gateway(format!("Callback is missing {}", name)))
        };

        let raw_amount = field("vnp_Amount")?;
        let amount = raw_amount
            .parse::<i64>()
            .map_err(|_| PaymentError::Gateway(format!("Invalid callback amount {}", raw_amount)))?;

        Ok(Self {
            txn_ref: field("vnp_TxnRef")?,
            amount,
            response_code: field("vnp_ResponseCode")?,
            transaction_no: query.get("vnp_TransactionNo").cloned(),
        })
    }

    /// Whether the callback charged exactly `amount` currency units.
    pub fn matches_amount(&self, amount: i64) -> bool {
        amount.checked_mul(100) == Some(self.amount)
    }

    pub fn is_success(&self) -> bool {
        self.response_code == SUCCESS_RESPONSE_CODE
    }
}

pub struct PaymentGateway<'a> {
    config: &'a PaymentGatewayConfig,
}

impl<'a> PaymentGateway<'a> {
    pub fn new(config: &'a PaymentGatewayConfig) -> Self {
        Self { config }
    }

    /// Builds the signed URL of the hosted payment page.
    ///
    /// # Arguments
    /// - `txn_ref` - Merchant reference, unique per payment
    /// - `amount` - Amount in currency units
    /// - `info` - Description shown to the payer
    /// - `client_ip` - Payer's IP address
    /// - `now` - Creation time, sent in GMT+7
    pub fn build_payment_url(
        &self,
        txn_ref: &str,
        amount: i64,
        info: &str,
        client_ip: &str,
        now: DateTime<Utc>,
    ) -> Result<String, PaymentError> {
        let create_date = (now + Duration::hours(7))
            .format("%Y%m%d%H%M%S")
            .to_string();

        let params: [(&str, String); 12] = [
            ("vnp_Version", GATEWAY_VERSION.to_string()),
            ("vnp_Command", "pay".to_string()),
            ("vnp_TmnCode", self.config.tmn_code.clone()),
            ("vnp_Amount", (amount * 100).to_string()),
            ("vnp_CurrCode", "VND".to_string()),
            ("vnp_TxnRef", txn_ref.to_string()),
            ("vnp_OrderInfo", info.to_string()),
            ("vnp_OrderType", "other".to_string()),
            ("vnp_Locale", "vn".to_string()),
            ("vnp_ReturnUrl", self.config.return_url.clone()),
            ("vnp_IpAddr", client_ip.to_string()),
            ("vnp_CreateDate", create_date),
        ];

        let query = canonical_query(params.iter().map(|(k, v)| (*k, v.as_str())));
        let signature = hex::encode(self.mac(&query)?.finalize().into_bytes());

        Ok(format!(
            "{}?{}&{}={}",
            self.config.payment_url, query, SECURE_HASH_PARAM, signature
        ))
    }

    /// Hex signature over a parameter set, as the gateway computes it.
    pub fn sign(&self, query: &HashMap<String, String>) -> Result<String, PaymentError> {
        let canonical = canonical_query(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(hex::encode(self.mac(&canonical)?.finalize().into_bytes()))
    }

    /// Verifies a callback's `vnp_SecureHash` in constant time.
    pub fn verify(&self, query: &HashMap<String, String>) -> Result<(), PaymentError> {
        let signature = query
            .get(SECURE_HASH_PARAM)
            .and_then(|s| hex::decode(s).ok())
            .ok_or(PaymentError::InvalidSignature)?;

        let canonical = canonical_query(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self.mac(&canonical)?
            .verify_slice(&signature)
            .map_err(|_| PaymentError::InvalidSignature)
    }

    fn mac(&self, data: &str) -> Result<HmacSha512, PaymentError> {
        let mut mac = HmacSha512::new_from_slice(self.config.hash_secret.as_bytes())
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;
        mac.update(data.as_bytes());
        Ok(mac)
    }
}

/// The signed form of a parameter set.
///
/// Every non-empty `vnp_` parameter except the hash fields, sorted by key and
/// form-urlencoded.
fn canonical_query<'p>(params: impl Iterator<Item = (&'p str, &'p str)>) -> String {
    let sorted: BTreeMap<&str, &str> = params
        .filter(|(k, v)| {
            k.starts_with("vnp_")
                && *k != SECURE_HASH_PARAM
                && *k != SECURE_HASH_TYPE_PARAM
                && !v.is_empty()
        })
        .collect();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in sorted {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> PaymentGatewayConfig {
        PaymentGatewayConfig {
            tmn_code: "TASTE001".to_string(),
            hash_secret: "SECRETKEY".to_string(),
            payment_url: "https://pay.example/vpcpay.html".to_string(),
            return_url: "http://localhost:8080/api/payments/gateway/return".to_string(),
        }
    }

    fn parse(url: &str) -> HashMap<String, String> {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Tests the payment URL parameters.
    ///
    /// Expected: amount multiplied by 100, creation date in GMT+7, sorted keys
    #[test]
    fn builds_payment_url() {
        let config = config();
        let gateway = PaymentGateway::new(&config);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 20, 30, 0).unwrap();

        let url = gateway
            .build_payment_url("TXN1", 150_000, "Order payment", "127.0.0.1", now)
            .unwrap();
        let params = parse(&url);

        assert!(url.starts_with("https://pay.example/vpcpay.html?vnp_Amount="));
        assert_eq!(params["vnp_Amount"], "15000000");
        assert_eq!(params["vnp_CreateDate"], "20260302033000");
        assert_eq!(params["vnp_OrderInfo"], "Order payment");
        assert_eq!(params[SECURE_HASH_PARAM].len(), 128);
    }

    /// Tests that a URL the gateway built verifies and a tampered one does not.
    ///
    /// Expected: Ok for the original query, InvalidSignature after changing the amount
    #[test]
    fn verifies_signatures() {
        let config = config();
        let gateway = PaymentGateway::new(&config);
        let url = gateway
            .build_payment_url("TXN2", 99_000, "Pay & eat", "10.0.0.1", Utc::now())
            .unwrap();

        let mut params = parse(&url);
        assert!(gateway.verify(&params).is_ok());

        params.insert(SECURE_HASH_TYPE_PARAM.to_string(), "HmacSHA512".to_string());
        assert!(gateway.verify(&params).is_ok());

        params.insert("vnp_Amount".to_string(), "100".to_string());
        assert!(matches!(
            gateway.verify(&params),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn parses_callbacks() {
        let query: HashMap<String, String> = [
            ("vnp_TxnRef", "TXN3"),
            ("vnp_Amount", "4500000"),
            ("vnp_ResponseCode", "00"),
            ("vnp_TransactionNo", "1400"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let callback = GatewayCallback::from_query(&query).unwrap();
        assert!(callback.matches_amount(45_000));
        assert!(callback.is_success());
        assert_eq!(callback.transaction_no.as_deref(), Some("1400"));
    }

    /// Tests that a fractional callback amount never matches a whole payment.
    ///
    /// Expected: 4500099 hundredths matches neither 45_000 nor 45_001
    #[test]
    fn rejects_fractional_amounts() {
        let query: HashMap<String, String> = [
            ("vnp_TxnRef", "TXN4"),
            ("vnp_Amount", "4500099"),
            ("vnp_ResponseCode", "00"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let callback = GatewayCallback::from_query(&query).unwrap();
        assert!(!callback.matches_amount(45_000));
        assert!(!callback.matches_amount(45_001));
    }
}
