use std::{path::PathBuf, str::FromStr};

use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_URL: &str = "http://localhost:8080";
const DEFAULT_COURIER_API_URL: &str = "https://partner-api.grab.com/grab-express-sandbox";
const DEFAULT_COURIER_TOKEN_URL: &str = "https://api.grab.com/grabid/v1/oauth2/token";
const DEFAULT_PAYMENT_URL: &str = "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html";

/// Credentials for the third-party courier API.
#[derive(Clone)]
pub struct CourierConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
}

/// Merchant settings for the hosted payment page.
#[derive(Clone)]
pub struct PaymentGatewayConfig {
    pub tmn_code: String,
    pub hash_secret: String,
    pub payment_url: String,
    pub return_url: String,
}

/// Twilio-style SMS account used to deliver OTP codes.
#[derive(Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub app_url: String,

    pub upload_dir: PathBuf,
    pub upload_tmp_retention_hours: i64,
    pub token_ttl_days: i64,

    pub geocoding_api_key: Option<String>,
    pub geocoding_cache_ttl_seconds: u64,

    /// Present only when both client id and secret are set.
    pub courier: Option<CourierConfig>,
    /// Present only when both terminal code and hash secret are set.
    pub payment: Option<PaymentGatewayConfig>,
    /// Present only when all three SMS variables are set.
    pub sms: Option<SmsConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let app_url = optional("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string());

        let courier = match (
            optional("COURIER_CLIENT_ID"),
            optional("COURIER_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(CourierConfig {
                client_id,
                client_secret,
                api_url: optional("COURIER_API_URL")
                    .unwrap_or_else(|| DEFAULT_COURIER_API_URL.to_string()),
                token_url: optional("COURIER_TOKEN_URL")
                    .unwrap_or_else(|| DEFAULT_COURIER_TOKEN_URL.to_string()),
            }),
            _ => None,
        };

        let payment = match (optional("PAYMENT_TMN_CODE"), optional("PAYMENT_HASH_SECRET")) {
            (Some(tmn_code), Some(hash_secret)) => Some(PaymentGatewayConfig {
                tmn_code,
                hash_secret,
                payment_url: optional("PAYMENT_URL")
                    .unwrap_or_else(|| DEFAULT_PAYMENT_URL.to_string()),
                return_url: optional("PAYMENT_RETURN_URL")
                    .unwrap_or_else(|| format!("{}/api/payments/gateway/return", app_url)),
            }),
            _ => None,
        };

        let sms = match (
            optional("SMS_ACCOUNT_SID"),
            optional("SMS_AUTH_TOKEN"),
            optional("SMS_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(SmsConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            app_url,
            upload_dir: PathBuf::from(optional("UPLOAD_DIR").unwrap_or_else(|| "uploads".into())),
            upload_tmp_retention_hours: parsed("UPLOAD_TMP_RETENTION_HOURS", 24)?,
            token_ttl_days: parsed("TOKEN_TTL_DAYS", 30)?,
            geocoding_api_key: optional("GEOCODING_API_KEY"),
            geocoding_cache_ttl_seconds: parsed("GEOCODING_CACHE_TTL_SECONDS", 86_400)?,
            courier,
            payment,
            sms,
        })
    }
}

/// Reads a variable, treating empty values as unset.
fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
