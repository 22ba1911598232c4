//! Outbound SMS used to deliver verification codes.

use async_trait::async_trait;

use crate::server::{config::SmsConfig, error::AppError};

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), AppError>;
}

/// Sends messages through the Twilio Messages API.
pub struct TwilioSmsSender {
    http_client: reqwest::Client,
    config: SmsConfig,
}

impl TwilioSmsSender {
    pub fn new(http_client: reqwest::Client, config: SmsConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), AppError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let response = self
            .http_client
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("SMS delivery to {} failed with {}: {}", to, status, text);
            return Err(AppError::InternalError(format!(
                "SMS provider returned {}",
                status
            )));
        }

        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
///
/// Used when no SMS account is configured.
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), AppError> {
        tracing::info!("SMS to {}: {}", to, body);
        Ok(())
    }
}
