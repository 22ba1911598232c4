//! Payments: card records, hosted gateway checkout and gateway callbacks.

pub mod card;
pub mod gateway;

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::{
    model::payment::IpnResponseDto,
    server::{
        config::PaymentGatewayConfig,
        data::{order::OrderRepository, payment::PaymentRepository},
        error::{payment::PaymentError, AppError},
        model::{
            order::PaymentMethod,
            payment::{Payment, PaymentStatus},
        },
        service::{
            notification::NotificationService,
            payment::gateway::{GatewayCallback, PaymentGateway},
        },
        util::token::generate_tracking_id,
    },
};

pub struct PaymentService<'a> {
    db: &'a DatabaseConnection,
    gateway: Option<&'a PaymentGatewayConfig>,
}

impl<'a> PaymentService<'a> {
    pub fn new(db: &'a DatabaseConnection, gateway: Option<&'a PaymentGatewayConfig>) -> Self {
        Self { db, gateway }
    }

    pub async fn get_payment(&self, id: i32, user_id: i32) -> Result<Payment, AppError> {
        PaymentRepository::new(self.db)
            .find_by_id(id)
            .await?
            .filter(|p| p.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    /// Records a settled card payment covering the given orders and marks them paid.
    pub async fn record_card_payment(
        &self,
        user_id: i32,
        amount: i64,
        order_ids: Vec<i32>,
    ) -> Result<Payment, AppError> {
        let payment = PaymentRepository::new(self.db)
            .create(
                user_id,
                PaymentMethod::Card,
                amount,
                PaymentStatus::Paid,
                generate_tracking_id(),
            )
            .await?;
        self.attach_or_discard(&payment, order_ids.clone(), true).await?;

        Ok(Payment {
            order_ids,
            ..payment
        })
    }

    /// Opens a pending gateway payment covering the given orders.
    ///
    /// # Returns
    /// - `Ok((Payment, String))` - The pending payment and the hosted page URL
    /// - `Err(PaymentError::GatewayUnavailable)` - Gateway not configured
    pub async fn start_gateway_payment(
        &self,
        user_id: i32,
        amount: i64,
        order_ids: Vec<i32>,
        client_ip: &str,
    ) -> Result<(Payment, String), AppError> {
        let config = self.gateway.ok_or(PaymentError::GatewayUnavailable)?;

        let payment = PaymentRepository::new(self.db)
            .create(
                user_id,
                PaymentMethod::Gateway,
                amount,
                PaymentStatus::Pending,
                generate_tracking_id(),
            )
            .await?;
        self.attach_or_discard(&payment, order_ids.clone(), false).await?;

        let url = PaymentGateway::new(config).build_payment_url(
            &payment.txn_ref,
            amount,
            &format!("Payment {}", payment.txn_ref),
            client_ip,
            Utc::now(),
        )?;

        Ok((
            Payment {
                order_ids,
                ..payment
            },
            url,
        ))
    }

    /// Links a freshly created payment to its orders, deleting the payment
    /// again when the link cannot be written.
    async fn attach_or_discard(
        &self,
        payment: &Payment,
        order_ids: Vec<i32>,
        paid: bool,
    ) -> Result<(), AppError> {
        let attached = OrderRepository::new(self.db)
            .attach_payment(order_ids, payment.id, paid)
            .await;
        if let Err(e) = attached {
            if let Err(cleanup) = PaymentRepository::new(self.db).delete(payment.id).await {
                tracing::error!("Failed to discard payment {}: {}", payment.id, cleanup);
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Handles the browser redirect back from the gateway.
    pub async fn gateway_return(&self, query: &HashMap<String, String>) -> Result<Payment, AppError> {
        self.settle_callback(query).await
    }

    /// Handles the gateway's server-to-server notification.
    ///
    /// Errors are reported in the body with the gateway's response codes.
    pub async fn gateway_ipn(&self, query: &HashMap<String, String>) -> IpnResponseDto {
        let (code, message) = match self.settle_callback(query).await {
            Ok(_) => ("00", "Confirm Success"),
            Err(AppError::PaymentErr(PaymentError::InvalidSignature)) => ("97", "Invalid Checksum"),
            Err(AppError::PaymentErr(PaymentError::AmountMismatch(_))) => ("04", "Invalid Amount"),
            Err(AppError::NotFound(_)) => ("01", "Order not found"),
            Err(e) => {
                tracing::error!("Failed to process payment notification: {}", e);
                ("99", "Unknown error")
            }
        };

        IpnResponseDto {
            rsp_code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// Verifies a callback and settles the payment it refers to.
    ///
    /// Repeated callbacks for a settled payment return it unchanged.
    async fn settle_callback(&self, query: &HashMap<String, String>) -> Result<Payment, AppError> {
        let config = self.gateway.ok_or(PaymentError::GatewayUnavailable)?;
        PaymentGateway::new(config).verify(query)?;
        let callback = GatewayCallback::from_query(query)?;

        let repo = PaymentRepository::new(self.db);
        let payment = repo
            .find_by_txn_ref(&callback.txn_ref)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", callback.txn_ref)))?;

        if !callback.matches_amount(payment.amount) {
            return Err(PaymentError::AmountMismatch(callback.txn_ref).into());
        }
        if payment.status != PaymentStatus::Pending {
            return Ok(payment);
        }

        let status = if callback.is_success() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Failed
        };
        let settled = repo
            .settle(
                payment.id,
                status,
                callback.transaction_no.clone(),
                Some(callback.response_code.clone()),
                Utc::now(),
            )
            .await?;

        if settled {
            tracing::info!(
                "Payment {} settled as {} (response code {})",
                payment.txn_ref,
                status.as_str(),
                callback.response_code
            );
            self.after_settlement(payment.id, status).await?;
        }

        repo.find_by_id(payment.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    async fn after_settlement(&self, payment_id: i32, status: PaymentStatus) -> Result<(), AppError> {
        let orders = OrderRepository::new(self.db);
        if status == PaymentStatus::Paid {
            orders.mark_paid_by_payment(payment_id).await?;
        }

        let notifications = NotificationService::new(self.db);
        for order in orders.list_by_payment(payment_id).await? {
            match status {
                PaymentStatus::Paid => {
                    notifications
                        .order_event(&order, order.shop_id, "Payment received, the order can be confirmed")
                        .await
                }
                _ => {
                    notifications
                        .order_event(&order, order.user_id, "Online payment failed")
                        .await
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    use crate::server::model::order::Order;

    fn config() -> PaymentGatewayConfig {
        PaymentGatewayConfig {
            tmn_code: "TASTE001".to_string(),
            hash_secret: "SECRETKEY".to_string(),
            payment_url: "https://pay.example/vpcpay.html".to_string(),
            return_url: "http://localhost:8080/api/payments/gateway/return".to_string(),
        }
    }

    /// Signs a callback the way the gateway would.
    fn callback(config: &PaymentGatewayConfig, txn_ref: &str, amount: i64, code: &str) -> HashMap<String, String> {
        let url = PaymentGateway::new(config)
            .build_payment_url(txn_ref, amount, "callback", "127.0.0.1", Utc::now())
            .unwrap();
        let mut params: HashMap<String, String> = url::Url::parse(&url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        params.remove(gateway::SECURE_HASH_PARAM);
        params.insert("vnp_ResponseCode".to_string(), code.to_string());
        params.insert("vnp_TransactionNo".to_string(), "14000001".to_string());

        let signature = PaymentGateway::new(config).sign(&params).unwrap();
        params.insert(gateway::SECURE_HASH_PARAM.to_string(), signature);
        params
    }

    async fn gateway_order(db: &DatabaseConnection) -> (Order, Payment) {
        let (customer, _, _, _, order) = factory::helpers::create_order_with_dependencies(db)
            .await
            .unwrap();
        let order = OrderRepository::new(db).find_by_id(order.id).await.unwrap().unwrap();
        let config = config();
        let (payment, _) = PaymentService::new(db, Some(&config))
            .start_gateway_payment(customer.id, order.total, vec![order.id], "127.0.0.1")
            .await
            .unwrap();
        (order, payment)
    }

    /// Tests a successful return from the gateway.
    ///
    /// Expected: payment PAID with the transaction number, order marked paid,
    /// repeated callback leaves it unchanged
    #[tokio::test]
    async fn settles_successful_payment() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let config = config();
        let (order, payment) = gateway_order(db).await;
        let service = PaymentService::new(db, Some(&config));
        let query = callback(&config, &payment.txn_ref, payment.amount, "00");

        let settled = service.gateway_return(&query).await.unwrap();
        assert_eq!(settled.status, PaymentStatus::Paid);
        assert_eq!(settled.gateway_transaction_no.as_deref(), Some("14000001"));
        assert_eq!(settled.order_ids, vec![order.id]);

        let order = OrderRepository::new(db).find_by_id(order.id).await.unwrap().unwrap();
        assert!(order.is_paid);

        let again = service.gateway_ipn(&query).await;
        assert_eq!(again.rsp_code, "00");
        let unchanged = service.get_payment(payment.id, payment.user_id).await.unwrap();
        assert_eq!(unchanged.paid_at, settled.paid_at);
    }

    /// Tests a declined payment.
    ///
    /// Expected: payment FAILED, order left unpaid
    #[tokio::test]
    async fn records_declined_payment() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let config = config();
        let (order, payment) = gateway_order(db).await;
        let query = callback(&config, &payment.txn_ref, payment.amount, "24");

        let settled = PaymentService::new(db, Some(&config))
            .gateway_return(&query)
            .await
            .unwrap();
        assert_eq!(settled.status, PaymentStatus::Failed);

        let order = OrderRepository::new(db).find_by_id(order.id).await.unwrap().unwrap();
        assert!(!order.is_paid);
    }

    /// Tests callback rejection.
    ///
    /// Expected: IPN codes 97 for a bad signature, 04 for a wrong or fractional
    /// amount and 01 for an unknown reference
    #[tokio::test]
    async fn rejects_bad_callbacks() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let config = config();
        let (_, payment) = gateway_order(db).await;
        let service = PaymentService::new(db, Some(&config));

        let mut tampered = callback(&config, &payment.txn_ref, payment.amount, "00");
        tampered.insert("vnp_ResponseCode".to_string(), "01".to_string());
        assert_eq!(service.gateway_ipn(&tampered).await.rsp_code, "97");

        let wrong_amount = callback(&config, &payment.txn_ref, payment.amount + 1, "00");
        assert_eq!(service.gateway_ipn(&wrong_amount).await.rsp_code, "04");

        let mut fractional = callback(&config, &payment.txn_ref, payment.amount, "00");
        fractional.remove(gateway::SECURE_HASH_PARAM);
        fractional.insert(
            "vnp_Amount".to_string(),
            (payment.amount * 100 + 99).to_string(),
        );
        let signature = PaymentGateway::new(&config).sign(&fractional).unwrap();
        fractional.insert(gateway::SECURE_HASH_PARAM.to_string(), signature);
        assert_eq!(service.gateway_ipn(&fractional).await.rsp_code, "04");

        let unknown = callback(&config, "NOSUCHREF", payment.amount, "00");
        assert_eq!(service.gateway_ipn(&unknown).await.rsp_code, "01");

        assert!(matches!(
            service.gateway_return(&tampered).await,
            Err(AppError::PaymentErr(PaymentError::InvalidSignature))
        ));
    }

    /// Tests that the gateway must be configured.
    ///
    /// Expected: Err(PaymentErr(GatewayUnavailable))
    #[tokio::test]
    async fn requires_gateway_config() {
        let test = TestBuilder::new().with_order_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let user = factory::create_user(db).await.unwrap();

        let result = PaymentService::new(db, None)
            .start_gateway_payment(user.id, 10_000, Vec::new(), "127.0.0.1")
            .await;

        assert!(matches!(
            result,
            Err(AppError::PaymentErr(PaymentError::GatewayUnavailable))
        ));
    }
}
