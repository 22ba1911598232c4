//! Third-party courier integration (GrabExpress partner API).
//!
//! The API is authenticated with OAuth2 client credentials. The access token is
//! cached until shortly before it expires.

use async_trait::async_trait;
use oauth2::{
    basic::{BasicErrorResponseType, BasicTokenType},
    Client, ClientId, ClientSecret, EmptyExtraTokenFields, EndpointNotSet, EndpointSet,
    RevocationErrorResponseType, Scope, StandardErrorResponse, StandardRevocableToken,
    StandardTokenIntrospectionResponse, StandardTokenResponse, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::server::{
    config::CourierConfig, error::delivery::DeliveryError, model::delivery::DeliveryStatus,
    util::geo::Coordinates,
};

const COURIER_SCOPE: &str = "grab_express.partner_deliveries";
const SERVICE_TYPE: &str = "INSTANT";
/// Tokens are refreshed this long before the provider's expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// OAuth2 client with only the token endpoint configured.
type CourierOAuthClient = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// A pickup or drop-off point.
#[derive(Debug, Clone, PartialEq)]
pub struct CourierStop {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourierPackage {
    pub name: String,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourierRequest {
    /// Our reference for the delivery, the order's tracking ID.
    pub merchant_order_id: String,
    pub origin: CourierStop,
    pub destination: CourierStop,
    pub packages: Vec<CourierPackage>,
    /// Amount the driver collects on drop-off, for cash orders.
    pub cash_on_delivery: Option<i64>,
}

/// The courier's view of a booked delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct CourierDelivery {
    pub delivery_id: String,
    pub status: DeliveryStatus,
    pub tracking_url: Option<String>,
}

/// Operations the delivery service needs from a courier.
#[async_trait]
pub trait CourierApi: Send + Sync {
    /// Price of delivering the request, in VND.
    async fn quote(&self, request: &CourierRequest) -> Result<i64, DeliveryError>;

    async fn create(&self, request: &CourierRequest) -> Result<CourierDelivery, DeliveryError>;

    async fn get(&self, delivery_id: &str) -> Result<CourierDelivery, DeliveryError>;

    async fn cancel(&self, delivery_id: &str) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiCoordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiLocation {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<ApiCoordinates>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiDimensions {
    height: i32,
    width: i32,
    depth: i32,
    weight: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPackage {
    name: String,
    description: String,
    quantity: i32,
    price: i64,
    dimensions: ApiDimensions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiContact {
    first_name: String,
    phone: String,
    sms_enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiCashOnDelivery {
    enable: bool,
    amount: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteBody {
    service_type: &'static str,
    packages: Vec<ApiPackage>,
    origin: ApiLocation,
    destination: ApiLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody {
    #[serde(rename = "merchantOrderID")]
    merchant_order_id: String,
    service_type: &'static str,
    payment_method: &'static str,
    packages: Vec<ApiPackage>,
    origin: ApiLocation,
    destination: ApiLocation,
    sender: ApiContact,
    recipient: ApiContact,
    #[serde(skip_serializing_if = "Option::is_none")]
    cash_on_delivery: Option<ApiCashOnDelivery>,
}

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    quotes: Vec<QuoteEntry>,
}

#[derive(Deserialize)]
struct QuoteEntry {
    amount: f64,
}

#[derive(Deserialize)]
struct DeliveryResponse {
    #[serde(rename = "deliveryID")]
    delivery_id: String,
    status: String,
    #[serde(rename = "trackingURL", default)]
    tracking_url: Option<String>,
}

impl DeliveryResponse {
    fn into_delivery(self) -> Result<CourierDelivery, DeliveryError> {
        let status = self.status.parse().map_err(DeliveryError::Courier)?;
        Ok(CourierDelivery {
            delivery_id: self.delivery_id,
            status,
            tracking_url: self.tracking_url.filter(|u| !u.is_empty()),
        })
    }
}

fn location(stop: &CourierStop) -> ApiLocation {
    ApiLocation {
        address: stop.address.clone(),
        coordinates: stop.coordinates.map(|c| ApiCoordinates {
            latitude: c.latitude,
            longitude: c.longitude,
        }),
    }
}

fn contact(stop: &CourierStop) -> ApiContact {
    ApiContact {
        first_name: stop.name.clone(),
        phone: stop.phone.clone(),
        sms_enabled: true,
    }
}

fn packages(request: &CourierRequest) -> Vec<ApiPackage> {
    request
        .packages
        .iter()
        .map(|p| ApiPackage {
            name: p.name.clone(),
            description: p.name.clone(),
            quantity: p.quantity,
            price: p.price,
            // Food parcels; the API requires dimensions but does not price on them
            dimensions: ApiDimensions {
                height: 0,
                width: 0,
                depth: 0,
                weight: 0,
            },
        })
        .collect()
}

/// GrabExpress partner API client.
pub struct GrabExpressClient {
    http_client: reqwest::Client,
    oauth_client: CourierOAuthClient,
    api_url: String,
    token: Arc<RwLock<Option<(String, Instant)>>>,
}

impl GrabExpressClient {
    pub fn new(http_client: reqwest::Client, config: CourierConfig) -> Result<Self, DeliveryError> {
        let token_url = TokenUrl::new(config.token_url)
            .map_err(|e| DeliveryError::Courier(format!("Invalid token URL: {}", e)))?;

        let oauth_client = Client::new(ClientId::new(config.client_id))
            .set_client_secret(ClientSecret::new(config.client_secret))
            .set_auth_type(oauth2::AuthType::RequestBody)
            .set_token_uri(token_url);

        Ok(Self {
            http_client,
            oauth_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    async fn access_token(&self) -> Result<String, DeliveryError> {
        if let Some((token, expires_at)) = self.token.read().await.as_ref() {
            if Instant::now() < *expires_at {
                return Ok(token.clone());
            }
        }

        let response = self
            .oauth_client
            .exchange_client_credentials()
            .add_scope(Scope::new(COURIER_SCOPE.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| DeliveryError::Courier(format!("Token request failed: {}", e)))?;

        let token = response.access_token().secret().clone();
        let lifetime = response
            .expires_in()
            .unwrap_or(Duration::from_secs(3600))
            .saturating_sub(TOKEN_EXPIRY_MARGIN);

        *self.token.write().await = Some((token.clone(), Instant::now() + lifetime));

        Ok(token)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, DeliveryError> {
        let token = self.access_token().await?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DeliveryError::Courier(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Courier(format!(
                "Courier API returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl CourierApi for GrabExpressClient {
    async fn quote(&self, request: &CourierRequest) -> Result<i64, DeliveryError> {
        let body = QuoteBody {
            service_type: SERVICE_TYPE,
            packages: packages(request),
            origin: location(&request.origin),
            destination: location(&request.destination),
        };

        let response: QuoteResponse = self
            .send(
                self.http_client
                    .post(format!("{}/v1/deliveries/quotes", self.api_url))
                    .json(&body),
            )
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::Courier(e.to_string()))?;

        response
            .quotes
            .first()
            .map(|q| q.amount.ceil() as i64)
            .ok_or_else(|| DeliveryError::Courier("Courier returned no quotes".to_string()))
    }

    async fn create(&self, request: &CourierRequest) -> Result<CourierDelivery, DeliveryError> {
        let body = CreateBody {
            merchant_order_id: request.merchant_order_id.clone(),
            service_type: SERVICE_TYPE,
            payment_method: "CASHLESS",
            packages: packages(request),
            origin: location(&request.origin),
            destination: location(&request.destination),
            sender: contact(&request.origin),
            recipient: contact(&request.destination),
            cash_on_delivery: request.cash_on_delivery.map(|amount| ApiCashOnDelivery {
                enable: true,
                amount,
            }),
        };

        let response: DeliveryResponse = self
            .send(
                self.http_client
                    .post(format!("{}/v1/deliveries", self.api_url))
                    .json(&body),
            )
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::Courier(e.to_string()))?;

        response.into_delivery()
    }

    async fn get(&self, delivery_id: &str) -> Result<CourierDelivery, DeliveryError> {
        let response: DeliveryResponse = self
            .send(
                self.http_client
                    .get(format!("{}/v1/deliveries/{}", self.api_url, delivery_id)),
            )
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::Courier(e.to_string()))?;

        response.into_delivery()
    }

    async fn cancel(&self, delivery_id: &str) -> Result<(), DeliveryError> {
        self.send(
            self.http_client
                .delete(format!("{}/v1/deliveries/{}", self.api_url, delivery_id)),
        )
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_delivery_response() {
        let raw = r#"{"deliveryID":"IN-2-123","status":"PENDING_PICKUP","trackingURL":"https://track/1"}"#;
        let response: DeliveryResponse = serde_json::from_str(raw).unwrap();
        let delivery = response.into_delivery().unwrap();

        assert_eq!(delivery.delivery_id, "IN-2-123");
        assert_eq!(delivery.status, DeliveryStatus::PendingPickup);
        assert_eq!(delivery.tracking_url.as_deref(), Some("https://track/1"));
    }

    #[test]
    fn rejects_unknown_courier_status() {
        let raw = r#"{"deliveryID":"IN-2-123","status":"TELEPORTED"}"#;
        let response: DeliveryResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            response.into_delivery(),
            Err(DeliveryError::Courier(_))
        ));
    }

    #[test]
    fn serializes_create_body_in_api_casing() {
        let stop = CourierStop {
            name: "Shop".to_string(),
            phone: "+84900000000".to_string(),
            address: "1 Nguyen Hue".to_string(),
            coordinates: Some(Coordinates::new(10.77, 106.70)),
        };
        let request = CourierRequest {
            merchant_order_id: "ABC123".to_string(),
            origin: stop.clone(),
            destination: stop,
            packages: vec![CourierPackage {
                name: "Pho".to_string(),
                quantity: 2,
                price: 45_000,
            }],
            cash_on_delivery: Some(105_000),
        };
        let body = CreateBody {
            merchant_order_id: request.merchant_order_id.clone(),
            service_type: SERVICE_TYPE,
            payment_method: "CASHLESS",
            packages: packages(&request),
            origin: location(&request.origin),
            destination: location(&request.destination),
            sender: contact(&request.origin),
            recipient: contact(&request.destination),
            cash_on_delivery: Some(ApiCashOnDelivery {
                enable: true,
                amount: 105_000,
            }),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["merchantOrderID"], "ABC123");
        assert_eq!(json["serviceType"], "INSTANT");
        assert_eq!(json["origin"]["coordinates"]["latitude"], 10.77);
        assert_eq!(json["recipient"]["firstName"], "Shop");
        assert_eq!(json["cashOnDelivery"]["amount"], 105_000);
    }
}
