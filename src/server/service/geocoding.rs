//! Address geocoding with an in-memory TTL cache.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::server::{error::delivery::DeliveryError, util::geo::Coordinates};

const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Resolves free-form address text to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// # Returns
    /// - `Ok(Some(Coordinates))` - Address resolved
    /// - `Ok(None)` - The provider found no match
    /// - `Err(DeliveryError::Geocoding)` - Provider call failed
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, DeliveryError>;
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// Google Maps Geocoding API client.
pub struct GoogleGeocoder {
    http_client: reqwest::Client,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(http_client: reqwest::Client, api_key: String) -> Self {
        Self {
            http_client,
            api_key,
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, DeliveryError> {
        let response = self
            .http_client
            .get(GOOGLE_GEOCODE_URL)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| DeliveryError::Geocoding(e.to_string()))?;

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Geocoding(e.to_string()))?;

        match body.status.as_str() {
            "OK" => Ok(body
                .results
                .first()
                .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))),
            "ZERO_RESULTS" => Ok(None),
            other => Err(DeliveryError::Geocoding(format!(
                "Geocoding provider returned status {}",
                other
            ))),
        }
    }
}

/// Wraps a geocoder with a per-address cache.
///
/// Keys are the normalized address text. Only resolved coordinates are cached;
/// misses and provider errors always go back to the inner geocoder.
pub struct CachedGeocoder {
    inner: Arc<dyn Geocoder>,
    cache: DashMap<String, (Coordinates, Instant)>,
    ttl: Duration,
}

impl CachedGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            ttl,
        }
    }

    /// Trims, lowercases and collapses whitespace.
    pub fn normalize(address: &str) -> String {
        address
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    fn cached(&self, key: &str) -> Option<Coordinates> {
        let hit = self
            .cache
            .get(key)
            .map(|entry| (entry.0, entry.1.elapsed() < self.ttl));

        match hit {
            Some((coordinates, true)) => Some(coordinates),
            Some((_, false)) => {
                self.cache.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl Geocoder for CachedGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, DeliveryError> {
        let key = Self::normalize(address);
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(coordinates) = self.cached(&key) {
            return Ok(Some(coordinates));
        }

        let resolved = self.inner.geocode(address).await?;
        if let Some(coordinates) = resolved {
            self.cache.insert(key, (coordinates, Instant::now()));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGeocoder {
        calls: AtomicUsize,
        result: Option<Coordinates>,
        fail: bool,
    }

    impl CountingGeocoder {
        fn new(result: Option<Coordinates>, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result,
                fail,
            })
        }
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DeliveryError::Geocoding("down".to_string()));
            }
            Ok(self.result)
        }
    }

    /// Tests that equivalent address spellings share one cache entry.
    ///
    /// Expected: inner geocoder called once for two lookups
    #[tokio::test]
    async fn caches_by_normalized_address() {
        let inner = CountingGeocoder::new(Some(Coordinates::new(10.77, 106.70)), false);
        let cached = CachedGeocoder::new(inner.clone(), Duration::from_secs(60));

        let first = cached.geocode("12 Le Loi,  District 1").await.unwrap();
        let second = cached.geocode("  12 le loi, district 1 ").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    /// Tests that entries expire after the TTL.
    ///
    /// Expected: inner geocoder called again after expiry
    #[tokio::test]
    async fn expires_entries() {
        let inner = CountingGeocoder::new(Some(Coordinates::new(10.77, 106.70)), false);
        let cached = CachedGeocoder::new(inner.clone(), Duration::from_millis(20));

        cached.geocode("12 Le Loi").await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        cached.geocode("12 Le Loi").await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    /// Tests that failures and misses are not cached.
    ///
    /// Expected: every lookup reaches the inner geocoder
    #[tokio::test]
    async fn does_not_cache_failures_or_misses() {
        let failing = CountingGeocoder::new(None, true);
        let cached = CachedGeocoder::new(failing.clone(), Duration::from_secs(60));
        assert!(cached.geocode("nowhere").await.is_err());
        assert!(cached.geocode("nowhere").await.is_err());
        assert_eq!(failing.calls.load(Ordering::SeqCst), 2);

        let missing = CountingGeocoder::new(None, false);
        let cached = CachedGeocoder::new(missing.clone(), Duration::from_secs(60));
        assert_eq!(cached.geocode("nowhere").await.unwrap(), None);
        assert_eq!(cached.geocode("nowhere").await.unwrap(), None);
        assert_eq!(missing.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn normalizes_address_text() {
        assert_eq!(
            CachedGeocoder::normalize("  12  Le\tLoi \n District 1 "),
            "12 le loi district 1"
        );
    }
}
