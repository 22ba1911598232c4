//! Distance-based self-delivery pricing.

use crate::server::{
    error::delivery::DeliveryError,
    model::delivery::{DeliveryMethod, DeliveryOption, DeliveryQuote},
    util::geo::{haversine_km, Coordinates},
};

/// Fees are rounded up to a multiple of this amount.
pub const FEE_ROUNDING: i64 = 1_000;

/// Prices a self-delivery from `pickup` to `dropoff` under the shop's tariff.
///
/// # Returns
/// - `Ok(DeliveryQuote)` - `max(min_fee, ceil(km * fee_per_km / 1000) * 1000)`
/// - `Err(DeliveryError::OutOfRange)` - Distance exceeds `max_distance_km`
pub fn self_delivery_fee(
    option: &DeliveryOption,
    pickup: Coordinates,
    dropoff: Coordinates,
) -> Result<DeliveryQuote, DeliveryError> {
    let distance_km = haversine_km(pickup, dropoff);

    if distance_km > option.max_distance_km {
        return Err(DeliveryError::OutOfRange {
            distance_km,
            max_distance_km: option.max_distance_km,
        });
    }

    let raw = distance_km * option.fee_per_km as f64;
    let rounded = (raw / FEE_ROUNDING as f64).ceil() as i64 * FEE_ROUNDING;

    Ok(DeliveryQuote {
        method: DeliveryMethod::SelfDelivery,
        fee: rounded.max(option.min_fee),
        distance_km: Some(distance_km),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn option(fee_per_km: i64, min_fee: i64, max_distance_km: f64) -> DeliveryOption {
        DeliveryOption {
            shop_id: 1,
            fee_per_km,
            min_fee,
            max_distance_km,
            pickup_address_id: 1,
            updated_at: Utc::now(),
        }
    }

    // Roughly 1.11 km per 0.01 degree of latitude
    fn north_of(origin: Coordinates, degrees: f64) -> Coordinates {
        Coordinates::new(origin.latitude + degrees, origin.longitude)
    }

    const ORIGIN: Coordinates = Coordinates {
        latitude: 10.7743,
        longitude: 106.7038,
    };

    #[test]
    fn applies_minimum_fee() {
        let quote = self_delivery_fee(&option(5_000, 15_000, 10.0), ORIGIN, north_of(ORIGIN, 0.01))
            .unwrap();
        assert_eq!(quote.fee, 15_000);
        assert_eq!(quote.method, DeliveryMethod::SelfDelivery);
    }

    /// Tests rounding of the distance-based fee.
    ///
    /// Expected: about 5.6 km at 5 000/km rounds up to the next multiple of 1 000
    #[test]
    fn rounds_up_to_next_thousand() {
        let dropoff = north_of(ORIGIN, 0.05);
        let quote = self_delivery_fee(&option(5_000, 10_000, 10.0), ORIGIN, dropoff).unwrap();

        let distance = haversine_km(ORIGIN, dropoff);
        let expected = ((distance * 5_000.0) / 1_000.0).ceil() as i64 * 1_000;
        assert_eq!(quote.fee, expected);
        assert_eq!(quote.fee % FEE_ROUNDING, 0);
        assert!(quote.fee >= (distance * 5_000.0) as i64);
    }

    #[test]
    fn same_point_costs_minimum() {
        let quote = self_delivery_fee(&option(5_000, 12_000, 10.0), ORIGIN, ORIGIN).unwrap();
        assert_eq!(quote.fee, 12_000);
        assert_eq!(quote.distance_km, Some(0.0));
    }

    #[test]
    fn rejects_out_of_range() {
        let result = self_delivery_fee(&option(5_000, 15_000, 3.0), ORIGIN, north_of(ORIGIN, 0.1));
        assert!(matches!(result, Err(DeliveryError::OutOfRange { .. })));
    }
}
