//! Shipping cost

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Default rate, currency units per km
pub const DEFAULT_RATE_PER_KM: u64 = 4000;

/// round(distance × rate), half away from zero
///
/// `None` for non-finite distances.
pub fn shipping_cost(distance_km: f64, rate_per_km: u64) -> Option<Decimal> {
    let cost = (distance_km * rate_per_km as f64).round();
    if !cost.is_finite() {
        return None;
    }
    Decimal::from_f64(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding() {
        assert_eq!(shipping_cost(2.5, 4000), Some(Decimal::from(10000)));
        assert_eq!(shipping_cost(1.23456, 4000), Some(Decimal::from(4938)));
        assert_eq!(shipping_cost(0.0002, 4000), Some(Decimal::from(1)));
        assert_eq!(shipping_cost(0.0, 4000), Some(Decimal::ZERO));
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(shipping_cost(f64::NAN, 4000), None);
        assert_eq!(shipping_cost(f64::INFINITY, 4000), None);
    }
}
