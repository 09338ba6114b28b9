use crate::config::PricingConfig;

/// Derived price: `ceil(price * multiplier / divisor)`
pub fn derived_price(price: f64, pricing: &PricingConfig) -> i64 {
    (price * pricing.multiplier / pricing.divisor).ceil() as i64
}

/// Rounds to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_price_rounds_up() {
        let pricing = PricingConfig::default();
        // 5999 * 1.44 / 117 = 73.83...
        assert_eq!(derived_price(5999.0, &pricing), 74);
        // 117 * 1.44 / 117 = 1.44
        assert_eq!(derived_price(117.0, &pricing), 2);
    }

    #[test]
    fn test_derived_price_exact_value_is_kept() {
        let pricing = PricingConfig {
            multiplier: 2.0,
            divisor: 4.0,
        };
        assert_eq!(derived_price(10.0, &pricing), 5);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.123456), 0.12);
        assert_eq!(round2(1.005 + 0.001), 1.01);
        assert_eq!(round2(2.0), 2.0);
    }
}
