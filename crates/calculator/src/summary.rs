use rust_decimal::Decimal;
use tradedesk_core::*;
use tradedesk_risk::classify;

/// Aggregate a calculated ladder.
///
/// The price range is the observed min/max of the orders, which can be
/// narrower than the requested range when a MANUAL ladder under-fills. An
/// empty ladder yields the all-zero LOW summary.
pub fn summarize(orders: &[CalculatedOrder]) -> OrderSummary {
    if orders.is_empty() {
        return OrderSummary::default();
    }

    let total_volume = total(orders.iter().map(|o| o.volume));
    let total_margin = total(orders.iter().map(|o| o.expected_margin));
    let average_price = total(orders.iter().map(|o| o.price)) / Decimal::from(orders.len());

    let min = orders.iter().map(|o| o.price).min().unwrap_or(Decimal::ZERO);
    let max = orders.iter().map(|o| o.price).max().unwrap_or(Decimal::ZERO);

    OrderSummary {
        total_orders: orders.len(),
        total_volume,
        total_margin,
        average_price,
        price_range: PriceRange::new(min, max),
        risk_level: classify(total_margin, orders.len()),
    }
}

/// Sum that clamps at the `Decimal` bounds instead of panicking.
fn total(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(price: Decimal, margin: Decimal) -> CalculatedOrder {
        CalculatedOrder {
            id: "bulk_0_0".to_string(),
            symbol: "EURUSD".to_string(),
            side: Side::Buy,
            price,
            volume: dec!(0.01),
            expected_margin: margin,
        }
    }

    #[test]
    fn test_empty_summary_is_zero_and_low() {
        let s = summarize(&[]);
        assert_eq!(s.total_orders, 0);
        assert_eq!(s.total_volume, Decimal::ZERO);
        assert_eq!(s.total_margin, Decimal::ZERO);
        assert_eq!(s.average_price, Decimal::ZERO);
        assert_eq!(s.price_range, PriceRange::new(Decimal::ZERO, Decimal::ZERO));
        assert_eq!(s.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_margin_just_over_high_threshold() {
        let orders = vec![order(dec!(1.1), dec!(500)), order(dec!(1.2), dec!(500.01))];
        let s = summarize(&orders);
        assert_eq!(s.total_margin, dec!(1000.01));
        assert_eq!(s.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_margin_just_under_high_threshold() {
        let orders = vec![order(dec!(1.1), dec!(499.99)), order(dec!(1.2), dec!(500))];
        assert_eq!(summarize(&orders).risk_level, RiskLevel::Medium);

        let orders = vec![order(dec!(1.1), dec!(250)), order(dec!(1.2), dec!(250))];
        assert_eq!(summarize(&orders).risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_order_count_drives_risk() {
        let six: Vec<_> = (0..6).map(|_| order(dec!(1), dec!(1))).collect();
        assert_eq!(summarize(&six).risk_level, RiskLevel::Medium);
        let eleven: Vec<_> = (0..11).map(|_| order(dec!(1), dec!(1))).collect();
        assert_eq!(summarize(&eleven).risk_level, RiskLevel::High);
    }

    #[test]
    fn test_totals_clamp_instead_of_overflowing() {
        let orders = vec![order(Decimal::MAX, Decimal::MAX), order(Decimal::MAX, Decimal::MAX)];
        let s = summarize(&orders);
        assert_eq!(s.total_margin, Decimal::MAX);
        assert_eq!(s.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_observed_range_and_average() {
        let orders = vec![
            order(dec!(1.3), dec!(1)),
            order(dec!(1.1), dec!(1)),
            order(dec!(1.2), dec!(1)),
        ];
        let s = summarize(&orders);
        assert_eq!(s.price_range, PriceRange::new(dec!(1.1), dec!(1.3)));
        assert_eq!(s.average_price, dec!(1.2));
        assert_eq!(s.total_volume, dec!(0.03));
    }
}
