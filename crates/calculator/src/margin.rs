use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Units per standard lot.
pub const CONTRACT_SIZE: Decimal = dec!(100000);
/// Account leverage assumed for every symbol (1:100).
pub const LEVERAGE: Decimal = dec!(100);

/// Simplified margin estimate: notional value divided by leverage.
///
/// Uses the same contract size and leverage for every symbol. `None` when the
/// notional value is not representable.
pub fn estimate_margin(price: Decimal, volume: Decimal) -> Option<Decimal> {
    price
        .checked_mul(volume)?
        .checked_mul(CONTRACT_SIZE)?
        .checked_div(LEVERAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lot_margin() {
        assert_eq!(estimate_margin(dec!(1.1), dec!(0.01)), Some(dec!(11)));
        assert_eq!(estimate_margin(dec!(1.1), dec!(1)), Some(dec!(1100)));
    }

    #[test]
    fn test_zero_volume_has_no_margin() {
        assert_eq!(estimate_margin(dec!(1950), Decimal::ZERO), Some(Decimal::ZERO));
    }

    #[test]
    fn test_unrepresentable_notional() {
        assert_eq!(estimate_margin(dec!(1000000000000000000000000), dec!(1)), None);
    }
}
