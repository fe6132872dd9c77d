use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tradedesk_core::RiskLevel;

/// Cut-offs used to classify a bulk order plan.
///
/// A plan is HIGH when either its total margin or its order count exceeds the
/// high cut-off, otherwise MEDIUM when either exceeds the medium cut-off,
/// otherwise LOW. Comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub high_margin: Decimal,
    pub high_order_count: usize,
    pub medium_margin: Decimal,
    pub medium_order_count: usize,
}

impl RiskThresholds {
    /// The cut-offs the trading console has always used.
    pub fn standard() -> Self {
        Self {
            high_margin: dec!(1000),
            high_order_count: 10,
            medium_margin: dec!(500),
            medium_order_count: 5,
        }
    }

    pub fn classify(&self, total_margin: Decimal, order_count: usize) -> RiskLevel {
        if total_margin > self.high_margin || order_count > self.high_order_count {
            RiskLevel::High
        } else if total_margin > self.medium_margin || order_count > self.medium_order_count {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self::standard()
    }
}

/// Classify with the standard cut-offs.
pub fn classify(total_margin: Decimal, order_count: usize) -> RiskLevel {
    RiskThresholds::standard().classify(total_margin, order_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_boundaries() {
        assert_eq!(classify(dec!(1000.01), 10), RiskLevel::High);
        assert_eq!(classify(dec!(1000), 5), RiskLevel::Medium);
        assert_eq!(classify(dec!(999.99), 5), RiskLevel::Medium);
        assert_eq!(classify(dec!(500), 5), RiskLevel::Low);
        assert_eq!(classify(dec!(500.01), 1), RiskLevel::Medium);
    }

    #[test]
    fn test_count_boundaries() {
        assert_eq!(classify(dec!(0), 11), RiskLevel::High);
        assert_eq!(classify(dec!(0), 10), RiskLevel::Medium);
        assert_eq!(classify(dec!(0), 6), RiskLevel::Medium);
        assert_eq!(classify(dec!(0), 5), RiskLevel::Low);
    }

    #[test]
    fn test_high_dominates_medium() {
        // Medium by margin but high by count
        assert_eq!(classify(dec!(600), 12), RiskLevel::High);
        // Medium by count but high by margin
        assert_eq!(classify(dec!(2000), 7), RiskLevel::High);
    }

    #[test]
    fn test_empty_is_low() {
        assert_eq!(classify(Decimal::ZERO, 0), RiskLevel::Low);
    }
}
