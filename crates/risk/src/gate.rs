use crate::thresholds::RiskThresholds;
use tradedesk_core::*;
use tracing::{info, warn};

/// Outcome of checking a bulk order plan before it is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionDecision {
    /// Plan may be sent.
    Approved,
    /// Plan may be sent only after the user explicitly confirms.
    ConfirmationRequired(String),
    /// Plan must not be sent.
    Rejected(String),
}

/// Caller-side gate in front of bulk submission.
///
/// Empty plans are refused outright. Plans at or above `confirm_at` need an
/// explicit confirmation from the user.
#[derive(Debug, Clone)]
pub struct SubmissionGate {
    confirm_at: RiskLevel,
    thresholds: RiskThresholds,
}

impl SubmissionGate {
    pub fn new(confirm_at: RiskLevel) -> Self {
        Self {
            confirm_at,
            thresholds: RiskThresholds::standard(),
        }
    }

    /// Classify plans with `thresholds` instead of the standard cut-offs.
    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Decide whether a plan may be sent. The plan's risk is classified with
    /// this gate's thresholds.
    pub fn evaluate(&self, summary: &OrderSummary, confirmed: bool) -> SubmissionDecision {
        if summary.is_empty() {
            warn!("Bulk order refused: no orders to submit");
            return SubmissionDecision::Rejected("No orders to submit".to_string());
        }

        let risk = self
            .thresholds
            .classify(summary.total_margin, summary.total_orders);

        if risk >= self.confirm_at && !confirmed {
            let reason = format!(
                "{} risk bulk order: {} orders, total volume {}, estimated margin ${:.2}. \
                 Explicit confirmation required",
                risk, summary.total_orders, summary.total_volume, summary.total_margin
            );
            warn!(
                risk = %risk,
                orders = summary.total_orders,
                "Confirmation required before submission"
            );
            return SubmissionDecision::ConfirmationRequired(reason);
        }

        info!(
            risk = %risk,
            orders = summary.total_orders,
            confirmed,
            "Bulk order approved for submission"
        );
        SubmissionDecision::Approved
    }
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self::new(RiskLevel::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn summary(orders: usize, margin: Decimal) -> OrderSummary {
        OrderSummary {
            total_orders: orders,
            total_volume: dec!(0.01) * Decimal::from(orders),
            total_margin: margin,
            average_price: dec!(1.1),
            price_range: PriceRange::new(dec!(1.1), dec!(1.1)),
            risk_level: RiskThresholds::standard().classify(margin, orders),
        }
    }

    #[test]
    fn test_empty_plan_rejected() {
        let gate = SubmissionGate::default();
        match gate.evaluate(&OrderSummary::default(), true) {
            SubmissionDecision::Rejected(msg) => assert!(msg.contains("No orders")),
            other => panic!("Expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_high_risk_needs_confirmation() {
        let gate = SubmissionGate::default();
        let plan = summary(12, dec!(132));
        match gate.evaluate(&plan, false) {
            SubmissionDecision::ConfirmationRequired(msg) => {
                assert!(msg.starts_with("HIGH risk"));
                assert!(msg.contains("12 orders"));
            }
            other => panic!("Expected confirmation request, got {:?}", other),
        }
        assert!(approved(gate.evaluate(&plan, true)));
    }

    #[test]
    fn test_low_and_medium_pass_without_confirmation() {
        let gate = SubmissionGate::default();
        assert!(approved(gate.evaluate(&summary(5, dec!(55)), false)));
        assert!(approved(gate.evaluate(&summary(7, dec!(77)), false)));
    }

    fn approved(decision: SubmissionDecision) -> bool {
        decision == SubmissionDecision::Approved
    }

    #[test]
    fn test_custom_thresholds_drive_the_decision() {
        let tight = RiskThresholds {
            high_margin: dec!(50),
            high_order_count: 3,
            medium_margin: dec!(10),
            medium_order_count: 2,
        };
        let gate = SubmissionGate::default().with_thresholds(tight);
        // Standard cut-offs call this LOW; the tight ones call it HIGH.
        let plan = summary(5, dec!(55));
        assert_eq!(plan.risk_level, RiskLevel::Low);
        match gate.evaluate(&plan, false) {
            SubmissionDecision::ConfirmationRequired(msg) => assert!(msg.starts_with("HIGH risk")),
            other => panic!("Expected confirmation request, got {:?}", other),
        }

        let loose = RiskThresholds {
            high_margin: dec!(1000000),
            high_order_count: 50,
            ..RiskThresholds::standard()
        };
        let gate = SubmissionGate::default().with_thresholds(loose);
        assert!(approved(gate.evaluate(&summary(12, dec!(132)), false)));
    }

    #[test]
    fn test_stricter_gate_confirms_medium() {
        let gate = SubmissionGate::new(RiskLevel::Medium);
        let plan = summary(7, dec!(77));
        assert!(matches!(
            gate.evaluate(&plan, false),
            SubmissionDecision::ConfirmationRequired(_)
        ));
    }
}
