use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// How volume is weighted across the generated price ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionMode {
    /// Same volume for all orders.
    #[default]
    Equal,
    /// More volume on the first orders of the ladder.
    Progressive,
    /// More volume on the last orders of the ladder.
    Regressive,
}

impl DistributionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionMode::Equal => "EQUAL",
            DistributionMode::Progressive => "PROGRESSIVE",
            DistributionMode::Regressive => "REGRESSIVE",
        }
    }
}

/// How the price ladder is stepped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceStepMode {
    /// Evenly spaced across the whole range.
    #[default]
    Auto,
    /// Fixed user-supplied increment starting at the range minimum.
    Manual,
}

impl PriceStepMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceStepMode::Auto => "AUTO",
            PriceStepMode::Manual => "MANUAL",
        }
    }
}

/// Discrete risk classification of a bulk order plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ty, $label:literal, [$($text:literal => $variant:expr),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(format!("unknown {}: {}", $label, other)),
                }
            }
        }
    };
}

display_and_parse!(Side, "side", ["BUY" => Side::Buy, "SELL" => Side::Sell]);
display_and_parse!(DistributionMode, "distribution mode", [
    "EQUAL" => DistributionMode::Equal,
    "PROGRESSIVE" => DistributionMode::Progressive,
    "REGRESSIVE" => DistributionMode::Regressive,
]);
display_and_parse!(PriceStepMode, "price step mode", [
    "AUTO" => PriceStepMode::Auto,
    "MANUAL" => PriceStepMode::Manual,
]);
display_and_parse!(RiskLevel, "risk level", [
    "LOW" => RiskLevel::Low,
    "MEDIUM" => RiskLevel::Medium,
    "HIGH" => RiskLevel::High,
]);

// ---------------------------------------------------------------------------
// Bulk order request
// ---------------------------------------------------------------------------

/// Inclusive price interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> Decimal {
        self.max - self.min
    }
}

/// Parameters of a layered (grid) order placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOrderRequest {
    pub symbol: String,
    pub side: Side,
    pub price_range: PriceRange,
    /// Number of orders requested (valid range 1..=50).
    pub order_count: u32,
    pub volume_per_order: Decimal,
    #[serde(default)]
    pub distribution: DistributionMode,
    #[serde(default)]
    pub price_step: PriceStepMode,
    /// Required when `price_step` is `Manual`.
    #[serde(default)]
    pub manual_step: Option<Decimal>,
}

impl BulkOrderRequest {
    /// An evenly spaced, equally weighted ladder.
    pub fn new(
        symbol: &str,
        side: Side,
        price_range: PriceRange,
        order_count: u32,
        volume_per_order: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            price_range,
            order_count,
            volume_per_order,
            distribution: DistributionMode::Equal,
            price_step: PriceStepMode::Auto,
            manual_step: None,
        }
    }

    pub fn with_distribution(mut self, distribution: DistributionMode) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_manual_step(mut self, step: Decimal) -> Self {
        self.price_step = PriceStepMode::Manual;
        self.manual_step = Some(step);
        self
    }
}

// ---------------------------------------------------------------------------
// Calculation output
// ---------------------------------------------------------------------------

/// One order of a calculated ladder. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedOrder {
    pub id: String,
    pub symbol: String,
    pub side: Side,
    /// Rounded to 5 decimal places.
    pub price: Decimal,
    pub volume: Decimal,
    pub expected_margin: Decimal,
}

/// Aggregate view over a set of calculated orders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderSummary {
    pub total_orders: usize,
    pub total_volume: Decimal,
    pub total_margin: Decimal,
    pub average_price: Decimal,
    /// Observed min/max of the generated prices.
    pub price_range: PriceRange,
    pub risk_level: RiskLevel,
}

impl OrderSummary {
    pub fn is_empty(&self) -> bool {
        self.total_orders == 0
    }
}

/// Orders plus their summary, produced together from one validated request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOrderPlan {
    pub request: BulkOrderRequest,
    pub orders: Vec<CalculatedOrder>,
    pub summary: OrderSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(
            serde_json::to_string(&DistributionMode::Progressive).unwrap(),
            "\"PROGRESSIVE\""
        );
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("sell".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!(" Manual ".parse::<PriceStepMode>().unwrap(), PriceStepMode::Manual);
        assert!("sideways".parse::<Side>().is_err());
    }

    #[test]
    fn test_request_builder() {
        let range = PriceRange::new(dec!(1.0), dec!(1.1));
        let req = BulkOrderRequest::new("EURUSD", Side::Buy, range, 3, dec!(0.1))
            .with_manual_step(dec!(0.05));
        assert_eq!(req.price_step, PriceStepMode::Manual);
        assert_eq!(req.manual_step, Some(dec!(0.05)));
        assert_eq!(req.price_range.width(), dec!(0.1));
    }

    #[test]
    fn test_request_defaults_when_omitted() {
        let req: BulkOrderRequest = from_json(
            r#"{"symbol":"XAUUSD","side":"SELL","price_range":{"min":"1900","max":"1950"},
                "order_count":4,"volume_per_order":"0.02"}"#,
        );
        assert_eq!(req.distribution, DistributionMode::Equal);
        assert_eq!(req.price_step, PriceStepMode::Auto);
        assert!(req.manual_step.is_none());
    }

    fn from_json(json: &str) -> BulkOrderRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_risk_levels_are_ordered() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert_eq!(RiskLevel::default(), RiskLevel::Low);
    }
}
