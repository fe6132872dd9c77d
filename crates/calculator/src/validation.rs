use rust_decimal::Decimal;
use tradedesk_core::*;

use crate::ladder::heaviest_volume;
use crate::margin::estimate_margin;

/// Largest ladder the console will build.
pub const MAX_ORDER_COUNT: u32 = 50;

/// Error returned by [`crate::plan`] when a request fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// Check a request before calculation.
///
/// Returns every problem found, in a fixed order; an empty list means the
/// request is valid.
pub fn validate(request: &BulkOrderRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if request.symbol.trim().is_empty() {
        errors.push("Symbol is required".to_string());
    }

    if request.price_range.min >= request.price_range.max {
        errors.push("Minimum price must be less than maximum price".to_string());
    }

    if request.order_count < 1 || request.order_count > MAX_ORDER_COUNT {
        errors.push(format!("Order count must be between 1 and {}", MAX_ORDER_COUNT));
    }

    if request.volume_per_order <= Decimal::ZERO {
        errors.push("Volume per order must be greater than 0".to_string());
    }

    if request.price_step == PriceStepMode::Manual
        && request.manual_step.map_or(true, |step| step <= Decimal::ZERO)
    {
        errors.push("Manual step must be greater than 0".to_string());
    }

    if errors.is_empty() && fits(request).is_none() {
        errors.push("Price range and volume are too large to calculate".to_string());
    }

    errors
}

/// `Some` when every per-order value and every summary total of the ladder
/// fits in a `Decimal`.
fn fits(request: &BulkOrderRequest) -> Option<()> {
    let range = request.price_range;
    let count = Decimal::from(request.order_count);
    let magnitude = range.min.abs().max(range.max.abs());

    range.max.checked_sub(range.min)?;
    let heaviest = heaviest_volume(request.volume_per_order, request.distribution)?;
    heaviest.checked_mul(count)?;
    magnitude.checked_mul(count)?;
    estimate_margin(magnitude, heaviest)?.checked_mul(count)?;
    Some(())
}
