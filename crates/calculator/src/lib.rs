//! Bulk order calculator.
//!
//! Turns a [`BulkOrderRequest`] into a ladder of [`CalculatedOrder`]s and an
//! [`OrderSummary`]. Everything here is pure: no I/O, no shared state, and
//! fresh output on every call, so it is safe to recompute on every input
//! change.
//!
//! Callers run [`validate`] first and only call [`calculate`] on a request
//! that produced no errors; [`plan`] does both in one step.

pub mod ladder;
pub mod margin;
pub mod summary;
pub mod validation;

pub use margin::estimate_margin;
pub use summary::summarize;
pub use validation::{validate, ValidationErrors, MAX_ORDER_COUNT};

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;
use tradedesk_core::*;

/// Decimal places kept on order prices.
pub const PRICE_DECIMALS: u32 = 5;

/// Round a price for display and submission (half away from zero).
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Build the order ladder for a validated request, stamping ids with the
/// current time.
pub fn calculate(request: &BulkOrderRequest) -> Vec<CalculatedOrder> {
    calculate_at(request, Utc::now())
}

/// Build the order ladder with ids stamped from `batch_time`.
///
/// Ids have the form `bulk_<epoch millis>_<index>`. Margin is estimated from
/// the unrounded ladder price; the stored price is rounded. The ladder ends at
/// the first order whose margin is not representable, which [`validate`]
/// rules out for accepted requests.
pub fn calculate_at(request: &BulkOrderRequest, batch_time: DateTime<Utc>) -> Vec<CalculatedOrder> {
    let batch = batch_time.timestamp_millis();
    let prices = ladder::prices(request);
    let volumes = ladder::volumes(
        request.order_count as usize,
        request.volume_per_order,
        request.distribution,
    );

    let orders: Vec<CalculatedOrder> = prices
        .iter()
        .zip(volumes)
        .enumerate()
        .map_while(|(index, (&price, volume))| {
            Some(CalculatedOrder {
                id: format!("bulk_{}_{}", batch, index),
                symbol: request.symbol.clone(),
                side: request.side,
                price: round_price(price),
                volume,
                expected_margin: estimate_margin(price, volume)?,
            })
        })
        .collect();

    debug!(
        symbol = %request.symbol,
        requested = request.order_count,
        generated = orders.len(),
        distribution = %request.distribution,
        step = %request.price_step,
        "Calculated bulk order ladder"
    );

    orders
}

/// Validate, calculate and summarize in one step.
pub fn plan(request: &BulkOrderRequest) -> Result<BulkOrderPlan, ValidationErrors> {
    let errors = validate(request);
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }
    let orders = calculate(request);
    let summary = summarize(&orders);
    Ok(BulkOrderPlan {
        request: request.clone(),
        orders,
        summary,
    })
}
