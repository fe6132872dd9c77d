//! Price ladder and volume weighting.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tradedesk_core::*;

/// Extra weight given to the heaviest order of a PROGRESSIVE or REGRESSIVE
/// ladder (the heaviest order carries 1.5x the base volume).
pub const WEIGHT_SPAN: Decimal = dec!(0.5);

/// Generate the unrounded price ladder for a request.
///
/// AUTO yields exactly `order_count` evenly spaced prices from `min` to `max`
/// inclusive. MANUAL walks up from `min` by `manual_step` and may yield fewer
/// prices than requested once `max` is passed.
pub fn prices(request: &BulkOrderRequest) -> Vec<Decimal> {
    let range = request.price_range;
    let count = request.order_count as usize;

    match request.price_step {
        PriceStepMode::Auto => auto_prices(range, count),
        PriceStepMode::Manual => match request.manual_step {
            Some(step) if step > Decimal::ZERO => manual_prices(range, count, step),
            _ => Vec::new(),
        },
    }
}

fn auto_prices(range: PriceRange, count: usize) -> Vec<Decimal> {
    if count == 1 {
        return vec![range.min];
    }
    let Some(width) = range.max.checked_sub(range.min) else {
        return Vec::new();
    };
    let intervals = Decimal::from(count - 1);
    (0..count)
        .map_while(|i| {
            if i == count - 1 {
                return Some(range.max);
            }
            range.min.checked_add(offset(Decimal::from(i), width, intervals)?)
        })
        .collect()
}

/// `i * width / intervals`, dividing first when the product does not fit.
fn offset(i: Decimal, width: Decimal, intervals: Decimal) -> Option<Decimal> {
    match i.checked_mul(width) {
        Some(product) => product.checked_div(intervals),
        None => width.checked_div(intervals)?.checked_mul(i),
    }
}

fn manual_prices(range: PriceRange, count: usize, step: Decimal) -> Vec<Decimal> {
    let mut prices = Vec::with_capacity(count);
    let mut current = Some(range.min);
    while let Some(price) = current {
        if price > range.max || prices.len() >= count {
            break;
        }
        prices.push(price);
        current = price.checked_add(step);
    }
    prices
}

/// Volume for each of the `count` requested orders under `mode`.
///
/// Stops early if a weighted volume is not representable.
pub fn volumes(count: usize, volume_per_order: Decimal, mode: DistributionMode) -> Vec<Decimal> {
    (0..count)
        .map_while(|i| {
            let factor = match mode {
                DistributionMode::Equal => Decimal::ONE,
                DistributionMode::Progressive => weight(count - 1 - i, count),
                DistributionMode::Regressive => weight(i, count),
            };
            volume_per_order.checked_mul(factor)
        })
        .collect()
}

/// Largest volume any order of the ladder can carry.
pub fn heaviest_volume(volume_per_order: Decimal, mode: DistributionMode) -> Option<Decimal> {
    match mode {
        DistributionMode::Equal => Some(volume_per_order),
        _ => volume_per_order.checked_mul(Decimal::ONE + WEIGHT_SPAN),
    }
}

/// `1 + 0.5 * k / (count - 1)`, or 1 for a single-order ladder.
fn weight(k: usize, count: usize) -> Decimal {
    if count <= 1 {
        return Decimal::ONE;
    }
    Decimal::ONE + WEIGHT_SPAN * Decimal::from(k) / Decimal::from(count - 1)
}
