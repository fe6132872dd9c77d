use anyhow::{bail, Context, Result};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tradedesk_core::*;

/// Bulk order parameters, from flags or a TOML file.
#[derive(Debug, Clone, Args)]
pub struct LadderArgs {
    /// TOML file holding a full bulk order request
    #[arg(
        short,
        long,
        conflicts_with_all = [
            "symbol", "side", "min", "max", "count", "volume", "distribution", "step",
        ]
    )]
    pub file: Option<PathBuf>,

    /// Instrument symbol (e.g. "EURUSD")
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// BUY or SELL
    #[arg(long)]
    pub side: Option<Side>,

    /// Lowest ladder price
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Highest ladder price
    #[arg(long)]
    pub max: Option<Decimal>,

    /// Number of orders (1-50)
    #[arg(short = 'n', long, default_value = "5")]
    pub count: u32,

    /// Base volume per order, in lots
    #[arg(short, long, default_value = "0.01")]
    pub volume: Decimal,

    /// EQUAL, PROGRESSIVE or REGRESSIVE
    #[arg(short, long, default_value = "EQUAL")]
    pub distribution: DistributionMode,

    /// Fixed price step; switches the ladder to MANUAL stepping
    #[arg(long)]
    pub step: Option<Decimal>,
}

impl LadderArgs {
    pub fn to_request(&self) -> Result<BulkOrderRequest> {
        if let Some(path) = &self.file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read order file {}", path.display()))?;
            return parse_request(&text)
                .with_context(|| format!("Invalid order file {}", path.display()));
        }

        let (Some(symbol), Some(side), Some(min), Some(max)) =
            (&self.symbol, self.side, self.min, self.max)
        else {
            bail!("--symbol, --side, --min and --max are required unless --file is given");
        };

        let mut request = BulkOrderRequest::new(
            symbol,
            side,
            PriceRange::new(min, max),
            self.count,
            self.volume,
        )
        .with_distribution(self.distribution);
        if let Some(step) = self.step {
            request = request.with_manual_step(step);
        }
        Ok(request)
    }
}

pub fn parse_request(text: &str) -> Result<BulkOrderRequest> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flags() -> LadderArgs {
        LadderArgs {
            file: None,
            symbol: Some("EURUSD".to_string()),
            side: Some(Side::Buy),
            min: Some(dec!(1.10000)),
            max: Some(dec!(1.10010)),
            count: 5,
            volume: dec!(0.01),
            distribution: DistributionMode::Equal,
            step: None,
        }
    }

    #[test]
    fn test_request_from_flags() {
        let request = flags().to_request().unwrap();
        assert_eq!(request.symbol, "EURUSD");
        assert_eq!(request.price_step, PriceStepMode::Auto);
        assert_eq!(request.price_range.width(), dec!(0.00010));
    }

    #[test]
    fn test_step_switches_to_manual() {
        let mut args = flags();
        args.step = Some(dec!(0.00002));
        let request = args.to_request().unwrap();
        assert_eq!(request.price_step, PriceStepMode::Manual);
        assert_eq!(request.manual_step, Some(dec!(0.00002)));
    }

    #[test]
    fn test_missing_flags_are_reported() {
        let mut args = flags();
        args.max = None;
        assert!(args.to_request().is_err());
    }

    #[test]
    fn test_request_from_toml() {
        let request = parse_request(
            r#"
            symbol = "XAUUSD"
            side = "SELL"
            order_count = 4
            volume_per_order = "0.02"
            distribution = "REGRESSIVE"
            price_step = "MANUAL"
            manual_step = "2.5"

            [price_range]
            min = "1900"
            max = "1910"
            "#,
        )
        .unwrap();
        assert_eq!(request.side, Side::Sell);
        assert_eq!(request.order_count, 4);
        assert_eq!(request.volume_per_order, dec!(0.02));
        assert_eq!(request.distribution, DistributionMode::Regressive);
        assert_eq!(request.manual_step, Some(dec!(2.5)));
        assert_eq!(request.price_range, PriceRange::new(dec!(1900), dec!(1910)));
    }
}
