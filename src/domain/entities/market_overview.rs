use crate::domain::entities::asset_quote::AssetQuote;
use crate::domain::entities::stock_quote::StockQuote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForexQuote {
    /// e.g. `EUR/USD`
    pub pair: String,
    pub price: f64,
    /// Absolute move in the quote currency, not a percentage.
    pub change: f64,
}

impl ForexQuote {
    /// `(pair, rate, change)` with four decimals, the precision rates are quoted in.
    pub fn display_fields(&self) -> (String, String, String) {
        (
            self.pair.clone(),
            format!("{:.4}", self.price),
            format!("{:+.4}", self.change),
        )
    }
}

/// Crypto, stocks and forex in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub crypto: Vec<AssetQuote>,
    pub stocks: Vec<StockQuote>,
    pub forex: Vec<ForexQuote>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forex_change_is_absolute() {
        let fx = ForexQuote {
            pair: "EUR/USD".into(),
            price: 1.0875,
            change: 0.002,
        };
        assert_eq!(
            fx.display_fields(),
            ("EUR/USD".to_string(), "1.0875".to_string(), "+0.0020".to_string())
        );
    }
}
