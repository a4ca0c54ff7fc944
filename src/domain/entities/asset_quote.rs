use crate::domain::values::display::{format_change, format_compact, format_currency};
use serde::{Deserialize, Serialize};

/// One tradable instrument at a point in time, normalized from whatever the
/// provider sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetQuote {
    /// Uppercase ticker, unique within one batch.
    pub symbol: String,
    pub name: String,
    pub price: f64,
    /// Signed percentage over the last 24 hours.
    pub change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub market_cap_rank: Option<u32>,
}

impl AssetQuote {
    pub fn to_row(&self) -> QuoteRow {
        QuoteRow {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            price: format_currency(self.price),
            change: format_change(self.change_24h),
            volume: format_compact(self.volume_24h),
            market_cap: format_compact(self.market_cap),
        }
    }
}

/// Display-ready strings for one quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRow {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub volume: String,
    pub market_cap: String,
}

/// Bitcoin only; no rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinSnapshot {
    pub price: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
}

impl BitcoinSnapshot {
    pub const SYMBOL: &'static str = "BTC";

    pub fn to_row(&self) -> QuoteRow {
        QuoteRow {
            symbol: Self::SYMBOL.to_string(),
            name: "Bitcoin".to_string(),
            price: format_currency(self.price),
            change: format_change(self.change_24h),
            volume: format_compact(self.volume_24h),
            market_cap: format_compact(self.market_cap),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_formatting() {
        let q = AssetQuote {
            symbol: "BTC".into(),
            name: "Bitcoin".into(),
            price: 43250.0,
            change_24h: 2.3,
            volume_24h: 28_500_000_000.0,
            market_cap: 845_000_000_000.0,
            market_cap_rank: Some(1),
        };
        let row = q.to_row();
        assert_eq!(row.price, "$43,250.00");
        assert_eq!(row.change, "+2.30%");
        assert_eq!(row.volume, "29B");
        assert_eq!(row.market_cap, "845B");
    }
}
