use crate::domain::values::display::{format_change, format_compact, format_currency};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
    /// Absolute change in dollars.
    pub change: f64,
    /// Signed percentage change.
    pub change_percent: f64,
    pub volume: u64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
}

impl StockQuote {
    /// `(symbol, price, change %, volume)` ready for display.
    pub fn display_fields(&self) -> (String, String, String, String) {
        (
            self.symbol.clone(),
            format_currency(self.price),
            format_change(self.change_percent),
            format_compact(self.volume as f64),
        )
    }
}
