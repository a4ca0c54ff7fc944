//! Market API port: everything the cache layer needs from the backend.
//!
//! The HTTP client implements it for real traffic; tests plug in doubles that
//! count calls or delay responses.

use crate::domain::entities::ai_answer::AiAnswer;
use crate::domain::entities::asset_quote::{AssetQuote, BitcoinSnapshot};
use crate::domain::entities::market_overview::MarketOverview;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_chart::PriceChart;
use crate::domain::entities::search_result::SearchPayload;
use crate::domain::entities::stock_quote::StockQuote;
use crate::domain::error::ClientError;
use async_trait::async_trait;

pub const DEFAULT_CRYPTO_LIMIT: usize = 100;
pub const DEFAULT_NEWS_LIMIT: usize = 5;
pub const DEFAULT_CHART_DAYS: u32 = 30;
pub const MAX_CHART_DAYS: u32 = 365;
pub const MAX_QUERY_CHARS: usize = 500;

#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn ask_question(&self, query: &str) -> Result<AiAnswer, ClientError>;

    /// At most `limit` quotes, unique by symbol.
    async fn get_crypto_data(&self, limit: usize) -> Result<Vec<AssetQuote>, ClientError>;

    async fn get_bitcoin_price(&self) -> Result<BitcoinSnapshot, ClientError>;

    async fn get_financial_news(&self, query: &str, limit: usize) -> Result<Vec<NewsItem>, ClientError>;

    async fn search_finance(&self, query: &str) -> Result<SearchPayload, ClientError>;

    /// `true` when the backend reports itself healthy.
    async fn health_check(&self) -> Result<bool, ClientError>;

    async fn get_stock_data(&self) -> Result<Vec<StockQuote>, ClientError>;

    async fn get_market_overview(&self) -> Result<MarketOverview, ClientError>;

    async fn get_crypto_chart(&self, coin_id: &str, days: u32) -> Result<PriceChart, ClientError>;
}

/// Reject empty or oversized questions before they reach the network.
pub fn validate_query(query: &str) -> Result<&str, ClientError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidInput("query must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_QUERY_CHARS {
        return Err(ClientError::InvalidInput(format!(
            "query must be at most {MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

pub fn validate_limit(limit: usize) -> Result<usize, ClientError> {
    if limit == 0 {
        return Err(ClientError::InvalidInput("limit must be at least 1".into()));
    }
    Ok(limit)
}

pub fn validate_days(days: u32) -> Result<u32, ClientError> {
    if !(1..=MAX_CHART_DAYS).contains(&days) {
        return Err(ClientError::InvalidInput(format!(
            "days must be between 1 and {MAX_CHART_DAYS}, got {days}"
        )));
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  btc price ").unwrap(), "btc price");
        assert!(validate_query("   ").is_err());
        assert!(validate_query(&"x".repeat(MAX_QUERY_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_limit_and_days() {
        assert!(validate_limit(0).is_err());
        assert_eq!(validate_limit(3).unwrap(), 3);
        assert!(validate_days(0).is_err());
        assert!(validate_days(366).is_err());
        assert_eq!(validate_days(30).unwrap(), 30);
    }
}
