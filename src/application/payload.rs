use crate::domain::entities::ai_answer::AiAnswer;
use crate::domain::entities::asset_quote::{AssetQuote, BitcoinSnapshot};
use crate::domain::entities::market_overview::MarketOverview;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_chart::PriceChart;
use crate::domain::entities::search_result::SearchPayload;
use crate::domain::entities::stock_quote::StockQuote;
use crate::domain::error::ClientError;
use crate::domain::ports::market_api::{
    MarketApi, DEFAULT_CHART_DAYS, DEFAULT_CRYPTO_LIMIT, DEFAULT_NEWS_LIMIT,
};
use crate::domain::values::request_descriptor::RequestDescriptor;
use crate::domain::values::resource::Resource;
use serde::Serialize;

/// Any value the cache can hold, one variant per resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Answer(AiAnswer),
    Quotes(Vec<AssetQuote>),
    Bitcoin(BitcoinSnapshot),
    News(Vec<NewsItem>),
    Search(SearchPayload),
    Health(bool),
    Stocks(Vec<StockQuote>),
    Overview(MarketOverview),
    Chart(PriceChart),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Answer(_) => "answer",
            Payload::Quotes(_) => "quotes",
            Payload::Bitcoin(_) => "bitcoin",
            Payload::News(_) => "news",
            Payload::Search(_) => "search",
            Payload::Health(_) => "health",
            Payload::Stocks(_) => "stocks",
            Payload::Overview(_) => "overview",
            Payload::Chart(_) => "chart",
        }
    }

    pub fn as_answer(&self) -> Option<&AiAnswer> {
        match self {
            Payload::Answer(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_quotes(&self) -> Option<&[AssetQuote]> {
        match self {
            Payload::Quotes(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_bitcoin(&self) -> Option<&BitcoinSnapshot> {
        match self {
            Payload::Bitcoin(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_news(&self) -> Option<&[NewsItem]> {
        match self {
            Payload::News(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_search(&self) -> Option<&SearchPayload> {
        match self {
            Payload::Search(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_health(&self) -> Option<bool> {
        match self {
            Payload::Health(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_stocks(&self) -> Option<&[StockQuote]> {
        match self {
            Payload::Stocks(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_overview(&self) -> Option<&MarketOverview> {
        match self {
            Payload::Overview(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_chart(&self) -> Option<&PriceChart> {
        match self {
            Payload::Chart(c) => Some(c),
            _ => None,
        }
    }
}

/// Route a descriptor to the matching API operation.
pub async fn fetch_payload(api: &dyn MarketApi, descriptor: &RequestDescriptor) -> Result<Payload, ClientError> {
    match descriptor.resource() {
        Resource::AiAsk => {
            let query = descriptor.required_param("query")?;
            api.ask_question(query).await.map(Payload::Answer)
        }
        Resource::CryptoList => {
            let limit = descriptor.param_or("limit", DEFAULT_CRYPTO_LIMIT)?;
            api.get_crypto_data(limit).await.map(Payload::Quotes)
        }
        Resource::CryptoSingle => api.get_bitcoin_price().await.map(Payload::Bitcoin),
        Resource::News => {
            let query = descriptor.param("query").unwrap_or("");
            let limit = descriptor.param_or("limit", DEFAULT_NEWS_LIMIT)?;
            api.get_financial_news(query, limit).await.map(Payload::News)
        }
        Resource::Search => {
            let query = descriptor.required_param("query")?;
            api.search_finance(query).await.map(Payload::Search)
        }
        Resource::Health => api.health_check().await.map(Payload::Health),
        Resource::StockList => api.get_stock_data().await.map(Payload::Stocks),
        Resource::MarketOverview => api.get_market_overview().await.map(Payload::Overview),
        Resource::CryptoChart => {
            let coin_id = descriptor.required_param("coin_id")?;
            let days = descriptor.param_or("days", DEFAULT_CHART_DAYS)?;
            api.get_crypto_chart(coin_id, days).await.map(Payload::Chart)
        }
    }
}
