pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::payload::Payload;
use crate::application::query_cache::{QueryCache, Subscription};
use crate::config::{CacheConfig, ClientConfig};
use crate::domain::entities::ai_answer::AiAnswer;
use crate::domain::entities::asset_quote::{AssetQuote, BitcoinSnapshot};
use crate::domain::entities::market_overview::MarketOverview;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_chart::PriceChart;
use crate::domain::entities::search_result::SearchPayload;
use crate::domain::entities::stock_quote::StockQuote;
use crate::domain::error::ClientError;
use crate::domain::ports::market_api::MarketApi;
use crate::domain::values::request_descriptor::RequestDescriptor;
use crate::infrastructure::http::client::ApiClient;
use std::sync::Arc;
use std::time::Duration;

/// Entry point: the HTTP client with the query cache in front of it.
pub struct Finboard {
    api: Arc<dyn MarketApi>,
    cache: QueryCache,
}

impl Finboard {
    /// Configuration from `FINBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?, CacheConfig::from_env()?)
    }

    pub fn new(client: ClientConfig, cache: CacheConfig) -> Result<Self, ClientError> {
        tracing::debug!(base_url = %client.base_url, timeout = ?client.timeout, "configuring client");
        let api: Arc<dyn MarketApi> = Arc::new(ApiClient::new(&client)?);
        Ok(Self::with_api(api, cache))
    }

    /// Use any `MarketApi` implementation, e.g. a test double.
    pub fn with_api(api: Arc<dyn MarketApi>, cache: CacheConfig) -> Self {
        let cache = QueryCache::new(api.clone(), cache);
        Self { api, cache }
    }

    pub fn api(&self) -> &dyn MarketApi {
        self.api.as_ref()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // Cached reads

    pub async fn ask(&self, query: &str) -> Result<AiAnswer, ClientError> {
        match self.cache.fetch(&RequestDescriptor::ask(query)).await? {
            Payload::Answer(answer) => Ok(answer),
            other => Err(unexpected("answer", &other)),
        }
    }

    pub async fn crypto(&self, limit: usize) -> Result<Vec<AssetQuote>, ClientError> {
        match self.cache.fetch(&RequestDescriptor::crypto_list(limit)).await? {
            Payload::Quotes(quotes) => Ok(quotes),
            other => Err(unexpected("quotes", &other)),
        }
    }

    pub async fn bitcoin(&self) -> Result<BitcoinSnapshot, ClientError> {
        match self.cache.fetch(&RequestDescriptor::bitcoin()).await? {
            Payload::Bitcoin(snapshot) => Ok(snapshot),
            other => Err(unexpected("bitcoin", &other)),
        }
    }

    pub async fn news(&self, query: &str, limit: usize) -> Result<Vec<NewsItem>, ClientError> {
        match self.cache.fetch(&RequestDescriptor::news(query, limit)).await? {
            Payload::News(items) => Ok(items),
            other => Err(unexpected("news", &other)),
        }
    }

    pub async fn search(&self, query: &str) -> Result<SearchPayload, ClientError> {
        match self.cache.fetch(&RequestDescriptor::search(query)).await? {
            Payload::Search(payload) => Ok(payload),
            other => Err(unexpected("search", &other)),
        }
    }

    /// Uncached: a health probe should always reach the backend.
    pub async fn health(&self) -> Result<bool, ClientError> {
        self.api.health_check().await
    }

    pub async fn stocks(&self) -> Result<Vec<StockQuote>, ClientError> {
        match self.cache.fetch(&RequestDescriptor::stock_list()).await? {
            Payload::Stocks(stocks) => Ok(stocks),
            other => Err(unexpected("stocks", &other)),
        }
    }

    pub async fn market_overview(&self) -> Result<MarketOverview, ClientError> {
        match self.cache.fetch(&RequestDescriptor::market_overview()).await? {
            Payload::Overview(overview) => Ok(overview),
            other => Err(unexpected("overview", &other)),
        }
    }

    pub async fn chart(&self, coin_id: &str, days: u32) -> Result<PriceChart, ClientError> {
        match self.cache.fetch(&RequestDescriptor::crypto_chart(coin_id, days)).await? {
            Payload::Chart(chart) => Ok(chart),
            other => Err(unexpected("chart", &other)),
        }
    }

    /// Live crypto list, refreshed every `interval` while the subscription lives.
    pub fn watch_crypto(&self, limit: usize, interval: Duration) -> Subscription {
        self.cache
            .subscribe(&RequestDescriptor::crypto_list(limit), Some(interval))
    }
}

fn unexpected(expected: &str, got: &Payload) -> ClientError {
    ClientError::MalformedResponse(format!("expected {expected} payload, got {}", got.kind()))
}
