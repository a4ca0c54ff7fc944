//! Shared test helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use finboard::domain::entities::ai_answer::{AiAnswer, SourceRef};
use finboard::domain::entities::asset_quote::{AssetQuote, BitcoinSnapshot};
use finboard::domain::entities::market_overview::MarketOverview;
use finboard::domain::entities::news_item::NewsItem;
use finboard::domain::entities::price_chart::PriceChart;
use finboard::domain::entities::search_result::SearchPayload;
use finboard::domain::entities::stock_quote::StockQuote;
use finboard::domain::error::ClientError;
use finboard::domain::ports::market_api::MarketApi;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn quote(symbol: &str, price: f64) -> AssetQuote {
    AssetQuote {
        symbol: symbol.to_string(),
        name: symbol.to_lowercase(),
        price,
        change_24h: 0.0,
        volume_24h: 1_000.0,
        market_cap: 1_000_000.0,
        market_cap_rank: None,
    }
}

pub fn upstream(status: u16) -> ClientError {
    ClientError::Upstream {
        status,
        status_text: "Internal Server Error".into(),
    }
}

/// One scripted crypto-list response.
pub struct Step {
    pub delay: Duration,
    pub result: Result<Vec<AssetQuote>, ClientError>,
}

impl Step {
    pub fn ok(price: f64) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(vec![quote("BTC", price)]),
        }
    }

    pub fn err(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(upstream(status)),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// `MarketApi` double. Crypto-list calls consume the script in order; once it
/// runs out, call `n` answers after `latency` with a BTC quote priced `n`.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<VecDeque<Step>>,
    crypto_calls: AtomicUsize,
    latency: Duration,
}

impl ScriptedApi {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            crypto_calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn crypto_calls(&self) -> usize {
        self.crypto_calls.load(Ordering::SeqCst)
    }
}

fn not_scripted(what: &str) -> ClientError {
    ClientError::InvalidInput(format!("{what} not scripted"))
}

#[async_trait]
impl MarketApi for ScriptedApi {
    async fn ask_question(&self, query: &str) -> Result<AiAnswer, ClientError> {
        Ok(AiAnswer {
            summary: format!("**{query}**"),
            key_facts: vec![],
            sources: vec![SourceRef {
                ordinal: 1,
                title: "Desk".into(),
                url: "https://example.com".into(),
            }],
        })
    }

    async fn get_crypto_data(&self, limit: usize) -> Result<Vec<AssetQuote>, ClientError> {
        let n = self.crypto_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.result.map(|mut quotes| {
                    quotes.truncate(limit);
                    quotes
                })
            }
            None => {
                if !self.latency.is_zero() {
                    tokio::time::sleep(self.latency).await;
                }
                Ok(vec![quote("BTC", n as f64)])
            }
        }
    }

    async fn get_bitcoin_price(&self) -> Result<BitcoinSnapshot, ClientError> {
        Ok(BitcoinSnapshot {
            price: 43_250.0,
            change_24h: 2.5,
            volume_24h: 28_500_000_000.0,
            market_cap: 845_000_000_000.0,
        })
    }

    async fn get_financial_news(&self, _query: &str, _limit: usize) -> Result<Vec<NewsItem>, ClientError> {
        Err(not_scripted("news"))
    }

    async fn search_finance(&self, _query: &str) -> Result<SearchPayload, ClientError> {
        Err(not_scripted("search"))
    }

    async fn health_check(&self) -> Result<bool, ClientError> {
        Ok(true)
    }

    async fn get_stock_data(&self) -> Result<Vec<StockQuote>, ClientError> {
        Err(not_scripted("stocks"))
    }

    async fn get_market_overview(&self) -> Result<MarketOverview, ClientError> {
        Err(not_scripted("market overview"))
    }

    async fn get_crypto_chart(&self, _coin_id: &str, _days: u32) -> Result<PriceChart, ClientError> {
        Err(not_scripted("chart"))
    }
}
