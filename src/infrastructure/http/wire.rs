//! Raw backend response shapes and their conversion into domain entities.
//!
//! The backend and its mock data disagree on field names (the 24h change is
//! `price_chg`, `price_change_24h`, `change` or `change_24h` depending on the
//! route), so the wire types accept every spelling and the conversions emit
//! the one canonical shape.

use crate::domain::entities::ai_answer::{AiAnswer, KeyFact};
use crate::domain::entities::asset_quote::{AssetQuote, BitcoinSnapshot};
use crate::domain::entities::market_overview::{ForexQuote, MarketOverview};
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_chart::{PriceChart, Series};
use crate::domain::entities::search_result::{SearchHit, SearchPayload};
use crate::domain::entities::stock_quote::StockQuote;
use crate::domain::error::ClientError;
use crate::domain::values::display::normalize_change;
use crate::domain::values::polarity::Polarity;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;

/// Lists arrive either bare or wrapped as `{ "data": [...] }` / `{ "news": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    News { news: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Data { data } => data,
            ListEnvelope::News { news } => news,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnswerWire {
    #[serde(alias = "response")]
    summary: String,
    #[serde(default, alias = "key_data")]
    key_data: Vec<KeyFactWire>,
    #[serde(default)]
    sources: Vec<SourceWire>,
}

#[derive(Debug, Deserialize)]
struct KeyFactWire {
    label: String,
    #[serde(deserialize_with = "string_or_number")]
    value: String,
    #[serde(default)]
    positive: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SourceWire {
    title: String,
    url: String,
}

impl From<AnswerWire> for AiAnswer {
    fn from(wire: AnswerWire) -> Self {
        // Backend ids are not trusted for ordering; position defines the ordinal.
        let sources = AiAnswer::number_sources(wire.sources.into_iter().map(|s| (s.title, s.url)));
        AiAnswer {
            summary: wire.summary,
            key_facts: wire
                .key_data
                .into_iter()
                .map(|k| KeyFact {
                    label: k.label,
                    value: k.value,
                    polarity: Polarity::from(k.positive),
                })
                .collect(),
            sources,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CryptoWire {
    symbol: String,
    name: String,
    price: Option<f64>,
    #[serde(alias = "price_change_24h", alias = "price_chg", alias = "change")]
    change_24h: Option<f64>,
    volume_24h: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<u32>,
}

impl TryFrom<CryptoWire> for AssetQuote {
    type Error = ClientError;

    fn try_from(wire: CryptoWire) -> Result<Self, Self::Error> {
        let symbol = wire.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ClientError::MalformedResponse("quote without a symbol".into()));
        }
        let price = non_negative(&symbol, "price", wire.price)?;
        Ok(AssetQuote {
            price,
            change_24h: normalize_change(wire.change_24h, 0.0),
            volume_24h: non_negative(&symbol, "volume_24h", wire.volume_24h.or(Some(0.0)))?,
            market_cap: non_negative(&symbol, "market_cap", wire.market_cap.or(Some(0.0)))?,
            market_cap_rank: wire.market_cap_rank.filter(|r| *r > 0),
            name: wire.name,
            symbol,
        })
    }
}

/// Convert a batch, keeping the first `limit` records and enforcing unique
/// symbols among them.
pub(crate) fn into_quotes(wires: Vec<CryptoWire>, limit: usize) -> Result<Vec<AssetQuote>, ClientError> {
    if wires.len() > limit {
        tracing::debug!(received = wires.len(), limit, "truncating crypto batch");
    }
    let mut seen = HashSet::new();
    let mut quotes = Vec::with_capacity(wires.len().min(limit));
    for wire in wires.into_iter().take(limit) {
        let quote = AssetQuote::try_from(wire)?;
        if !seen.insert(quote.symbol.clone()) {
            return Err(ClientError::MalformedResponse(format!(
                "duplicate symbol {} in one batch",
                quote.symbol
            )));
        }
        quotes.push(quote);
    }
    Ok(quotes)
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitcoinWire {
    price: Option<f64>,
    #[serde(alias = "price_change_24h", alias = "price_chg", alias = "change")]
    change_24h: Option<f64>,
    volume_24h: Option<f64>,
    market_cap: Option<f64>,
}

impl TryFrom<BitcoinWire> for BitcoinSnapshot {
    type Error = ClientError;

    fn try_from(wire: BitcoinWire) -> Result<Self, Self::Error> {
        let symbol = BitcoinSnapshot::SYMBOL;
        Ok(BitcoinSnapshot {
            price: non_negative(symbol, "price", wire.price)?,
            change_24h: normalize_change(wire.change_24h, 0.0),
            volume_24h: non_negative(symbol, "volume_24h", wire.volume_24h.or(Some(0.0)))?,
            market_cap: non_negative(symbol, "market_cap", wire.market_cap.or(Some(0.0)))?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewsWire {
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: Option<NewsSourceWire>,
    #[serde(default, alias = "publishedAt")]
    published_at: Option<String>,
}

/// NewsAPI nests the publisher as `{ "name": ... }`; the backend flattens it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NewsSourceWire {
    Name(String),
    Object { name: Option<String> },
}

impl From<NewsWire> for NewsItem {
    fn from(wire: NewsWire) -> Self {
        let source = wire.source.and_then(|s| match s {
            NewsSourceWire::Name(name) => Some(name),
            NewsSourceWire::Object { name } => name,
        });
        NewsItem {
            title: wire.title,
            url: wire.url,
            description: wire.description.filter(|d| !d.is_empty()),
            source: source.filter(|s| !s.is_empty()),
            published_at: wire.published_at.filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchWire {
    Bare(Vec<SearchHitWire>),
    Wrapped {
        #[serde(default)]
        query: Option<String>,
        #[serde(alias = "data")]
        results: Vec<SearchHitWire>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHitWire {
    title: String,
    url: String,
    #[serde(default, alias = "description")]
    snippet: Option<String>,
}

impl SearchWire {
    pub(crate) fn into_payload(self, requested: &str) -> SearchPayload {
        let (query, hits) = match self {
            SearchWire::Bare(hits) => (None, hits),
            SearchWire::Wrapped { query, results } => (query, results),
        };
        SearchPayload {
            query: query.unwrap_or_else(|| requested.to_string()),
            results: hits
                .into_iter()
                .map(|h| SearchHit {
                    title: h.title,
                    url: h.url,
                    snippet: h.snippet,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthWire {
    status: String,
}

impl HealthWire {
    pub(crate) fn is_healthy(&self) -> bool {
        matches!(self.status.to_lowercase().as_str(), "healthy" | "ok" | "up")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StockWire {
    symbol: String,
    #[serde(deserialize_with = "lenient_f64")]
    price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    change: f64,
    /// `"1.25%"`, `"1.25"` or `1.25`.
    #[serde(default, deserialize_with = "lenient_f64")]
    change_percent: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    volume: f64,
    high: Option<f64>,
    low: Option<f64>,
    open: Option<f64>,
}

impl TryFrom<StockWire> for StockQuote {
    type Error = ClientError;

    fn try_from(wire: StockWire) -> Result<Self, Self::Error> {
        let symbol = wire.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ClientError::MalformedResponse("stock quote without a symbol".into()));
        }
        let price = non_negative(&symbol, "price", Some(wire.price))?;
        let volume = non_negative(&symbol, "volume", Some(wire.volume))?;
        Ok(StockQuote {
            symbol,
            price,
            change: wire.change,
            change_percent: normalize_change(Some(wire.change_percent), 0.0),
            volume: volume.round() as u64,
            // Alpha Vantage reports missing extremes as 0.
            high: wire.high.filter(|v| *v > 0.0),
            low: wire.low.filter(|v| *v > 0.0),
            open: wire.open.filter(|v| *v > 0.0),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarketOverviewWire {
    #[serde(default)]
    crypto: Vec<CryptoWire>,
    #[serde(default)]
    stocks: Vec<StockWire>,
    #[serde(default)]
    forex: Vec<ForexQuote>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl TryFrom<MarketOverviewWire> for MarketOverview {
    type Error = ClientError;

    fn try_from(wire: MarketOverviewWire) -> Result<Self, Self::Error> {
        let crypto_len = wire.crypto.len();
        Ok(MarketOverview {
            crypto: into_quotes(wire.crypto, crypto_len)?,
            stocks: wire
                .stocks
                .into_iter()
                .map(StockQuote::try_from)
                .collect::<Result<_, _>>()?,
            forex: wire.forex,
            timestamp: wire.timestamp.as_deref().and_then(parse_timestamp),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartWire {
    symbol: String,
    days: u32,
    prices: Vec<[f64; 2]>,
    #[serde(default)]
    market_caps: Vec<[f64; 2]>,
    #[serde(default)]
    total_volumes: Vec<[f64; 2]>,
}

impl From<ChartWire> for PriceChart {
    fn from(wire: ChartWire) -> Self {
        let series = |points: Vec<[f64; 2]>| -> Series { points.into_iter().map(|[t, v]| (t as i64, v)).collect() };
        PriceChart {
            symbol: wire.symbol,
            days: wire.days,
            prices: series(wire.prices),
            market_caps: series(wire.market_caps),
            total_volumes: series(wire.total_volumes),
        }
    }
}

fn non_negative(symbol: &str, field: &str, value: Option<f64>) -> Result<f64, ClientError> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(ClientError::MalformedResponse(format!("{symbol}: {field} must be >= 0, got {v}"))),
        None => Err(ClientError::MalformedResponse(format!("{symbol}: missing {field}"))),
    }
}

/// RFC 3339, or a naive ISO timestamp (what Python's `isoformat()` emits) taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Num(f64),
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match StringOrNumber::deserialize(d)? {
        StringOrNumber::Str(s) => s,
        StringOrNumber::Num(n) => n.to_string(),
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match StringOrNumber::deserialize(d)? {
        StringOrNumber::Num(n) => Ok(n),
        StringOrNumber::Str(s) => s
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {s:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn crypto(v: serde_json::Value) -> CryptoWire {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_every_change_spelling_lands_in_change_24h() {
        for field in ["change_24h", "price_change_24h", "price_chg", "change"] {
            let wire = crypto(json!({
                "symbol": "eth", "name": "Ethereum", "price": 2000.0,
                field: -1.2, "volume_24h": 1.0, "market_cap": 2.0
            }));
            let quote = AssetQuote::try_from(wire).unwrap();
            assert_eq!(quote.change_24h, -1.2, "field {field}");
            assert_eq!(quote.symbol, "ETH");
        }
    }

    #[test]
    fn test_null_change_defaults_to_zero() {
        let wire = crypto(json!({
            "symbol": "BTC", "name": "Bitcoin", "price": 1.0, "price_chg": null
        }));
        let quote = AssetQuote::try_from(wire).unwrap();
        assert_eq!(quote.change_24h, 0.0);
        assert_eq!(quote.volume_24h, 0.0);
        assert_eq!(quote.market_cap_rank, None);
    }

    #[test]
    fn test_missing_price_is_malformed() {
        let wire = crypto(json!({"symbol": "BTC", "name": "Bitcoin"}));
        assert!(matches!(AssetQuote::try_from(wire), Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn test_negative_price_is_malformed() {
        let wire = crypto(json!({"symbol": "BTC", "name": "Bitcoin", "price": -3.0}));
        assert!(AssetQuote::try_from(wire).is_err());
    }

    #[test]
    fn test_duplicate_symbols_rejected() {
        let wires = vec![
            crypto(json!({"symbol": "btc", "name": "Bitcoin", "price": 1.0})),
            crypto(json!({"symbol": "BTC", "name": "Bitcoin", "price": 1.0})),
        ];
        assert!(matches!(into_quotes(wires, 10), Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn test_batch_truncated_to_limit() {
        let wires = (0..5)
            .map(|i| crypto(json!({"symbol": format!("C{i}"), "name": "Coin", "price": 1.0})))
            .collect();
        assert_eq!(into_quotes(wires, 3).unwrap().len(), 3);
    }

    #[test]
    fn test_duplicate_past_limit_is_ignored() {
        let wires = ["btc", "eth", "sol", "BTC"]
            .iter()
            .map(|s| crypto(json!({"symbol": s, "name": "Coin", "price": 1.0})))
            .collect();
        let symbols: Vec<String> = into_quotes(wires, 3)
            .unwrap()
            .into_iter()
            .map(|q| q.symbol)
            .collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "SOL"]);
    }

    #[test]
    fn test_envelopes() {
        let bare: ListEnvelope<u32> = serde_json::from_value(json!([1, 2])).unwrap();
        let data: ListEnvelope<u32> = serde_json::from_value(json!({"data": [1], "count": 1})).unwrap();
        let news: ListEnvelope<u32> = serde_json::from_value(json!({"news": [7]})).unwrap();
        assert_eq!(bare.into_items(), vec![1, 2]);
        assert_eq!(data.into_items(), vec![1]);
        assert_eq!(news.into_items(), vec![7]);
    }

    #[test]
    fn test_answer_accepts_backend_shape() {
        let wire: AnswerWire = serde_json::from_value(json!({
            "response": "BTC is up",
            "sources": [{"title": "Serper", "url": "#"}],
            "response_time": 1.2,
            "timestamp": "2025-01-01T00:00:00"
        }))
        .unwrap();
        let answer = AiAnswer::from(wire);
        assert_eq!(answer.summary, "BTC is up");
        assert!(answer.key_facts.is_empty());
        assert_eq!(answer.sources[0].ordinal, 1);
    }

    #[test]
    fn test_answer_polarity_and_numeric_values() {
        let wire: AnswerWire = serde_json::from_value(json!({
            "summary": "s",
            "keyData": [
                {"label": "24h Change", "value": "+2.3%", "positive": true},
                {"label": "Rank", "value": 1}
            ],
            "sources": []
        }))
        .unwrap();
        let answer = AiAnswer::from(wire);
        assert_eq!(answer.key_facts[0].polarity, Polarity::Positive);
        assert_eq!(answer.key_facts[1].polarity, Polarity::Neutral);
        assert_eq!(answer.key_facts[1].value, "1");
    }

    #[test]
    fn test_stock_percent_string() {
        let wire: StockWire = serde_json::from_value(json!({
            "symbol": "aapl", "price": 190.5, "change": 1.1,
            "change_percent": "0.58%", "volume": 1000, "high": 0.0
        }))
        .unwrap();
        let quote = StockQuote::try_from(wire).unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert!((quote.change_percent - 0.58).abs() < 1e-9);
        assert_eq!(quote.high, None);
    }

    #[test]
    fn test_news_source_shapes() {
        let flat: NewsWire = serde_json::from_value(json!({
            "title": "t", "url": "u", "source": "Reuters", "publishedAt": "2025-01-01"
        }))
        .unwrap();
        let nested: NewsWire = serde_json::from_value(json!({
            "title": "t", "url": "u", "source": {"name": "Bloomberg"}, "description": ""
        }))
        .unwrap();
        let flat = NewsItem::from(flat);
        let nested = NewsItem::from(nested);
        assert_eq!(flat.source.as_deref(), Some("Reuters"));
        assert_eq!(flat.published_at.as_deref(), Some("2025-01-01"));
        assert_eq!(nested.source.as_deref(), Some("Bloomberg"));
        assert_eq!(nested.description, None);
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2025-01-01T12:00:00Z").is_some());
        assert!(parse_timestamp("2025-01-01T12:00:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_health_status() {
        let wire: HealthWire = serde_json::from_value(json!({"status": "healthy"})).unwrap();
        assert!(wire.is_healthy());
        let wire: HealthWire = serde_json::from_value(json!({"status": "degraded"})).unwrap();
        assert!(!wire.is_healthy());
    }
}
