use super::wire::{
    into_quotes, AnswerWire, BitcoinWire, ChartWire, CryptoWire, HealthWire, ListEnvelope,
    MarketOverviewWire, NewsWire, SearchWire, StockWire,
};
use crate::config::ClientConfig;
use crate::domain::entities::ai_answer::AiAnswer;
use crate::domain::entities::asset_quote::{AssetQuote, BitcoinSnapshot};
use crate::domain::entities::market_overview::MarketOverview;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_chart::PriceChart;
use crate::domain::entities::search_result::SearchPayload;
use crate::domain::entities::stock_quote::StockQuote;
use crate::domain::error::ClientError;
use crate::domain::ports::market_api::{validate_days, validate_limit, validate_query, MarketApi};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// HTTP client for the finboard backend.
///
/// One method per logical resource. Every call sends a JSON content type,
/// maps transport failures to `Network`, non-2xx statuses to `Upstream` and
/// unparsable bodies to `MalformedResponse`. The client keeps no session state
/// and is cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    query: &'a str,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("finboard/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL + path + URL-encoded query parameters.
    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ClientError> {
        let url = self.url(path, query)?;
        self.send::<(), T>(Method::GET, url, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let url = self.url(path, &[])?;
        self.send(Method::POST, url, Some(body)).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        tracing::debug!(%method, %url, "request");
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await.map_err(|e| {
            let err = ClientError::from(e);
            tracing::warn!(%method, %url, error = %err, "request failed");
            err
        })?;

        let status = resp.status();
        if !status.is_success() {
            let err = ClientError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            };
            tracing::warn!(%method, %url, error = %err, "backend rejected request");
            return Err(err);
        }

        let bytes = resp.bytes().await.map_err(ClientError::from)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "unexpected response body");
            ClientError::MalformedResponse(format!("{url}: {e}"))
        })
    }
}

#[async_trait]
impl MarketApi for ApiClient {
    async fn ask_question(&self, query: &str) -> Result<AiAnswer, ClientError> {
        let query = validate_query(query)?;
        let wire: AnswerWire = self.post("/ai/ask", &AskRequest { query }).await?;
        Ok(wire.into())
    }

    async fn get_crypto_data(&self, limit: usize) -> Result<Vec<AssetQuote>, ClientError> {
        let limit = validate_limit(limit)?;
        let envelope: ListEnvelope<CryptoWire> = self.get("/crypto/data", &[("limit", limit.to_string())]).await?;
        into_quotes(envelope.into_items(), limit)
    }

    async fn get_bitcoin_price(&self) -> Result<BitcoinSnapshot, ClientError> {
        let wire: BitcoinWire = self.get("/crypto/bitcoin", &[]).await?;
        BitcoinSnapshot::try_from(wire)
    }

    async fn get_financial_news(&self, query: &str, limit: usize) -> Result<Vec<NewsItem>, ClientError> {
        let limit = validate_limit(limit)?;
        let envelope: ListEnvelope<NewsWire> = self
            .get(
                "/finance/news",
                &[("query", query.trim().to_string()), ("limit", limit.to_string())],
            )
            .await?;
        let mut items: Vec<NewsItem> = envelope.into_items().into_iter().map(NewsItem::from).collect();
        items.truncate(limit);
        Ok(items)
    }

    async fn search_finance(&self, query: &str) -> Result<SearchPayload, ClientError> {
        let query = validate_query(query)?;
        let wire: SearchWire = self.get("/finance/search", &[("query", query.to_string())]).await?;
        Ok(wire.into_payload(query))
    }

    async fn health_check(&self) -> Result<bool, ClientError> {
        let wire: HealthWire = self.get("/health", &[]).await?;
        Ok(wire.is_healthy())
    }

    async fn get_stock_data(&self) -> Result<Vec<StockQuote>, ClientError> {
        let envelope: ListEnvelope<StockWire> = self.get("/stocks/list", &[]).await?;
        envelope
            .into_items()
            .into_iter()
            .map(StockQuote::try_from)
            .collect()
    }

    async fn get_market_overview(&self) -> Result<MarketOverview, ClientError> {
        let wire: MarketOverviewWire = self.get("/finance/market-data", &[]).await?;
        MarketOverview::try_from(wire)
    }

    async fn get_crypto_chart(&self, coin_id: &str, days: u32) -> Result<PriceChart, ClientError> {
        let days = validate_days(days)?;
        let coin_id = coin_id.trim().to_lowercase();
        if coin_id.is_empty() || !coin_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ClientError::InvalidInput(format!("invalid coin id {coin_id:?}")));
        }
        let wire: ChartWire = self
            .get(&format!("/charts/crypto/{coin_id}"), &[("days", days.to_string())])
            .await?;
        Ok(wire.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_appends_path_and_encodes_query() {
        let client = ApiClient::new(&ClientConfig::new("http://localhost:8000/api/").unwrap()).unwrap();
        let url = client
            .url("/finance/news", &[("query", "btc & eth".to_string()), ("limit", "5".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/finance/news?query=btc+%26+eth&limit=5"
        );
    }

    #[test]
    fn test_url_without_query() {
        let client = ApiClient::new(&ClientConfig::default()).unwrap();
        assert_eq!(
            client.url("/health", &[]).unwrap().as_str(),
            "http://localhost:8000/api/health"
        );
    }

    #[tokio::test]
    async fn test_invalid_input_never_hits_network() {
        // Port 9 (discard) would fail with a network error if contacted.
        let client = ApiClient::new(&ClientConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        assert!(matches!(client.ask_question("  ").await, Err(ClientError::InvalidInput(_))));
        assert!(matches!(client.get_crypto_data(0).await, Err(ClientError::InvalidInput(_))));
        assert!(matches!(client.get_crypto_chart("bitcoin", 0).await, Err(ClientError::InvalidInput(_))));
        assert!(matches!(client.get_crypto_chart("../x", 7).await, Err(ClientError::InvalidInput(_))));
    }
}
