use crate::domain::error::ClientError;
use crate::domain::values::resource::Resource;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// What a consumer wants: a resource plus its parameters.
///
/// Parameters live in a sorted map so the derived cache key does not depend on
/// the order they were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    resource: Resource,
    params: BTreeMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn ask(query: &str) -> Self {
        Self::new(Resource::AiAsk).with_param("query", query)
    }

    pub fn crypto_list(limit: usize) -> Self {
        Self::new(Resource::CryptoList).with_param("limit", limit)
    }

    pub fn bitcoin() -> Self {
        Self::new(Resource::CryptoSingle)
    }

    pub fn news(query: &str, limit: usize) -> Self {
        Self::new(Resource::News)
            .with_param("query", query)
            .with_param("limit", limit)
    }

    pub fn search(query: &str) -> Self {
        Self::new(Resource::Search).with_param("query", query)
    }

    pub fn health() -> Self {
        Self::new(Resource::Health)
    }

    pub fn stock_list() -> Self {
        Self::new(Resource::StockList)
    }

    pub fn market_overview() -> Self {
        Self::new(Resource::MarketOverview)
    }

    pub fn crypto_chart(coin_id: &str, days: u32) -> Self {
        Self::new(Resource::CryptoChart)
            .with_param("coin_id", coin_id)
            .with_param("days", days)
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Parse a parameter, falling back to `default` when it is absent.
    pub fn param_or<T: FromStr>(&self, name: &str, default: T) -> Result<T, ClientError> {
        match self.param(name) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| {
                ClientError::InvalidInput(format!(
                    "{}: parameter {name} has unparsable value {raw:?}",
                    self.resource
                ))
            }),
        }
    }

    pub fn required_param(&self, name: &str) -> Result<&str, ClientError> {
        self.param(name).ok_or_else(|| {
            ClientError::InvalidInput(format!("{}: missing parameter {name}", self.resource))
        })
    }

    /// Deterministic key: `resource?k1=v1&k2=v2`, parameters sorted and URL-encoded.
    pub fn cache_key(&self) -> String {
        if self.params.is_empty() {
            return self.resource.to_string();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.params)
            .finish();
        format!("{}?{query}", self.resource)
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_order_independent() {
        let a = RequestDescriptor::new(Resource::News)
            .with_param("query", "btc")
            .with_param("limit", 5);
        let b = RequestDescriptor::new(Resource::News)
            .with_param("limit", 5)
            .with_param("query", "btc");
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "news?limit=5&query=btc");
    }

    #[test]
    fn test_key_encodes_values() {
        let d = RequestDescriptor::ask("What's the price & cap?");
        assert_eq!(d.cache_key(), "ai_ask?query=What%27s+the+price+%26+cap%3F");
    }

    #[test]
    fn test_key_without_params() {
        assert_eq!(RequestDescriptor::bitcoin().cache_key(), "crypto_single");
        assert_ne!(
            RequestDescriptor::crypto_list(10).cache_key(),
            RequestDescriptor::crypto_list(100).cache_key()
        );
    }

    #[test]
    fn test_param_parsing() {
        let d = RequestDescriptor::crypto_list(25);
        assert_eq!(d.param_or("limit", 100usize).unwrap(), 25);
        assert_eq!(RequestDescriptor::new(Resource::CryptoList).param_or("limit", 100usize).unwrap(), 100);

        let bad = RequestDescriptor::new(Resource::CryptoList).with_param("limit", "many");
        assert!(matches!(bad.param_or("limit", 100usize), Err(ClientError::InvalidInput(_))));
        assert!(bad.required_param("query").is_err());
    }
}
