use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Logical backend resources the client knows how to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    AiAsk,
    CryptoList,
    CryptoSingle,
    News,
    Search,
    Health,
    StockList,
    MarketOverview,
    CryptoChart,
}

impl Resource {
    /// How long a successful response counts as fresh.
    /// Mirrors the backend's own cache durations for the feeds it proxies.
    pub fn freshness(&self) -> Duration {
        match self {
            Resource::CryptoSingle => Duration::from_secs(60),
            Resource::StockList => Duration::from_secs(120),
            Resource::News => Duration::from_secs(600),
            Resource::Health => Duration::from_secs(30),
            Resource::AiAsk
            | Resource::CryptoList
            | Resource::Search
            | Resource::MarketOverview
            | Resource::CryptoChart => Duration::from_secs(300),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::AiAsk => write!(f, "ai_ask"),
            Resource::CryptoList => write!(f, "crypto_list"),
            Resource::CryptoSingle => write!(f, "crypto_single"),
            Resource::News => write!(f, "news"),
            Resource::Search => write!(f, "search"),
            Resource::Health => write!(f, "health"),
            Resource::StockList => write!(f, "stock_list"),
            Resource::MarketOverview => write!(f, "market_overview"),
            Resource::CryptoChart => write!(f, "crypto_chart"),
        }
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ai_ask" => Ok(Resource::AiAsk),
            "crypto_list" => Ok(Resource::CryptoList),
            "crypto_single" => Ok(Resource::CryptoSingle),
            "news" => Ok(Resource::News),
            "search" => Ok(Resource::Search),
            "health" => Ok(Resource::Health),
            "stock_list" => Ok(Resource::StockList),
            "market_overview" => Ok(Resource::MarketOverview),
            "crypto_chart" => Ok(Resource::CryptoChart),
            _ => Err(format!("Unknown resource: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_from_str() {
        for r in [Resource::AiAsk, Resource::CryptoList, Resource::CryptoChart] {
            assert_eq!(r.to_string().parse::<Resource>().unwrap(), r);
        }
        assert!("bogus".parse::<Resource>().is_err());
    }

    #[test]
    fn test_bitcoin_is_fresher_than_list() {
        assert!(Resource::CryptoSingle.freshness() < Resource::CryptoList.freshness());
    }
}
