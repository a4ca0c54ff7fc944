use crate::domain::values::polarity::Polarity;
use serde::{Deserialize, Serialize};

/// The backend's answer to a natural-language finance question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnswer {
    /// May contain `**emphasis**` markup.
    pub summary: String,
    pub key_facts: Vec<KeyFact>,
    /// Ordinals are 1, 2, 3, ... in order.
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFact {
    pub label: String,
    pub value: String,
    pub polarity: Polarity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub ordinal: u32,
    pub title: String,
    pub url: String,
}

impl AiAnswer {
    /// Summary with emphasis markers removed, for plain-text output.
    pub fn plain_summary(&self) -> String {
        self.summary.replace("**", "")
    }

    /// Pairs `(title, url)` become sources numbered from 1 in the given order.
    pub fn number_sources(sources: impl IntoIterator<Item = (String, String)>) -> Vec<SourceRef> {
        sources
            .into_iter()
            .zip(1u32..)
            .map(|((title, url), ordinal)| SourceRef { ordinal, title, url })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_numbered_densely() {
        let sources = AiAnswer::number_sources(vec![
            ("CoinGecko".to_string(), "https://coingecko.com".to_string()),
            ("CoinMarketCap".to_string(), "https://coinmarketcap.com".to_string()),
        ]);
        let ordinals: Vec<u32> = sources.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    #[test]
    fn test_plain_summary_strips_emphasis() {
        let answer = AiAnswer {
            summary: "Bitcoin trades at **$43,250**".into(),
            key_facts: vec![],
            sources: vec![],
        };
        assert_eq!(answer.plain_summary(), "Bitcoin trades at $43,250");
    }
}
