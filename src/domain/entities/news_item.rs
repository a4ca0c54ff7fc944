use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    /// Publisher name.
    pub source: Option<String>,
    pub published_at: Option<String>,
}
