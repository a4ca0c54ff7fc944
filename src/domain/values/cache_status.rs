use serde::Serialize;
use std::fmt;

/// Lifecycle of a cache entry: pending → fresh → stale, or → error on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Pending,
    Fresh,
    Stale,
    Error,
}

impl CacheStatus {
    /// A settled entry has an outcome a consumer can render (data or failure).
    pub fn is_settled(&self) -> bool {
        matches!(self, CacheStatus::Fresh | CacheStatus::Stale | CacheStatus::Error)
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Pending => write!(f, "pending"),
            CacheStatus::Fresh => write!(f, "fresh"),
            CacheStatus::Stale => write!(f, "stale"),
            CacheStatus::Error => write!(f, "error"),
        }
    }
}
