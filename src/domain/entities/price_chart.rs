use serde::{Deserialize, Serialize};

/// `(unix millis, value)` pairs.
pub type Series = Vec<(i64, f64)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChart {
    pub symbol: String,
    pub days: u32,
    pub prices: Series,
    pub market_caps: Series,
    pub total_volumes: Series,
}

impl PriceChart {
    /// Percentage move from the first to the last price point.
    pub fn period_change(&self) -> Option<f64> {
        let (_, first) = self.prices.first()?;
        let (_, last) = self.prices.last()?;
        if *first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_change() {
        let chart = PriceChart {
            symbol: "bitcoin".into(),
            days: 2,
            prices: vec![(0, 100.0), (1, 90.0), (2, 110.0)],
            market_caps: vec![],
            total_volumes: vec![],
        };
        assert!((chart.period_change().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_period_change_empty() {
        let chart = PriceChart {
            symbol: "bitcoin".into(),
            days: 1,
            prices: vec![],
            market_caps: vec![],
            total_volumes: vec![],
        };
        assert!(chart.period_change().is_none());
    }
}
