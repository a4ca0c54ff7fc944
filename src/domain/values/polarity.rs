use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a key fact reads as good news, bad news or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl From<Option<bool>> for Polarity {
    fn from(positive: Option<bool>) -> Self {
        match positive {
            Some(true) => Polarity::Positive,
            Some(false) => Polarity::Negative,
            None => Polarity::Neutral,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "positive"),
            Polarity::Negative => write!(f, "negative"),
            Polarity::Neutral => write!(f, "neutral"),
        }
    }
}
