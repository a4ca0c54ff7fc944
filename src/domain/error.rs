use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// What went wrong at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkErrorKind {
    Connect,
    Timeout,
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkErrorKind::Connect => write!(f, "connect"),
            NetworkErrorKind::Timeout => write!(f, "timeout"),
            NetworkErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Every failure the client or the cache can surface.
///
/// `Clone` so a cache entry can keep the last error next to its last good value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("Network error ({kind}): {message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    #[error("Upstream error: {status} {status_text}")]
    Upstream { status: u16, status_text: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        ClientError::Network {
            kind,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ClientError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            }
        )
    }

    /// HTTP status for upstream failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            NetworkErrorKind::Timeout
        } else if e.is_connect() {
            NetworkErrorKind::Connect
        } else {
            NetworkErrorKind::Other
        };
        ClientError::network(kind, e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::MalformedResponse(e.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::Config(format!("invalid base URL: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_carries_status() {
        let err = ClientError::Upstream {
            status: 500,
            status_text: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "Upstream error: 500 Internal Server Error");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_timeout_detection() {
        let err = ClientError::network(NetworkErrorKind::Timeout, "deadline elapsed");
        assert!(err.is_timeout());
        assert!(!ClientError::network(NetworkErrorKind::Connect, "refused").is_timeout());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_json_error_is_malformed() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ClientError = json_err.into();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }
}
