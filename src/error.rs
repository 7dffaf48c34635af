use thiserror::Error;

/// Why a request to the inference or history service produced no usable data.
///
/// Stale responses are not errors: they are dropped by the pipeline before
/// they reach the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response was received at all.
    #[error("connection error: {0}")]
    Network(String),

    /// The service answered with a non-success status or an `error` payload.
    #[error("server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },

    /// The response body was empty or did not have the expected shape.
    #[error("prediction unavailable: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        FetchError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::server(Some(status.as_u16()), e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure_class() {
        assert_eq!(
            FetchError::Network("refused".into()).to_string(),
            "connection error: refused"
        );
        assert_eq!(
            FetchError::server(Some(500), "model not loaded").to_string(),
            "server error: model not loaded"
        );
        assert_eq!(
            FetchError::Malformed("empty body".into()).to_string(),
            "prediction unavailable: empty body"
        );
    }
}
