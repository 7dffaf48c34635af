//! Client for the prediction history feed that drives the charts.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Endpoints;
use crate::error::FetchError;
use crate::inference::DEFAULT_MODEL;

/// One past prediction. The feed is ordered oldest to newest.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub model: String,
    pub confidence: f64,
}

impl HistoryPoint {
    pub fn new(model: impl Into<String>, confidence: f64) -> Self {
        Self {
            model: model.into(),
            confidence,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    model: Option<String>,
    confidence: Option<f64>,
}

impl From<WirePoint> for HistoryPoint {
    fn from(w: WirePoint) -> Self {
        Self {
            model: w.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            // Missing confidence plots as zero.
            confidence: w.confidence.unwrap_or(0.0),
        }
    }
}

/// Reads a history response. Anything but a success status with a JSON
/// array is an error; unreadable entries inside the array are skipped.
pub fn parse_history_response(status: u16, body: &str) -> Result<Vec<HistoryPoint>, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::server(Some(status), format!("HTTP {status}")));
    }
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let serde_json::Value::Array(items) = value else {
        return Err(FetchError::Malformed("history is not a list".into()));
    };

    let total = items.len();
    let points: Vec<HistoryPoint> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<WirePoint>(item).ok())
        .map(HistoryPoint::from)
        .collect();
    if points.len() < total {
        warn!(skipped = total - points.len(), "unreadable history entries");
    }
    Ok(points)
}

#[derive(Debug, Clone)]
pub struct HistoryClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    limit: usize,
}

impl HistoryClient {
    pub fn new(endpoints: Endpoints, limit: usize) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints, limit)
    }

    pub fn with_client(http: reqwest::Client, endpoints: Endpoints, limit: usize) -> Self {
        Self {
            http,
            endpoints,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Fetches the most recent `limit` points.
    pub async fn fetch(&self) -> Result<Vec<HistoryPoint>, FetchError> {
        let response = self
            .http
            .get(self.endpoints.history_url())
            .query(&[("limit", self.limit)])
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let points = parse_history_response(status, &body)?;
        debug!(count = points.len(), "history fetched");
        Ok(points)
    }
}
