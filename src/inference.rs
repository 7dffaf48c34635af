//! Client for the prediction endpoints, and the call tokens used to discard
//! stale replies.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Endpoints;
use crate::error::FetchError;
use crate::raster::RasterSnapshot;

/// Name given to results from a backend that does not report a model.
pub const DEFAULT_MODEL: &str = "default";

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub filename: Option<String>,
    pub model: String,
    pub pred: i64,
    /// Left as reported; display code decides how to treat absent or
    /// out-of-range values.
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionResult {
    Scored(Prediction),
    Failed {
        filename: Option<String>,
        error: FetchError,
    },
}

impl PredictionResult {
    pub fn failed(error: FetchError) -> Self {
        PredictionResult::Failed {
            filename: None,
            error,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            PredictionResult::Scored(p) => p.filename.as_deref(),
            PredictionResult::Failed { filename, .. } => filename.as_deref(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PredictionResult::Failed { .. })
    }
}

/// Identifies one issued inference call. Later calls get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallToken(u64);

impl CallToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Issues [`CallToken`]s and answers whether a completed call is still the
/// most recent one.
#[derive(Debug, Default)]
pub struct TokenCounter {
    latest: u64,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> CallToken {
        self.latest += 1;
        CallToken(self.latest)
    }

    pub fn latest(&self) -> Option<CallToken> {
        (self.latest > 0).then_some(CallToken(self.latest))
    }

    pub fn is_latest(&self, token: CallToken) -> bool {
        token.0 == self.latest
    }

    /// Makes every token issued so far stale without issuing a new call.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireEntry {
    model: Option<String>,
    pred: Option<i64>,
    confidence: Option<f64>,
    filename: Option<String>,
    error: Option<String>,
}

impl WireEntry {
    fn into_result(self) -> PredictionResult {
        if let Some(error) = self.error {
            return PredictionResult::Failed {
                filename: self.filename,
                error: FetchError::server(None, error),
            };
        }
        match self.pred {
            Some(pred) => PredictionResult::Scored(Prediction {
                filename: self.filename,
                model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                pred,
                confidence: self.confidence,
            }),
            None => PredictionResult::Failed {
                filename: self.filename,
                error: FetchError::Malformed("entry has neither pred nor error".into()),
            },
        }
    }
}

/// Classifies a prediction response.
///
/// A JSON array yields one result per entry (an empty array yields none); a
/// single object yields one result. Entries that cannot be read become
/// failures without affecting their neighbours.
pub fn parse_prediction_response(status: u16, body: &str) -> Vec<PredictionResult> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {status}"));
        return vec![PredictionResult::failed(FetchError::server(
            Some(status),
            message,
        ))];
    }

    if body.trim().is_empty() {
        return vec![PredictionResult::failed(FetchError::Malformed(
            "empty response".into(),
        ))];
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return vec![PredictionResult::failed(FetchError::Malformed(e.to_string()))],
    };

    match value {
        serde_json::Value::Array(items) => items.into_iter().map(parse_entry).collect(),
        v @ serde_json::Value::Object(_) => vec![parse_entry(v)],
        serde_json::Value::Null => vec![PredictionResult::failed(FetchError::Malformed(
            "empty response".into(),
        ))],
        other => vec![PredictionResult::failed(FetchError::Malformed(format!(
            "unexpected response: {other}"
        )))],
    }
}

fn parse_entry(v: serde_json::Value) -> PredictionResult {
    match serde_json::from_value::<WireEntry>(v) {
        Ok(entry) => entry.into_result(),
        Err(e) => PredictionResult::failed(FetchError::Malformed(e.to_string())),
    }
}

/// One file of a batch upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl InferenceClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    pub fn with_client(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// Sends the raster to the predict endpoint. Failures come back as
    /// [`PredictionResult::Failed`] entries, never as an `Err`.
    pub async fn predict(&self, raster: &RasterSnapshot) -> Vec<PredictionResult> {
        let request = self
            .http
            .post(self.endpoints.predict_url())
            .json(&PredictRequest {
                image: raster.as_str(),
            });
        self.send(request).await
    }

    /// Multipart upload of one or more image files. Returns the flat
    /// per-file, per-model result list.
    pub async fn predict_batch(&self, files: Vec<UploadFile>) -> Vec<PredictionResult> {
        if files.is_empty() {
            return Vec::new();
        }
        let mut form = Form::new();
        for f in files {
            form = form.part("files", Part::bytes(f.bytes).file_name(f.filename));
        }
        let request = self
            .http
            .post(self.endpoints.predict_batch_url())
            .multipart(form);
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Vec<PredictionResult> {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                let error = FetchError::from(e);
                warn!(%error, "prediction request failed");
                return vec![PredictionResult::failed(error)];
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(status, "prediction body unreadable: {e}");
                return vec![PredictionResult::failed(FetchError::Malformed(e.to_string()))];
            }
        };

        let results = parse_prediction_response(status, &body);
        debug!(status, count = results.len(), "prediction response");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase_and_only_latest_is_current() {
        let mut tokens = TokenCounter::new();
        assert_eq!(tokens.latest(), None);

        let a = tokens.issue();
        assert!(tokens.is_latest(a));
        let b = tokens.issue();
        assert!(b > a);
        assert!(!tokens.is_latest(a));
        assert!(tokens.is_latest(b));
        assert_eq!(tokens.latest(), Some(b));
    }

    #[test]
    fn multi_model_array_yields_one_result_per_entry() {
        let body = r#"[
            {"model": "MLP", "pred": 7, "confidence": 0.91},
            {"model": "CNN", "pred": 1, "confidence": 0.64}
        ]"#;
        let results = parse_prediction_response(200, body);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            PredictionResult::Scored(Prediction {
                filename: None,
                model: "MLP".into(),
                pred: 7,
                confidence: Some(0.91),
            })
        );
    }

    #[test]
    fn single_model_object_gets_default_model_name() {
        let results = parse_prediction_response(200, r#"{"pred": 3, "confidence": 0.5}"#);
        match &results[..] {
            [PredictionResult::Scored(p)] => {
                assert_eq!(p.model, DEFAULT_MODEL);
                assert_eq!(p.pred, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_confidence_is_kept_absent() {
        let results = parse_prediction_response(200, r#"[{"model": "MLP", "pred": 2}]"#);
        match &results[..] {
            [PredictionResult::Scored(p)] => assert_eq!(p.confidence, None),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn error_status_is_a_server_failure() {
        let results = parse_prediction_response(500, r#"{"error": "Modelo no cargado"}"#);
        assert_eq!(
            results,
            vec![PredictionResult::failed(FetchError::server(
                Some(500),
                "Modelo no cargado"
            ))]
        );

        let results = parse_prediction_response(502, "<html>bad gateway</html>");
        assert_eq!(
            results,
            vec![PredictionResult::failed(FetchError::server(Some(502), "HTTP 502"))]
        );
    }

    #[test]
    fn error_payload_with_success_status_is_a_server_failure() {
        let results = parse_prediction_response(200, r#"{"error": "No image provided"}"#);
        assert!(matches!(
            &results[..],
            [PredictionResult::Failed {
                error: FetchError::Server { .. },
                ..
            }]
        ));
    }

    #[test]
    fn malformed_bodies_are_unavailable() {
        for body in ["", "   ", "null", "not json", "42", r#"{"model": "MLP"}"#] {
            let results = parse_prediction_response(200, body);
            assert!(
                matches!(
                    &results[..],
                    [PredictionResult::Failed {
                        error: FetchError::Malformed(_),
                        ..
                    }]
                ),
                "body {body:?} gave {results:?}"
            );
        }
    }

    #[test]
    fn empty_array_yields_no_results() {
        assert!(parse_prediction_response(200, "[]").is_empty());
    }

    #[test]
    fn bad_entry_does_not_hide_good_neighbours() {
        let body = r#"[
            {"filename": "a.png", "model": "CNN", "pred": 4, "confidence": 0.8},
            {"filename": "b.png", "error": "cannot identify image file"},
            {"filename": "c.png", "model": "CNN", "pred": "four"}
        ]"#;
        let results = parse_prediction_response(200, body);
        assert_eq!(results.len(), 3);
        assert!(!results[0].is_failure());
        assert_eq!(results[1].filename(), Some("b.png"));
        assert!(results[1].is_failure());
        assert!(results[2].is_failure());
    }
}
