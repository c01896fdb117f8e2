//! Scoring backends.
//!
//! A [`Classifier`] turns a feature vector into a phishing score. The
//! forest can run in-process ([`Forest`], [`LazyForest`]) or behind an
//! inference server ([`RemoteClassifier`]); callers pick the transport.

use crate::error::PredictError;
use crate::features::FeatureVector;
use crate::forest::Forest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::error;

/// Produces a phishing score for a feature vector.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn score(&self, features: &FeatureVector) -> Result<f64, PredictError>;
}

#[async_trait]
impl Classifier for Forest {
    async fn score(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        Ok(self.predict(features))
    }
}

/// A forest loaded from disk on first use.
///
/// The load runs at most once. A failed load is remembered and reported on
/// every later call; there is no fallback model.
pub struct LazyForest {
    path: PathBuf,
    cell: OnceCell<Result<Arc<Forest>, String>>,
}

impl LazyForest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The loaded forest, loading it now if needed.
    pub async fn get(&self) -> Result<Arc<Forest>, PredictError> {
        let loaded = self
            .cell
            .get_or_init(|| async {
                let path = self.path.clone();
                let result = tokio::task::spawn_blocking(move || Forest::load(&path))
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|r| r.map_err(|e| e.to_string()))
                    .map(Arc::new)
                    .map_err(|e| format!("{}: {e}", self.path.display()));
                if let Err(ref e) = result {
                    error!(error = %e, "failed to load phishing model");
                }
                result
            })
            .await;
        loaded.clone().map_err(PredictError::Model)
    }
}

#[async_trait]
impl Classifier for LazyForest {
    async fn score(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        Ok(self.get().await?.predict(features))
    }
}

#[derive(Serialize)]
struct RemoteRequest<'a> {
    features: &'a FeatureVector,
}

#[derive(Deserialize)]
struct RemoteResponse {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    is_phishing: Option<serde_json::Value>,
}

/// Scores by POSTing the vector to an inference server.
///
/// Accepts either `{"is_phishing": 0|1}` or a response carrying `score`.
pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteClassifier {
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> Result<Self, PredictError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Pull a human-readable reason out of an error body.
fn error_detail(body: &str, fallback: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback.to_string();
    };
    match json.get("error").or_else(|| json.get("detail")) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => json.to_string(),
    }
}

fn label_to_score(label: &serde_json::Value) -> Option<f64> {
    match label {
        serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        serde_json::Value::Number(n) => n.as_f64().map(|v| if v == 1.0 { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn score(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&RemoteRequest { features })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("unknown status");
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictError::Server {
                status: status.as_u16(),
                detail: error_detail(&body, fallback),
            });
        }

        let body: RemoteResponse = resp.json().await?;
        body.score
            .or_else(|| body.is_phishing.as_ref().and_then(label_to_score))
            .ok_or_else(|| {
                PredictError::Transport("response has neither score nor is_phishing".to_string())
            })
    }
}
