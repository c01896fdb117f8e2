//! HTTP prediction server.
//!
//! `POST /predict` takes either a precomputed vector or a URL:
//!
//! - `{"features": [..11 numbers..]}` -> `{"is_phishing": 0|1, "score": s}`
//! - `{"url": "http://..."}` -> full prediction result (probes run live)
//!
//! `GET /` reports liveness and the loaded model size.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use phishscan::{FeatureVector, Forest, PhishingDetector, PredictionResult, Prober};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    forest: Arc<Forest>,
    detector: PhishingDetector,
}

impl AppState {
    pub fn new(forest: Arc<Forest>, prober: Arc<dyn Prober>) -> Self {
        let detector = PhishingDetector::new(forest.clone(), prober);
        Self { forest, detector }
    }
}

/// Body of `POST /predict`.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub features: Option<Vec<u32>>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Build the router with permissive CORS so browser extensions can call it.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/predict", post(predict))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "n_estimators": state.forest.n_estimators(),
    }))
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into() })),
    )
        .into_response()
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    match (req.features, req.url) {
        (Some(values), _) => match FeatureVector::try_from_slice(&values) {
            Ok(features) => {
                let result = PredictionResult::from_score(state.forest.predict(&features), features);
                debug!(features = ?features.0, score = result.score, "scored vector");
                Json(json!({
                    "is_phishing": u8::from(result.is_phishing),
                    "score": result.score,
                }))
                .into_response()
            }
            Err(e) => bad_request(e.to_string()),
        },
        (None, Some(url)) => Json(state.detector.predict(&url).await).into_response(),
        (None, None) => bad_request("request must carry `features` or `url`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::{assert_json_eq, assert_json_include};
    use axum::body::to_bytes;
    use phishscan::forest::{DecisionTree, LEAF};
    use phishscan::{Feature, OfflineProber};

    fn state() -> AppState {
        let forest = Forest::from_trees(
            Feature::ALL.iter().map(|f| f.name().to_string()).collect(),
            vec![DecisionTree {
                feature: vec![Feature::HaveIp.index() as i64, LEAF, LEAF],
                threshold: vec![0.5, -2.0, -2.0],
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                value: vec![None, Some([0.75, 0.25]), Some([0.0, 1.0])],
            }],
        );
        AppState::new(Arc::new(forest), Arc::new(OfflineProber))
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(features: Option<Vec<u32>>, url: Option<&str>) -> Result<Json<PredictRequest>, JsonRejection> {
        Ok(Json(PredictRequest {
            features,
            url: url.map(String::from),
        }))
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health(State(state())).await;
        assert_json_eq!(body, json!({"status": "ok", "n_estimators": 1}));
    }

    #[tokio::test]
    async fn test_predict_features() {
        let resp = predict(
            State(state()),
            request(Some(vec![1, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0]), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_json_eq!(body_json(resp).await, json!({"is_phishing": 1, "score": 1.0}));

        let resp = predict(State(state()), request(Some(vec![0; 11]), None)).await;
        assert_json_eq!(body_json(resp).await, json!({"is_phishing": 0, "score": 0.25}));
    }

    #[tokio::test]
    async fn test_predict_wrong_length() {
        let resp = predict(State(state()), request(Some(vec![1, 0, 1, 0, 1]), None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_json_eq!(
            body_json(resp).await,
            json!({"error": "expected 11 features, got 5"})
        );
    }

    #[tokio::test]
    async fn test_predict_url() {
        let resp = predict(State(state()), request(None, Some("http://10.0.0.1/login"))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_json_include!(
            actual: body_json(resp).await,
            expected: json!({
                "is_phishing": true,
                "score": 1.0,
                "confidence": 1.0,
                "features": [1, 0, 0, 1, 0, 0, 0, 0, 1, 1, 1]
            })
        );
    }

    #[tokio::test]
    async fn test_predict_empty_request() {
        let resp = predict(State(state()), request(None, None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("features"));
    }
}
