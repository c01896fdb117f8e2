//! End-to-end URL verdicts.

use crate::classifier::Classifier;
use crate::features::probe::Prober;
use crate::features::{self, FeatureVector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Scores above this are phishing.
pub const PHISHING_THRESHOLD: f64 = 0.5;

/// Outcome of one prediction. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub is_phishing: bool,
    pub score: f64,
    pub confidence: f64,
    pub features: FeatureVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResult {
    /// Derive the label and confidence from a score.
    ///
    /// The score is clamped to [0, 1] first, so count-valued models and
    /// NaN still produce a well-formed result.
    pub fn from_score(score: f64, features: FeatureVector) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self {
            is_phishing: score > PHISHING_THRESHOLD,
            score,
            confidence: (score - PHISHING_THRESHOLD).abs() * 2.0,
            features,
            error: None,
        }
    }

    /// A benign-by-default result carrying the failure.
    pub fn failed(features: FeatureVector, error: impl Into<String>) -> Self {
        Self {
            is_phishing: false,
            score: 0.0,
            confidence: 0.0,
            features,
            error: Some(error.into()),
        }
    }
}

/// Extracts features for a URL and scores them.
#[derive(Clone)]
pub struct PhishingDetector {
    classifier: Arc<dyn Classifier>,
    prober: Arc<dyn Prober>,
}

impl PhishingDetector {
    pub fn new(classifier: Arc<dyn Classifier>, prober: Arc<dyn Prober>) -> Self {
        Self { classifier, prober }
    }

    /// Extract the feature vector only, probing the live site.
    pub async fn features(&self, url: &str) -> FeatureVector {
        features::extract_live(url, self.prober.clone()).await
    }

    /// Score an already-extracted vector.
    pub async fn predict_features(&self, features: FeatureVector) -> PredictionResult {
        match self.classifier.score(&features).await {
            Ok(score) => PredictionResult::from_score(score, features),
            Err(e) => {
                warn!(error = %e, "prediction failed");
                PredictionResult::failed(features, e.to_string())
            }
        }
    }

    /// Classify a URL. Never fails; errors are reported in the result.
    pub async fn predict(&self, url: &str) -> PredictionResult {
        let features = self.features(url).await;
        let result = self.predict_features(features).await;
        if result.error.is_none() {
            info!(
                url,
                score = result.score,
                is_phishing = result.is_phishing,
                "classified url"
            );
        }
        result
    }
}
