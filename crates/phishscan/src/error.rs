//! Error types for model loading, prediction, and network probes.

use thiserror::Error;

/// The model artifact could not be turned into a usable forest.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Invalid(String),
}

/// A classifier could not produce a score.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model unavailable: {0}")]
    Model(String),

    #[error("server error: {status} - {detail}")]
    Server { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("expected {expected} features, got {got}")]
    InvalidFeatureLength { expected: usize, got: usize },
}

impl From<reqwest::Error> for PredictError {
    fn from(e: reqwest::Error) -> Self {
        PredictError::Transport(e.to_string())
    }
}

/// A network probe failed. Always recovered by the fail-closed policy.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot probe unparseable URL: {0}")]
    InvalidUrl(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network probes disabled")]
    Disabled,
}
