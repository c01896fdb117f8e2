//! Phishscan core: phishing URL detection.
//!
//! A URL is encoded into an 11-slot feature vector ([`features`]) from
//! lexical checks and three fail-closed network probes, then scored by a
//! pre-trained random forest ([`forest`]). [`PhishingDetector`] ties the two
//! together and always answers with a [`PredictionResult`].
//!
//! ```no_run
//! use phishscan::{Forest, HttpProber, PhishingDetector, ProbeConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let forest = Forest::load("phishing_model.json")?;
//! let prober = HttpProber::new(ProbeConfig::default())?;
//! let detector = PhishingDetector::new(Arc::new(forest), Arc::new(prober));
//!
//! let result = detector.predict("http://bit.ly/xyz").await;
//! println!("phishing: {} ({:.2})", result.is_phishing, result.score);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod detector;
pub mod error;
pub mod features;
pub mod forest;

pub use classifier::{Classifier, LazyForest, RemoteClassifier};
pub use detector::{PhishingDetector, PredictionResult, PHISHING_THRESHOLD};
pub use error::{ModelLoadError, PredictError, ProbeError};
pub use features::probe::{
    HttpProber, OfflineProber, ProbeConfig, ProbeSignal, ProbeSignals, Prober,
};
pub use features::{extract, extract_live, Feature, FeatureVector, FEATURE_COUNT};
pub use forest::{Forest, ForestDescriptor, ForestSummary};
