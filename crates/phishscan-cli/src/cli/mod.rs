//! CLI subcommand implementations for the phishscan binary.

pub mod features_cmd;
pub mod inspect_cmd;
pub mod output;
pub mod scan_cmd;
pub mod serve_cmd;

use anyhow::{Context, Result};
use output::Styled;
use phishscan::{Feature, FeatureVector, HttpProber, OfflineProber, ProbeConfig, Prober};
use std::sync::Arc;

/// Live HTTP probes, or none at all when `offline` is set.
pub fn build_prober(offline: bool, config: &ProbeConfig) -> Result<Arc<dyn Prober>> {
    if offline {
        return Ok(Arc::new(OfflineProber));
    }
    let prober = HttpProber::new(config.clone()).context("building HTTP client for probes")?;
    Ok(Arc::new(prober))
}

/// `{ "Have_IP": 0, ... }` keyed by feature name.
pub fn named_features(features: &FeatureVector) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = features
        .iter()
        .map(|(f, v)| (f.name().to_string(), v.into()))
        .collect();
    serde_json::Value::Object(map)
}

/// One line per feature with a flag symbol.
pub fn print_features(s: &Styled, features: &FeatureVector) {
    for (feature, value) in features.iter() {
        let symbol = match (feature, value) {
            (Feature::UrlDepth, _) => s.info_sym(),
            (_, 0) => s.ok_sym(),
            _ => s.warn_sym(),
        };
        output::print_check(symbol, feature.name(), &value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_features() {
        let v = FeatureVector([1, 0, 0, 4, 0, 0, 1, 0, 1, 1, 1]);
        let named = named_features(&v);
        assert_eq!(named.as_object().unwrap().len(), 11);
        assert_eq!(named["URL_Depth"], 4);
        assert_eq!(named["TinyURL"], 1);
        assert_eq!(named["Have_At"], 0);
    }
}
