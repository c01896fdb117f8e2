//! `phishscan scan <url>`: classify a single URL.

use crate::cli::output::{self, Styled};
use crate::config::Config;
use anyhow::{bail, Context, Result};
use phishscan::{Classifier, LazyForest, PhishingDetector, PredictionResult, RemoteClassifier};
use std::sync::Arc;

/// Run the scan command.
pub async fn run(url: &str, config: &Config, offline: bool) -> Result<()> {
    let prober = super::build_prober(offline, &config.probe)?;
    let (classifier, source): (Arc<dyn Classifier>, String) = match &config.api_url {
        Some(api) => {
            let remote = RemoteClassifier::new(api, config.api_timeout_ms)
                .context("building HTTP client for inference server")?;
            let source = remote.endpoint().to_string();
            (Arc::new(remote) as Arc<dyn Classifier>, source)
        }
        None => {
            let lazy = LazyForest::new(&config.model_path);
            let source = lazy.path().display().to_string();
            (Arc::new(lazy) as Arc<dyn Classifier>, source)
        }
    };

    let detector = PhishingDetector::new(classifier, prober);
    let result = detector.predict(url).await;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&result)?);
    } else if output::is_quiet() {
        println!("{}", verdict_word(&result));
    } else {
        print_result(&Styled::new(), url, &source, offline, &result);
    }

    if let Some(e) = result.error {
        bail!("prediction failed: {e}");
    }
    Ok(())
}

/// One-word verdict for scripting.
pub fn verdict_word(result: &PredictionResult) -> &'static str {
    match (&result.error, result.is_phishing) {
        (Some(_), _) => "error",
        (None, true) => "phishing",
        (None, false) => "safe",
    }
}

fn print_result(s: &Styled, url: &str, source: &str, offline: bool, result: &PredictionResult) {
    output::print_header(s);

    output::print_section(s, "Features");
    super::print_features(s, &result.features);
    if offline {
        output::print_detail("offline: network probes skipped and scored as suspicious");
    }
    eprintln!();

    output::print_section(s, "Verdict");
    if output::is_verbose() {
        output::print_check(s.info_sym(), "Model:", source);
    }
    if let Some(e) = &result.error {
        output::print_check(s.fail_sym(), "Error:", e);
        output::print_detail("Set --model / PHISHSCAN_MODEL, or --api / PHISHSCAN_API_URL");
        output::print_status(s, &s.yellow("UNKNOWN"), url);
        return;
    }

    let (symbol, status) = if result.is_phishing {
        (s.fail_sym(), s.red("PHISHING"))
    } else {
        (s.ok_sym(), s.green("SAFE"))
    };
    output::print_check(symbol, "Score:", &output::score_bar(result.score, 20));
    output::print_check(
        s.info_sym(),
        "Confidence:",
        &format!("{:.0}%", result.confidence * 100.0),
    );
    output::print_status(s, &status, url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use phishscan::FeatureVector;

    #[test]
    fn test_verdict_word() {
        let phish = PredictionResult::from_score(0.9, FeatureVector::default());
        let safe = PredictionResult::from_score(0.1, FeatureVector::default());
        let failed = PredictionResult::failed(FeatureVector::default(), "no model");
        assert_eq!(verdict_word(&phish), "phishing");
        assert_eq!(verdict_word(&safe), "safe");
        assert_eq!(verdict_word(&failed), "error");
    }
}
