//! `phishscan inspect`: summarise a model artifact.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use phishscan::{Feature, Forest};
use std::path::Path;

/// Run the inspect command.
pub fn run(model: &Path) -> Result<()> {
    let forest = Forest::load(model)
        .with_context(|| format!("loading model from {}", model.display()))?;
    let summary = forest.summary();

    if output::is_json() {
        output::print_json(&serde_json::to_value(&summary)?);
        return Ok(());
    }

    let s = Styled::new();
    output::print_header(&s);
    output::print_section(&s, "Model");
    output::print_check(s.info_sym(), "Path:", &model.display().to_string());
    output::print_check(s.ok_sym(), "Trees:", &summary.n_estimators.to_string());
    output::print_check(s.info_sym(), "Nodes:", &summary.total_nodes.to_string());
    if let Some(depth) = summary.max_depth {
        output::print_check(s.info_sym(), "Max depth:", &depth.to_string());
    }
    if summary.leaves_are_fractions {
        output::print_check(s.ok_sym(), "Leaves:", "class fractions");
    } else {
        output::print_check(s.warn_sym(), "Leaves:", "raw class counts");
        output::print_detail("scores are not bounded by 1.0; retrain or re-export with fractions");
    }
    eprintln!();

    output::print_section(&s, "Features");
    for (i, name) in summary.feature_names.iter().enumerate() {
        let canonical = Feature::from_index(i).map(Feature::name).unwrap_or("?");
        let symbol = if name == canonical {
            s.ok_sym()
        } else {
            s.warn_sym()
        };
        output::print_check(symbol, &format!("[{i}]"), name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MODEL: &str = r#"{
        "n_estimators": 1,
        "feature_names": ["Have_IP","Have_At","URL_Length","URL_Depth","Redirection",
                          "https_Domain","TinyURL","Prefix/Suffix","DNS_Record",
                          "Web_Traffic","iFrame"],
        "trees": [{
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, -2, -2],
            "threshold": [0.5, -2.0, -2.0],
            "value": [null, [0.8, 0.2], [0.1, 0.9]]
        }]
    }"#;

    #[test]
    fn test_inspect_model_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL.as_bytes()).unwrap();
        run(file.path()).unwrap();
    }

    #[test]
    fn test_inspect_rejects_malformed_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"n_estimators": 2, "feature_names": [], "trees": []}"#)
            .unwrap();
        let err = run(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("loading model from"));
    }

    #[test]
    fn test_inspect_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phishing_model.json");
        let err = run(&path).unwrap_err();
        assert!(err.to_string().contains("phishing_model.json"));
    }
}
