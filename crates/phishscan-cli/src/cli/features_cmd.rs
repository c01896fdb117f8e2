//! `phishscan features <url>`: print the feature vector without scoring.

use crate::cli::output::{self, Styled};
use crate::config::Config;
use anyhow::Result;
use phishscan::features;

/// Run the features command.
pub async fn run(url: &str, config: &Config, offline: bool) -> Result<()> {
    let prober = super::build_prober(offline, &config.probe)?;
    let vector = features::extract_live(url, prober).await;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "url": url,
            "features": vector,
            "named": super::named_features(&vector),
        }));
        return Ok(());
    }

    if output::is_quiet() {
        println!("{}", serde_json::to_string(&vector)?);
        return Ok(());
    }

    let s = Styled::new();
    output::print_header(&s);
    output::print_section(&s, "Features");
    super::print_features(&s, &vector);
    if offline {
        output::print_detail("offline: network probes skipped and scored as suspicious");
    }
    Ok(())
}
