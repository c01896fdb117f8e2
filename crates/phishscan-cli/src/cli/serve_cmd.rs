//! `phishscan serve`: run the HTTP prediction server.

use crate::cli::output::{self, Styled};
use crate::config::Config;
use crate::server::{self, AppState};
use anyhow::{Context, Result};
use phishscan::Forest;
use std::sync::Arc;
use tracing::info;

/// Load the model, then serve until Ctrl-C.
pub async fn run(config: &Config, offline: bool) -> Result<()> {
    let forest = Forest::load(&config.model_path)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;
    let prober = super::build_prober(offline, &config.probe)?;
    let state = AppState::new(Arc::new(forest), prober);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;

    if !output::is_quiet() {
        let s = Styled::new();
        eprintln!(
            "  {} Phishscan v{} listening on http://{}",
            s.ok_sym(),
            env!("CARGO_PKG_VERSION"),
            config.bind
        );
    }
    info!(bind = %config.bind, "prediction server started");

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
        })
        .await
        .context("serving HTTP")?;

    if !output::is_quiet() {
        eprintln!("  {} Phishscan stopped.", Styled::new().ok_sym());
    }
    Ok(())
}
