//! Phishscan: phishing URL detection from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use phishscan_cli::cli::{self, output};
use phishscan_cli::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phishscan", version, about = "Classify URLs as phishing or benign")]
struct Cli {
    /// Machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Only print the verdict
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Show extra detail and debug logs
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a URL
    Scan {
        url: String,
        /// Model artifact to score with
        #[arg(long)]
        model: Option<PathBuf>,
        /// Score with a remote inference server instead of a local model
        #[arg(long, conflicts_with = "model")]
        api: Option<String>,
        /// Skip network probes (they score as suspicious)
        #[arg(long)]
        offline: bool,
    },
    /// Print the feature vector for a URL
    Features {
        url: String,
        #[arg(long)]
        offline: bool,
    },
    /// Summarise a model artifact
    Inspect {
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Serve predictions over HTTP
    Serve {
        /// Listen address, e.g. 127.0.0.1:5000
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
        #[arg(long)]
        model: Option<PathBuf>,
        /// Skip network probes for URL requests
        #[arg(long)]
        offline: bool,
    },
}

/// Filter used when `RUST_LOG` is unset. One-shot commands stay quiet.
fn default_filter(verbose: bool, serving: bool) -> &'static str {
    if verbose {
        "phishscan=debug,phishscan_cli=debug"
    } else if serving {
        "phishscan=info,phishscan_cli=info"
    } else {
        "warn"
    }
}

fn init_tracing(verbose: bool, serving: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, serving)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Output mode is read back through the environment by cli::output
    if cli.json {
        std::env::set_var("PHISHSCAN_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("PHISHSCAN_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("PHISHSCAN_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("PHISHSCAN_NO_COLOR", "1");
    }

    init_tracing(cli.verbose, matches!(cli.command, Commands::Serve { .. }));

    if let Err(e) = run(cli.command).await {
        let s = output::Styled::new();
        if output::is_json() {
            eprintln!("{}", serde_json::json!({ "error": format!("{e:#}") }));
        } else {
            eprintln!("  {} {e:#}", s.fail_sym());
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Commands::Scan {
            url,
            model,
            api,
            offline,
        } => {
            if let Some(model) = model {
                config.model_path = model;
                config.api_url = None;
            }
            if api.is_some() {
                config.api_url = api;
            }
            cli::scan_cmd::run(&url, &config, offline).await
        }
        Commands::Features { url, offline } => {
            cli::features_cmd::run(&url, &config, offline).await
        }
        Commands::Inspect { model } => {
            let model = model.unwrap_or(config.model_path);
            cli::inspect_cmd::run(&model)
        }
        Commands::Serve {
            bind,
            model,
            offline,
        } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(model) = model {
                config.model_path = model;
            }
            cli::serve_cmd::run(&config, offline).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false, false), "warn");
        assert_eq!(default_filter(false, true), "phishscan=info,phishscan_cli=info");
        assert_eq!(default_filter(true, false), "phishscan=debug,phishscan_cli=debug");
        assert_eq!(default_filter(true, true), "phishscan=debug,phishscan_cli=debug");
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
