//! Runtime configuration: defaults, then `PHISHSCAN_*` environment
//! variables. Command-line flags are applied on top by the caller.

use anyhow::{Context, Result};
use phishscan::ProbeConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const ENV_MODEL: &str = "PHISHSCAN_MODEL";
pub const ENV_API_URL: &str = "PHISHSCAN_API_URL";
pub const ENV_DOH_URL: &str = "PHISHSCAN_DOH_URL";
pub const ENV_PROBE_TIMEOUT_MS: &str = "PHISHSCAN_PROBE_TIMEOUT_MS";
pub const ENV_BIND: &str = "PHISHSCAN_BIND";
pub const ENV_API_TIMEOUT_MS: &str = "PHISHSCAN_API_TIMEOUT_MS";

/// Default listen address for `phishscan serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Resolved settings for every subcommand.
#[derive(Debug, Clone)]
pub struct Config {
    /// Local model artifact.
    pub model_path: PathBuf,
    /// Remote inference endpoint. When set, `scan` scores remotely.
    pub api_url: Option<String>,
    pub api_timeout_ms: u64,
    pub probe: ProbeConfig,
    pub bind: SocketAddr,
}

/// Default model location: `~/.phishscan/phishing_model.json`.
pub fn default_model_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".phishscan")
        .join("phishing_model.json")
}

fn parse_millis(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be an integer, got {value:?}"))
}

impl Config {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut probe = ProbeConfig::default();
        if let Some(doh) = lookup(ENV_DOH_URL) {
            probe.doh_url = doh;
        }
        if let Some(ms) = lookup(ENV_PROBE_TIMEOUT_MS) {
            probe.timeout_ms = parse_millis(ENV_PROBE_TIMEOUT_MS, &ms)?;
        }
        let api_timeout_ms = match lookup(ENV_API_TIMEOUT_MS) {
            Some(ms) => parse_millis(ENV_API_TIMEOUT_MS, &ms)?,
            None => 10_000,
        };

        let bind = lookup(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind
            .parse()
            .with_context(|| format!("{ENV_BIND} is not a socket address: {bind:?}"))?;

        Ok(Self {
            model_path: lookup(ENV_MODEL)
                .map(PathBuf::from)
                .unwrap_or_else(default_model_path),
            api_url: lookup(ENV_API_URL).filter(|u| !u.is_empty()),
            api_timeout_ms,
            probe,
            bind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.model_path.ends_with(".phishscan/phishing_model.json"));
        assert!(config.api_url.is_none());
        assert_eq!(config.api_timeout_ms, 10_000);
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.probe.doh_url, phishscan::features::probe::DEFAULT_DOH_URL);
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_MODEL, "/srv/model.json"),
            (ENV_API_URL, "http://127.0.0.1:5000/predict"),
            (ENV_DOH_URL, "https://dns.example/dns-query"),
            (ENV_PROBE_TIMEOUT_MS, " 750 "),
            (ENV_BIND, "0.0.0.0:8080"),
            (ENV_API_TIMEOUT_MS, "2500"),
        ]))
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(config.api_url.as_deref(), Some("http://127.0.0.1:5000/predict"));
        assert_eq!(config.probe.doh_url, "https://dns.example/dns-query");
        assert_eq!(config.probe.timeout_ms, 750);
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.api_timeout_ms, 2_500);
    }

    #[test]
    fn test_empty_api_url_is_unset() {
        let config = Config::from_lookup(lookup(&[(ENV_API_URL, "")])).unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[(ENV_PROBE_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_PROBE_TIMEOUT_MS));

        let err = Config::from_lookup(lookup(&[(ENV_BIND, "localhost")])).unwrap_err();
        assert!(err.to_string().contains(ENV_BIND));
    }
}
