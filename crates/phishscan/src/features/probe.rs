//! Network probes for the last three feature slots.
//!
//! A probe answers one yes/no question about a live site: does the host
//! resolve, is the site reachable, does the page redirect by script or
//! embed frames. The transport lives behind [`Prober`]; [`HttpProber`] is
//! the stock implementation over reqwest.
//!
//! Every probe fails closed. An error of any kind becomes
//! [`ProbeSignal::Unknown`], which encodes as the suspicious value `1`.

use crate::error::ProbeError;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Default DNS-over-HTTPS JSON endpoint.
pub const DEFAULT_DOH_URL: &str = "https://cloudflare-dns.com/dns-query";

/// Outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeSignal {
    /// The probe ran and found nothing suspicious.
    Clear,
    /// The probe ran and the suspicious condition holds.
    Flagged,
    /// The probe could not run to completion.
    Unknown,
}

impl ProbeSignal {
    /// Feature encoding. `Unknown` is treated as `Flagged`.
    pub fn feature_value(self) -> u32 {
        match self {
            ProbeSignal::Clear => 0,
            ProbeSignal::Flagged | ProbeSignal::Unknown => 1,
        }
    }
}

impl From<Result<bool, ProbeError>> for ProbeSignal {
    fn from(result: Result<bool, ProbeError>) -> Self {
        match result {
            Ok(true) => ProbeSignal::Flagged,
            Ok(false) => ProbeSignal::Clear,
            Err(_) => ProbeSignal::Unknown,
        }
    }
}

/// The three probe outcomes that feed the vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSignals {
    pub dns_record: ProbeSignal,
    pub web_traffic: ProbeSignal,
    pub iframe: ProbeSignal,
}

impl ProbeSignals {
    /// All three unknown, so all three fail closed.
    pub fn unknown() -> Self {
        Self {
            dns_record: ProbeSignal::Unknown,
            web_traffic: ProbeSignal::Unknown,
            iframe: ProbeSignal::Unknown,
        }
    }
}

/// Source of live-site signals.
///
/// `Ok(true)` means the suspicious condition holds.
#[async_trait]
pub trait Prober: Send + Sync {
    /// No DNS answer exists for the URL's host.
    async fn dns_record_absent(&self, url: &str) -> Result<bool, ProbeError>;

    /// The site did not answer a simple request.
    async fn web_traffic_failed(&self, url: &str) -> Result<bool, ProbeError>;

    /// The page embeds frames or redirects from script.
    async fn iframe_or_redirect(&self, url: &str) -> Result<bool, ProbeError>;
}

/// Run all three probes as independent tasks and wait for every one.
///
/// Individual failures settle to `Unknown`. If joining the tasks fails
/// (a probe panicked or was cancelled) all three settle to `Unknown` and the
/// remaining tasks are aborted.
pub async fn gather(prober: Arc<dyn Prober>, url: &str) -> ProbeSignals {
    let dns = {
        let (p, u) = (prober.clone(), url.to_string());
        tokio::spawn(async move { settle("dns_record", &u, p.dns_record_absent(&u).await) })
    };
    let traffic = {
        let (p, u) = (prober.clone(), url.to_string());
        tokio::spawn(async move { settle("web_traffic", &u, p.web_traffic_failed(&u).await) })
    };
    let iframe = {
        let (p, u) = (prober, url.to_string());
        tokio::spawn(async move { settle("iframe", &u, p.iframe_or_redirect(&u).await) })
    };

    let handles = [
        dns.abort_handle(),
        traffic.abort_handle(),
        iframe.abort_handle(),
    ];
    match tokio::try_join!(dns, traffic, iframe) {
        Ok((dns_record, web_traffic, iframe)) => ProbeSignals {
            dns_record,
            web_traffic,
            iframe,
        },
        Err(e) => {
            warn!(url, error = %e, "probe join failed, all probes fail closed");
            for handle in &handles {
                handle.abort();
            }
            ProbeSignals::unknown()
        }
    }
}

fn settle(probe: &str, url: &str, result: Result<bool, ProbeError>) -> ProbeSignal {
    if let Err(ref e) = result {
        warn!(probe, url, error = %e, "probe failed closed");
    }
    ProbeSignal::from(result)
}

/// Settings for [`HttpProber`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// DNS-over-HTTPS endpoint answering `application/dns-json`.
    pub doh_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            doh_url: DEFAULT_DOH_URL.to_string(),
            timeout_ms: 5_000,
            user_agent: format!("phishscan/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<serde_json::Value>,
}

fn iframe_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<iframe>|<frameBorder>").expect("iframe regex is valid"))
}

fn script_redirect_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"window\.location|document\.location|window\.navigate|document\.navigate")
            .expect("redirect regex is valid")
    })
}

/// Whether page HTML embeds frames or navigates away from script.
pub fn html_has_iframe_or_redirect(html: &str) -> bool {
    iframe_regex().is_match(html) || script_redirect_regex().is_match(html)
}

/// Probes over HTTP: DNS-over-HTTPS, favicon fetch, and page scan.
pub struct HttpProber {
    client: reqwest::Client,
    config: ProbeConfig,
}

impl HttpProber {
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    fn parse(url: &str) -> Result<Url, ProbeError> {
        Url::parse(url).map_err(|e| ProbeError::InvalidUrl(format!("{url}: {e}")))
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn dns_record_absent(&self, url: &str) -> Result<bool, ProbeError> {
        let parsed = Self::parse(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ProbeError::InvalidUrl(format!("{url}: no host")))?;

        let resp: DohResponse = self
            .client
            .get(&self.config.doh_url)
            .query(&[("name", host)])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await?
            .json()
            .await?;

        Ok(resp.answer.is_empty())
    }

    async fn web_traffic_failed(&self, url: &str) -> Result<bool, ProbeError> {
        // Appended to the URL as given, not resolved against the site root
        let favicon = Self::parse(&format!("{url}/favicon.ico"))?;
        let resp = self.client.get(favicon).send().await?;
        Ok(!resp.status().is_success())
    }

    async fn iframe_or_redirect(&self, url: &str) -> Result<bool, ProbeError> {
        let parsed = Self::parse(url)?;
        let html = self.client.get(parsed).send().await?.text().await?;
        Ok(html_has_iframe_or_redirect(&html))
    }
}

/// A prober that never touches the network.
///
/// Every probe reports [`ProbeError::Disabled`], so all three slots fail
/// closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProber;

#[async_trait]
impl Prober for OfflineProber {
    async fn dns_record_absent(&self, _url: &str) -> Result<bool, ProbeError> {
        Err(ProbeError::Disabled)
    }

    async fn web_traffic_failed(&self, _url: &str) -> Result<bool, ProbeError> {
        Err(ProbeError::Disabled)
    }

    async fn iframe_or_redirect(&self, _url: &str) -> Result<bool, ProbeError> {
        Err(ProbeError::Disabled)
    }
}
