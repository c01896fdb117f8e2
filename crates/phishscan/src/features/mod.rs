//! URL feature extraction.
//!
//! Turns a URL into the fixed 11-slot vector the forest was trained on.
//! Eight slots come from the URL text alone ([`lexical`]); the last three
//! come from network probes ([`probe`]) that fail closed to `1`.
//!
//! Slot order is part of the model contract. It is pinned by [`Feature`]
//! and must never be permuted.

pub mod lexical;
pub mod probe;
pub mod shorteners;

use crate::error::PredictError;
use probe::{ProbeSignals, Prober};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use std::sync::Arc;
use tracing::debug;

/// Number of slots in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 11;

/// One slot of the feature vector, in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Feature {
    HaveIp = 0,
    HaveAt = 1,
    UrlLength = 2,
    UrlDepth = 3,
    Redirection = 4,
    HttpsDomain = 5,
    TinyUrl = 6,
    PrefixSuffix = 7,
    DnsRecord = 8,
    WebTraffic = 9,
    Iframe = 10,
}

impl Feature {
    /// Every feature in vector order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::HaveIp,
        Feature::HaveAt,
        Feature::UrlLength,
        Feature::UrlDepth,
        Feature::Redirection,
        Feature::HttpsDomain,
        Feature::TinyUrl,
        Feature::PrefixSuffix,
        Feature::DnsRecord,
        Feature::WebTraffic,
        Feature::Iframe,
    ];

    /// Position of this feature in the vector.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a feature by vector position.
    pub fn from_index(index: usize) -> Option<Feature> {
        Self::ALL.get(index).copied()
    }

    /// Canonical column label, used when a model carries no names of its own.
    pub fn name(self) -> &'static str {
        match self {
            Feature::HaveIp => "Have_IP",
            Feature::HaveAt => "Have_At",
            Feature::UrlLength => "URL_Length",
            Feature::UrlDepth => "URL_Depth",
            Feature::Redirection => "Redirection",
            Feature::HttpsDomain => "https_Domain",
            Feature::TinyUrl => "TinyURL",
            Feature::PrefixSuffix => "Prefix/Suffix",
            Feature::DnsRecord => "DNS_Record",
            Feature::WebTraffic => "Web_Traffic",
            Feature::Iframe => "iFrame",
        }
    }

    /// Whether this slot is a strict 0/1 flag. Only `UrlDepth` is a count.
    pub fn is_flag(self) -> bool {
        self != Feature::UrlDepth
    }
}

/// Fixed-order numeric encoding of a URL's risk signals.
///
/// Serialises as a plain JSON array of 11 integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(pub [u32; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector from a slice, rejecting any length other than 11.
    pub fn try_from_slice(values: &[u32]) -> Result<Self, PredictError> {
        let arr: [u32; FEATURE_COUNT] =
            values
                .try_into()
                .map_err(|_| PredictError::InvalidFeatureLength {
                    expected: FEATURE_COUNT,
                    got: values.len(),
                })?;
        Ok(Self(arr))
    }

    /// Value at a raw position, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// `(feature, value)` pairs in vector order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, u32)> + '_ {
        Feature::ALL.iter().map(move |&f| (f, self[f]))
    }
}

impl Index<Feature> for FeatureVector {
    type Output = u32;

    fn index(&self, feature: Feature) -> &u32 {
        &self.0[feature.index()]
    }
}

impl IndexMut<Feature> for FeatureVector {
    fn index_mut(&mut self, feature: Feature) -> &mut u32 {
        &mut self.0[feature.index()]
    }
}

/// Assemble the vector from the URL text and already-gathered probe signals.
pub fn extract(url: &str, probes: &ProbeSignals) -> FeatureVector {
    let mut v = FeatureVector::default();

    v[Feature::HaveIp] = lexical::having_ip(url);
    v[Feature::HaveAt] = lexical::have_at_sign(url);
    v[Feature::UrlLength] = lexical::url_length(url);
    v[Feature::UrlDepth] = lexical::url_depth(url);
    v[Feature::Redirection] = lexical::redirection(url);
    v[Feature::HttpsDomain] = lexical::https_in_domain(url);
    v[Feature::TinyUrl] = lexical::tiny_url(url);
    v[Feature::PrefixSuffix] = lexical::prefix_suffix(url);

    v[Feature::DnsRecord] = probes.dns_record.feature_value();
    v[Feature::WebTraffic] = probes.web_traffic.feature_value();
    v[Feature::Iframe] = probes.iframe.feature_value();

    debug!(url, features = ?v.0, "extracted features");
    v
}

/// Run the three probes concurrently, then assemble the vector.
pub async fn extract_live(url: &str, prober: Arc<dyn Prober>) -> FeatureVector {
    let signals = probe::gather(prober, url).await;
    extract(url, &signals)
}

#[cfg(test)]
mod tests {
    use super::probe::ProbeSignal;
    use super::*;

    fn clear() -> ProbeSignals {
        ProbeSignals {
            dns_record: ProbeSignal::Clear,
            web_traffic: ProbeSignal::Clear,
            iframe: ProbeSignal::Clear,
        }
    }

    #[test]
    fn test_feature_order_is_stable() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
            assert_eq!(Feature::from_index(i), Some(*f));
        }
        assert_eq!(Feature::from_index(FEATURE_COUNT), None);
        assert_eq!(Feature::Iframe.index(), 10);
    }

    #[test]
    fn test_only_depth_is_a_count() {
        let counts: Vec<_> = Feature::ALL.iter().filter(|f| !f.is_flag()).collect();
        assert_eq!(counts, vec![&Feature::UrlDepth]);
    }

    #[test]
    fn test_extract_plain_url() {
        let v = extract("https://example.com/a/b/c", &clear());
        assert_eq!(v.0, [0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_extract_values_in_range() {
        let urls = [
            "http://192.168.1.1/x",
            "https://secure-https-login.example.com/a/b//c?user=a@b",
            "http://bit.ly/xyz",
            "https://www.rust-lang.org/",
            "not a url",
        ];
        for url in urls {
            let v = extract(url, &ProbeSignals::unknown());
            assert_eq!(v.as_slice().len(), FEATURE_COUNT);
            for (f, value) in v.iter() {
                if f.is_flag() {
                    assert!(value <= 1, "{url}: {f:?} = {value}");
                }
            }
        }
    }

    #[test]
    fn test_extract_unknown_probes_fail_closed() {
        let v = extract("https://example.com", &ProbeSignals::unknown());
        assert_eq!(v[Feature::DnsRecord], 1);
        assert_eq!(v[Feature::WebTraffic], 1);
        assert_eq!(v[Feature::Iframe], 1);
    }

    #[test]
    fn test_shortener_sets_tiny_url_only() {
        let v = extract("http://bit.ly/xyz", &clear());
        assert_eq!(v[Feature::TinyUrl], 1);
        let v = extract("http://bit.ly/xyz", &ProbeSignals::unknown());
        assert_eq!(v[Feature::TinyUrl], 1);
    }

    #[test]
    fn test_try_from_slice() {
        let v = FeatureVector::try_from_slice(&[1, 0, 1, 2, 0, 0, 0, 1, 1, 1, 0]).unwrap();
        assert_eq!(v[Feature::UrlDepth], 2);

        let err = FeatureVector::try_from_slice(&[1, 0, 1]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::InvalidFeatureLength {
                expected: 11,
                got: 3
            }
        ));
    }

    #[test]
    fn test_vector_serializes_as_array() {
        let v = FeatureVector([0, 1, 0, 4, 0, 0, 1, 0, 1, 1, 1]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[0,1,0,4,0,0,1,0,1,1,1]");
        let back: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
